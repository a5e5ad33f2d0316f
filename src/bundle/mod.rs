//! Script and stylesheet bundling through an external bundler.
pub mod entries;
pub mod invoker;
pub mod options;
pub mod stats;

pub use entries::{EntryMap, SCRIPT_EXTENSIONS, discover};
pub use invoker::{BundleRun, Bundler, ExternalBundler, invoke};
pub use options::BundleOptions;
pub use stats::BundleStats;

#[cfg(test)]
pub use invoker::MockBundler;
