//! Console and log-file output.
//!
//! Everything goes through `tracing`: [`init_subscriber`] installs a console
//! formatter plus a layer appending to the per-command log file, and
//! [`Logger`] and [`BufferedLog`] turn task output into tracing events.

mod buffered;
mod logger;
mod subscriber;
mod types;
mod utils;

pub use buffered::BufferedLog;
pub use logger::Logger;
pub use subscriber::init_subscriber;
pub use types::{Channel, Log, TaskEntry, TaskStatus};
pub use utils::supports_color;

/// A [`Logger`] whose events land in a log file inside a fresh temporary
/// directory, through a subscriber installed for the current thread only.
///
/// Keep the directory and the guard alive for the whole test.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn isolated_logger() -> (Logger, tempfile::TempDir, tracing::dispatcher::DefaultGuard) {
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let path = tmp.path().join("test.log");
    let file_layer = subscriber::FileLayer::create(&path, "test").expect("failed to open log file");
    let subscriber =
        tracing_subscriber::registry().with(file_layer.with_filter(LevelFilter::DEBUG));
    let guard = tracing::dispatcher::set_default(&tracing::Dispatch::new(subscriber));
    (Logger::with_log_file(Some(path)), tmp, guard)
}
