//! Subcommand implementations and the setup they share.
pub mod list;
pub mod run;
pub mod version;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::logging::{Log as _, Logger};
use crate::tasks::Registry;

/// Environment variable naming the project root when `--root` is absent.
pub const ROOT_ENV: &str = "SITEBUILD_ROOT";

/// Shared state produced by the common command setup sequence.
#[derive(Debug)]
pub struct CommandSetup {
    /// Project configuration for the resolved root.
    pub config: Arc<Config>,
    /// The standard task registry.
    pub registry: Registry,
}

impl CommandSetup {
    /// Resolve the project root, load its settings, and build the registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory does not exist, the settings
    /// file fails to parse, or the task declarations are inconsistent.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        let root = resolve_root(global)?;
        log.debug(&format!("project root: {}", root.display()));

        let config = Config::load(&root)?;
        log.debug(&format!(
            "out_dir={} template_dir={} script_dir={}",
            config.settings.out_dir.display(),
            config.settings.template_dir.display(),
            config.settings.script_dir.display()
        ));

        Ok(Self {
            config: Arc::new(config),
            registry: Registry::standard()?,
        })
    }
}

/// Resolve the project root from `--root`, then `SITEBUILD_ROOT`, then the
/// current directory.
///
/// The result is always absolute: the bundler runs inside the root, so
/// entry paths and the output path must not depend on the caller's working
/// directory.
///
/// # Errors
///
/// Returns an error if the chosen directory does not exist.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    let root = if let Some(ref root) = global.root {
        root.clone()
    } else if let Ok(root) = std::env::var(ROOT_ENV) {
        PathBuf::from(root)
    } else {
        std::env::current_dir().context("reading current directory")?
    };

    if !root.is_dir() {
        anyhow::bail!(
            "project root {} is not a directory. Use --root or set {ROOT_ENV}",
            root.display()
        );
    }
    std::path::absolute(&root).with_context(|| format!("resolving {}", root.display()))
}
