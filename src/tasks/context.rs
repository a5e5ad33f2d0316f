//! State handed to every task.
use std::path::PathBuf;
use std::sync::Arc;

use crate::bundle::{Bundler, ExternalBundler};
use crate::config::{Config, Mode};
use crate::exec::{self, Executor};
use crate::logging::Log;

/// Shared context for task execution.
pub struct Context {
    /// Project configuration. Shared read-only by every task.
    pub config: Arc<Config>,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Whether to perform a dry run (log planned work without writing or spawning).
    pub dry_run: bool,
    /// Whether parallel groups and template rendering run concurrently.
    pub parallel: bool,
    /// Bundle mode.
    pub mode: Mode,
    /// Whether console summaries may carry ANSI colour.
    pub color: bool,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Bundler used by `build:res`.
    pub bundler: Arc<dyn Bundler>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("root", &self.config.root)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("parallel", &self.parallel)
            .field("mode", &self.mode)
            .field("color", &self.color)
            .field("executor", &self.executor)
            .field("bundler", &"<dyn Bundler>")
            .finish()
    }
}

impl Context {
    /// Creates a context whose bundler is the configured external command.
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        log: Arc<dyn Log>,
        executor: Arc<dyn Executor>,
        mode: Mode,
        dry_run: bool,
        parallel: bool,
    ) -> Self {
        let spec = &config.settings.bundler;
        let program = exec::resolve_or_bare(executor.as_ref(), &config.root, &spec.program);
        let bundler = Arc::new(ExternalBundler::new(
            &config.root,
            program,
            spec.args.clone(),
            Arc::clone(&executor),
        ));
        Self {
            config,
            log,
            dry_run,
            parallel,
            mode,
            color: crate::logging::supports_color(),
            executor,
            bundler,
        }
    }

    /// Project root directory.
    #[must_use]
    pub fn root(&self) -> PathBuf {
        self.config.root.clone()
    }

    /// Create a copy of this context with a different logger.
    ///
    /// All other fields are cloned by reference (via `Arc`). This is used by
    /// parallel groups to give each member its own buffered logger while
    /// sharing the rest of the context.
    #[must_use]
    pub fn with_log(&self, log: Arc<dyn Log>) -> Self {
        Self {
            config: Arc::clone(&self.config),
            log,
            dry_run: self.dry_run,
            parallel: self.parallel,
            mode: self.mode,
            color: self.color,
            executor: Arc::clone(&self.executor),
            bundler: Arc::clone(&self.bundler),
        }
    }

    /// Create a copy of this context with a different [`Bundler`].
    #[must_use]
    pub fn with_bundler(&self, bundler: Arc<dyn Bundler>) -> Self {
        Self {
            config: Arc::clone(&self.config),
            log: Arc::clone(&self.log),
            dry_run: self.dry_run,
            parallel: self.parallel,
            mode: self.mode,
            color: self.color,
            executor: Arc::clone(&self.executor),
            bundler,
        }
    }
}
