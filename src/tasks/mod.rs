//! Named build tasks and the groups that compose them.
pub mod clean;
pub mod context;
pub mod graph;
pub mod lint;
pub mod registry;
pub mod scripts;
pub mod templates;

pub use context::Context;
pub use registry::{Registry, TaskDef, TaskKind};

use anyhow::Result;

use crate::error::TaskError;
use crate::logging::TaskStatus;

/// Result of a single task execution.
///
/// # Examples
///
/// ```
/// use sitebuild::tasks::TaskResult;
///
/// let ok = TaskResult::Ok;
/// let warned = TaskResult::Warned("lint failed".into());
/// let dry = TaskResult::DryRun;
///
/// assert!(matches!(ok, TaskResult::Ok));
/// assert!(matches!(warned, TaskResult::Warned(_)));
/// assert!(matches!(dry, TaskResult::DryRun));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// Task completed successfully.
    Ok,
    /// Task completed, but only because it tolerated a failure.
    Warned(String),
    /// Task ran in dry-run mode.
    DryRun,
}

/// Counters for file-producing tasks.
///
/// # Examples
///
/// ```
/// use sitebuild::tasks::TaskStats;
///
/// let stats = TaskStats { changed: 2, already_ok: 1 };
/// assert_eq!(stats.summary(false), "2 changed, 1 already ok");
/// assert_eq!(stats.summary(true), "2 would change, 1 already ok");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    /// Number of files written or removed.
    pub changed: u32,
    /// Number of items that needed no work.
    pub already_ok: u32,
}

impl TaskStats {
    /// Create a new empty stats counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Format the summary string (e.g. "3 changed, 0 already ok").
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let verb = if dry_run { "would change" } else { "changed" };
        format!("{} {verb}, {} already ok", self.changed, self.already_ok)
    }

    /// Log the summary and return the appropriate `TaskResult`.
    #[must_use]
    pub fn finish(self, ctx: &Context) -> TaskResult {
        ctx.log.info(&self.summary(ctx.dry_run));
        if ctx.dry_run {
            TaskResult::DryRun
        } else {
            TaskResult::Ok
        }
    }
}

impl std::ops::AddAssign for TaskStats {
    fn add_assign(&mut self, rhs: Self) {
        self.changed += rhs.changed;
        self.already_ok += rhs.already_ok;
    }
}

/// A named, executable leaf task.
pub trait Task: Send + Sync {
    /// Name used on the command line (e.g. `build:tpl`).
    fn name(&self) -> &str;

    /// One-line description shown by `sitebuild list`.
    fn description(&self) -> &str;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if the task cannot complete: a configuration file is
    /// missing or malformed, an external tool fails, or an output cannot be
    /// written.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// Execute a task, recording the result in the logger.
///
/// # Errors
///
/// Returns [`TaskError::Failed`] if the task returned an error; the error
/// has already been logged and recorded.
pub fn execute(task: &dyn Task, ctx: &Context) -> Result<(), TaskError> {
    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
            Ok(())
        }
        Ok(TaskResult::Warned(reason)) => {
            ctx.log.warn(&reason);
            ctx.log
                .record_task(task.name(), TaskStatus::Warned, Some(&reason));
            Ok(())
        }
        Ok(TaskResult::DryRun) => {
            ctx.log.record_task(task.name(), TaskStatus::DryRun, None);
            Ok(())
        }
        Err(e) => {
            let reason = format!("{e:#}");
            ctx.log.error(&format!("{}: {reason}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&reason));
            Err(TaskError::Failed {
                task: task.name().to_string(),
                reason,
            })
        }
    }
}
