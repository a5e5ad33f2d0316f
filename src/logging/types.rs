//! Message channels, task outcomes, and the [`Log`] trait.

/// Where a message goes and how it is rendered.
///
/// Every channel maps onto one tracing level; stage headers and dry-run
/// notes are `INFO` events told apart by their target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Section header (`==> build:tpl`).
    Stage,
    /// Regular progress output.
    Info,
    /// Verbose detail, always kept in the log file.
    Debug,
    /// Recoverable problem.
    Warn,
    /// Task failure.
    Error,
    /// Action that would have happened without `--dry-run`.
    DryRun,
}

const STAGE_TARGET: &str = "sitebuild::stage";
const DRY_RUN_TARGET: &str = "sitebuild::dry_run";

impl Channel {
    /// Emit `msg` as a tracing event on this channel.
    pub fn emit(self, msg: &str) {
        match self {
            Self::Stage => tracing::info!(target: STAGE_TARGET, "{msg}"),
            Self::Info => tracing::info!("{msg}"),
            Self::Debug => tracing::debug!("{msg}"),
            Self::Warn => tracing::warn!("{msg}"),
            Self::Error => tracing::error!("{msg}"),
            Self::DryRun => tracing::info!(target: DRY_RUN_TARGET, "{msg}"),
        }
    }

    /// The channel an event was emitted on.
    pub(super) fn of(event: &tracing::Event<'_>) -> Self {
        let metadata = event.metadata();
        match (*metadata.level(), metadata.target()) {
            (tracing::Level::ERROR, _) => Self::Error,
            (tracing::Level::WARN, _) => Self::Warn,
            (tracing::Level::INFO, STAGE_TARGET) => Self::Stage,
            (tracing::Level::INFO, DRY_RUN_TARGET) => Self::DryRun,
            (tracing::Level::INFO, _) => Self::Info,
            _ => Self::Debug,
        }
    }
}

/// Outcome of one leaf task, as shown in the run summary.
#[derive(Debug, Clone)]
pub struct TaskEntry {
    /// Task name as invoked on the command line (e.g. `build:tpl`).
    pub name: String,
    /// Final status of the task.
    pub status: TaskStatus,
    /// Failure reason, skip reason or other detail.
    pub message: Option<String>,
}

/// Status of a completed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Task completed successfully.
    Ok,
    /// Task completed, but swallowed a failure (watch-mode lint).
    Warned,
    /// Task never ran because an earlier step in its series failed.
    Skipped,
    /// Task ran in dry-run mode; nothing was written or spawned.
    DryRun,
    /// Task encountered an error and could not complete.
    Failed,
}

impl TaskStatus {
    /// Every status, in summary order.
    pub const ALL: [Self; 5] = [
        Self::Ok,
        Self::Warned,
        Self::Skipped,
        Self::DryRun,
        Self::Failed,
    ];

    /// One-character marker shown before the task name.
    #[must_use]
    pub const fn marker(self) -> char {
        match self {
            Self::Ok => '✓',
            Self::Warned => '!',
            Self::Skipped => '-',
            Self::DryRun => '~',
            Self::Failed => '✗',
        }
    }

    /// Word used in the summary totals.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warned => "warned",
            Self::Skipped => "skipped",
            Self::DryRun => "dry-run",
            Self::Failed => "failed",
        }
    }

    /// SGR sequence used when the console is coloured.
    pub(super) const fn sgr(self) -> &'static str {
        match self {
            Self::Ok => "\x1b[32m",
            Self::Warned => "\x1b[33m",
            Self::Skipped => "\x1b[2m",
            Self::DryRun => "\x1b[36m",
            Self::Failed => "\x1b[31m",
        }
    }
}

/// Sink for task output.
///
/// [`Logger`](super::Logger) writes straight through to tracing, while
/// [`BufferedLog`](super::BufferedLog) holds a parallel member's lines until
/// the member finishes. Implementors only provide [`write`](Self::write) and
/// [`record_task`](Self::record_task).
pub trait Log: Send + Sync {
    /// Deliver `msg` on `channel`.
    fn write(&self, channel: Channel, msg: &str);

    /// Record a task result for the summary.
    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>);

    /// Section header.
    fn stage(&self, msg: &str) {
        self.write(Channel::Stage, msg);
    }

    /// Regular progress output.
    fn info(&self, msg: &str) {
        self.write(Channel::Info, msg);
    }

    /// Detail shown with `--verbose` and always kept in the log file.
    fn debug(&self, msg: &str) {
        self.write(Channel::Debug, msg);
    }

    /// Recoverable problem.
    fn warn(&self, msg: &str) {
        self.write(Channel::Warn, msg);
    }

    /// Task failure.
    fn error(&self, msg: &str) {
        self.write(Channel::Error, msg);
    }

    /// Action skipped because of `--dry-run`.
    fn dry_run(&self, msg: &str) {
        self.write(Channel::DryRun, msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_are_distinct() {
        let mut markers: Vec<char> = TaskStatus::ALL.iter().map(|s| s.marker()).collect();
        markers.sort_unstable();
        markers.dedup();
        assert_eq!(markers.len(), TaskStatus::ALL.len());
    }

    #[test]
    fn labels_match_summary_words() {
        let labels: Vec<&str> = TaskStatus::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(labels, ["ok", "warned", "skipped", "dry-run", "failed"]);
    }
}
