//! The process-wide logger and the end-of-run summary.
use std::fmt;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use super::types::{Channel, Log, TaskEntry, TaskStatus};
use super::utils::log_file_path;

const RESET: &str = "\x1b[0m";
const DIM: &str = "\x1b[2m";

/// Logger shared by every task of one run.
///
/// Messages go straight to tracing, which fans them out to the console and
/// to `$XDG_CACHE_HOME/sitebuild/<command>.log`. Task outcomes are collected
/// for [`print_summary`](Self::print_summary).
#[derive(Debug)]
pub struct Logger {
    tasks: Mutex<Vec<TaskEntry>>,
    log_file: Option<PathBuf>,
    /// Held while a parallel member's buffered lines are replayed.
    console: Mutex<()>,
}

impl Logger {
    /// Logger for `command`, remembering where its log file lives.
    ///
    /// The file itself is opened by
    /// [`init_subscriber`](super::subscriber::init_subscriber).
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self::with_log_file(log_file_path(command))
    }

    pub(super) const fn with_log_file(log_file: Option<PathBuf>) -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            log_file,
            console: Mutex::new(()),
        }
    }

    /// Where this run's log file lives.
    #[cfg(test)]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// All recorded task outcomes, in recording order.
    #[must_use]
    pub fn task_entries(&self) -> Vec<TaskEntry> {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of tasks recorded as [`TaskStatus::Failed`].
    #[must_use]
    pub fn failure_count(&self) -> usize {
        Tally::of(&self.task_entries()).count(TaskStatus::Failed)
    }

    /// Emit `lines` back to back, without lines from other members in
    /// between.
    pub(super) fn replay(&self, lines: &[(Channel, String)]) {
        let _console = self.console.lock().unwrap_or_else(PoisonError::into_inner);
        for (channel, msg) in lines {
            channel.emit(msg);
        }
    }

    /// Print one line per recorded task, the totals, and the log file path.
    ///
    /// Escape sequences are only added when `color` is set.
    pub fn print_summary(&self, color: bool) {
        let tasks = self.task_entries();
        if tasks.is_empty() {
            return;
        }

        self.stage("Summary");
        for task in &tasks {
            let line = match &task.message {
                Some(msg) => format!("{} {} ({msg})", task.status.marker(), task.name),
                None => format!("{} {}", task.status.marker(), task.name),
            };
            self.info(&paint(color, task.status.sgr(), &line));
        }

        let tally = Tally::of(&tasks);
        self.info(&tally.render(color));
        if let Some(path) = &self.log_file {
            self.info(&paint(color, DIM, &format!("log: {}", path.display())));
        }
    }
}

impl Log for Logger {
    fn write(&self, channel: Channel, msg: &str) {
        channel.emit(msg);
    }

    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(TaskEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
    }
}

fn paint(color: bool, sgr: &str, text: &str) -> String {
    if color {
        format!("{sgr}{text}{RESET}")
    } else {
        text.to_string()
    }
}

/// Task counts per status, in [`TaskStatus::ALL`] order.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Tally(Vec<(TaskStatus, usize)>);

impl Tally {
    fn of(tasks: &[TaskEntry]) -> Self {
        Self(
            TaskStatus::ALL
                .iter()
                .map(|&status| (status, tasks.iter().filter(|t| t.status == status).count()))
                .collect(),
        )
    }

    fn count(&self, status: TaskStatus) -> usize {
        self.0
            .iter()
            .find(|(s, _)| *s == status)
            .map_or(0, |(_, n)| *n)
    }

    fn total(&self) -> usize {
        self.0.iter().map(|(_, n)| n).sum()
    }

    /// `5 tasks: 3 ok, 1 skipped, 1 failed`; zero counts are left out.
    fn render(&self, color: bool) -> String {
        let parts: Vec<String> = self
            .0
            .iter()
            .filter(|(_, n)| *n > 0)
            .map(|(s, n)| paint(color, s.sgr(), &format!("{n} {}", s.label())))
            .collect();
        format!("{self}: {}", parts.join(", "))
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.total();
        write!(f, "{total} {}", if total == 1 { "task" } else { "tasks" })
    }
}
