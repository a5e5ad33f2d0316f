//! Holding back a parallel member's output until it finishes.
use std::sync::{Arc, Mutex, PoisonError};

use super::logger::Logger;
use super::types::{Channel, Log, TaskStatus};

/// [`Log`] for one member of a parallel group.
///
/// Lines are kept in memory and handed to the shared [`Logger`] in one
/// block by [`flush`](Self::flush), so a bundler summary never interleaves
/// with template output. Task outcomes skip the buffer: they go straight
/// to the shared summary.
#[derive(Debug)]
pub struct BufferedLog {
    inner: Arc<Logger>,
    lines: Mutex<Vec<(Channel, String)>>,
}

impl BufferedLog {
    /// Empty buffer in front of `inner`.
    #[must_use]
    pub const fn new(inner: Arc<Logger>) -> Self {
        Self {
            inner,
            lines: Mutex::new(Vec::new()),
        }
    }

    /// Replay every held line through the shared logger and empty the
    /// buffer.
    pub fn flush(&self) {
        let lines = std::mem::take(&mut *self.lines.lock().unwrap_or_else(PoisonError::into_inner));
        self.inner.replay(&lines);
    }
}

impl Log for BufferedLog {
    fn write(&self, channel: Channel, msg: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((channel, msg.to_string()));
    }

    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        self.inner.record_task(name, status, message);
    }
}
