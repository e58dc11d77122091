//! Delayed Side Effects
//!
//! Some effects of a turn happen a moment later: the completion flag after
//! the farewell, the automatic artifact download after a sanction. Each is a
//! tokio task tagged with the session it belongs to, so replacing the session
//! can cancel everything still pending for the old one.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::messages::SessionId;

/// Kind of delayed effect
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskKind {
    /// Sets the completion flag after a farewell
    Completion,
    /// Automatic artifact download
    Download,
}

struct ScheduledTask {
    session_id: SessionId,
    kind: TaskKind,
    handle: JoinHandle<()>,
}

/// Session-tagged, cancellable delayed tasks
#[derive(Default)]
pub struct TaskScheduler {
    tasks: Vec<ScheduledTask>,
}

impl TaskScheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `work` after `delay`, on behalf of `session_id`
    pub fn schedule<F>(&mut self, session_id: &SessionId, kind: TaskKind, delay: Duration, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.prune();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            work.await;
        });
        tracing::debug!(session_id = %session_id, ?kind, delay_ms = delay.as_millis() as u64, "Scheduled task");
        self.tasks.push(ScheduledTask {
            session_id: session_id.clone(),
            kind,
            handle,
        });
    }

    /// Abort every unfinished task of `session_id`; returns how many were aborted
    pub fn cancel_session(&mut self, session_id: &SessionId) -> usize {
        let mut cancelled = 0;
        self.tasks.retain(|task| {
            if &task.session_id != session_id {
                return true;
            }
            if !task.handle.is_finished() {
                tracing::debug!(session_id = %session_id, kind = ?task.kind, "Aborting task");
                task.handle.abort();
                cancelled += 1;
            }
            false
        });
        if cancelled > 0 {
            tracing::debug!(session_id = %session_id, cancelled, "Cancelled pending tasks");
        }
        cancelled
    }

    /// Forget tasks that already ran
    fn prune(&mut self) {
        self.tasks.retain(|t| !t.handle.is_finished());
    }
}

impl Drop for TaskScheduler {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.handle.abort();
        }
    }
}
