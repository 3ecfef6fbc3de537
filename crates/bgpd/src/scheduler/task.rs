//! Tasks owned by the scheduler.

use std::fmt;
use std::time::Instant;

use crate::dispatch::ServiceId;

use super::OutputSequence;

/// Scheduler-assigned task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
    pub(super) const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "task-{}", self.0)
    }
}

/// Lifecycle of a task.
///
/// `Pending -> Running -> {Completed, Cancelled, Failed}`; the last three
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Scheduled, never stepped.
    Pending,
    /// Stepped at least once.
    Running,
    /// Output exhausted; `done` written.
    Completed,
    /// Owning service went away; nothing written.
    Cancelled,
    /// Stepping failed; `error` written.
    Failed,
}

impl TaskState {
    /// Whether the state is final.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

/// State change reported by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskTransition {
    /// Task that changed.
    pub task: TaskId,
    /// Owning service.
    pub service: ServiceId,
    /// New state.
    pub state: TaskState,
}

pub(super) struct AsyncTask {
    pub(super) id: TaskId,
    pub(super) service: ServiceId,
    pub(super) command: String,
    pub(super) sequence: Box<dyn OutputSequence>,
    pub(super) created_at: Instant,
    pub(super) state: TaskState,
}

impl AsyncTask {
    pub(super) fn transition(&mut self, state: TaskState) -> TaskTransition {
        self.state = state;
        TaskTransition {
            task: self.id,
            service: self.service,
            state,
        }
    }
}
