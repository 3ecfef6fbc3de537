//! Cooperative scheduler for multi-line command output.
//!
//! Asynchronous commands hand the scheduler an [`OutputSequence`]. Each call
//! to [`AsyncCommandScheduler::tick`] advances every task that was queued
//! when the tick started by exactly one step, in FIFO order, so that one
//! large response cannot starve other clients. All stepping happens on the
//! reactor thread.

mod sequence;
mod task;

use std::collections::VecDeque;
use std::time::Instant;

use tracing::{debug, warn};

use crate::dispatch::{Answer, ServiceId, ServiceSink};

pub use self::sequence::{OutputSequence, StaticLines, Step, StepContext};
pub use self::task::{TaskId, TaskState, TaskTransition};

use self::task::AsyncTask;

const SCHEDULER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::scheduler");

/// FIFO queue of output tasks.
#[derive(Default)]
pub struct AsyncCommandScheduler {
    queue: VecDeque<AsyncTask>,
    next_id: u64,
}

impl AsyncCommandScheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `sequence` as the response to `command` for `service`.
    pub fn schedule(
        &mut self,
        service: ServiceId,
        command: impl Into<String>,
        sequence: Box<dyn OutputSequence>,
    ) -> TaskId {
        self.next_id += 1;
        let id = TaskId::new(self.next_id);
        let command = command.into();
        debug!(
            target: SCHEDULER_TARGET,
            task = %id,
            %service,
            command = command.as_str(),
            "task scheduled"
        );
        self.queue.push_back(AsyncTask {
            id,
            service,
            command,
            sequence,
            created_at: Instant::now(),
            state: TaskState::Pending,
        });
        id
    }

    /// Advances each queued task by one step.
    ///
    /// Tasks scheduled during the tick wait for the next one. Returns the
    /// state changes observed, terminal ones included.
    pub fn tick(
        &mut self,
        context: &StepContext<'_>,
        sink: &mut dyn ServiceSink,
    ) -> Vec<TaskTransition> {
        let mut transitions = Vec::new();
        for _ in 0..self.queue.len() {
            let Some(mut task) = self.queue.pop_front() else {
                break;
            };

            if !sink.is_connected(task.service) {
                transitions.push(task.transition(TaskState::Cancelled));
                debug!(
                    target: SCHEDULER_TARGET,
                    task = %task.id,
                    service = %task.service,
                    "client gone; task cancelled"
                );
                continue;
            }

            if task.state == TaskState::Pending {
                transitions.push(task.transition(TaskState::Running));
            }

            match task.sequence.step(context) {
                Ok(Step::Line(line)) => {
                    sink.write_line(task.service, &line);
                    self.queue.push_back(task);
                }
                Ok(Step::Idle) => self.queue.push_back(task),
                Ok(Step::Exhausted) => {
                    sink.answer(task.service, Answer::Done);
                    transitions.push(task.transition(TaskState::Completed));
                    debug!(
                        target: SCHEDULER_TARGET,
                        task = %task.id,
                        command = task.command.as_str(),
                        elapsed_ms = task.created_at.elapsed().as_millis(),
                        "task completed"
                    );
                }
                Err(error) => {
                    sink.answer(task.service, Answer::Error);
                    transitions.push(task.transition(TaskState::Failed));
                    warn!(
                        target: SCHEDULER_TARGET,
                        task = %task.id,
                        command = task.command.as_str(),
                        %error,
                        "task failed"
                    );
                }
            }
        }
        transitions
    }

    /// Drops every task owned by `service` without writing anything.
    ///
    /// Returns a `Cancelled` transition for each removed task.
    pub fn cancel_for_service(&mut self, service: ServiceId) -> Vec<TaskTransition> {
        let mut transitions = Vec::new();
        self.queue.retain_mut(|task| {
            if task.service != service {
                return true;
            }
            transitions.push(task.transition(TaskState::Cancelled));
            false
        });
        if !transitions.is_empty() {
            debug!(
                target: SCHEDULER_TARGET,
                %service,
                cancelled = transitions.len(),
                "tasks cancelled"
            );
        }
        transitions
    }

    /// Whether `service` still has output in flight.
    #[must_use]
    pub fn is_busy(&self, service: ServiceId) -> bool {
        self.queue.iter().any(|task| task.service == service)
    }

    /// Number of live tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether no task is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
