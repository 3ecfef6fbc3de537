//! Resumable output producers driven by the scheduler.

use std::collections::VecDeque;

use bgp_config::BgpConfiguration;

use crate::dispatch::CommandError;
use crate::peers::SessionSnapshotProvider;

/// Live state an output sequence may read while stepping.
pub struct StepContext<'a> {
    /// Session state.
    pub peers: &'a dyn SessionSnapshotProvider,
    /// Loaded neighbor configuration.
    pub configuration: &'a BgpConfiguration,
}

/// Result of advancing a sequence once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// One output line.
    Line(String),
    /// Progress without output.
    Idle,
    /// Nothing left to produce.
    Exhausted,
}

/// A multi-line command output produced one step at a time.
///
/// Each call to [`OutputSequence::step`] must do a bounded amount of work.
/// The scheduler never calls `step` again after `Exhausted` or an error.
pub trait OutputSequence {
    /// Produces the next item.
    ///
    /// # Errors
    ///
    /// Returns a [`CommandError`] when the output cannot be produced; the
    /// command then ends with an `error` marker.
    fn step(&mut self, context: &StepContext<'_>) -> Result<Step, CommandError>;
}

/// Sequence over lines known up front.
#[derive(Debug, Clone, Default)]
pub struct StaticLines {
    lines: VecDeque<String>,
}

impl StaticLines {
    /// Builds a sequence yielding `lines` in order.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl OutputSequence for StaticLines {
    fn step(&mut self, _context: &StepContext<'_>) -> Result<Step, CommandError> {
        Ok(self.lines.pop_front().map_or(Step::Exhausted, Step::Line))
    }
}
