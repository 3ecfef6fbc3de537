//! Routes control-channel lines to their handlers.

use tracing::{debug, warn};

use crate::scheduler::{AsyncCommandScheduler, TaskId};

use super::DISPATCH_TARGET;
use super::errors::DispatchError;
use super::registry::{CommandRegistry, HandlerContext, HandlerOutcome};
use super::response::{Answer, ServiceId, ServiceSink};

/// How a dispatched command was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// The response and its `done` marker were written.
    Answered,
    /// The response will be produced by the scheduler.
    Scheduled(TaskId),
}

/// Resolves and runs commands against a fixed registry.
#[derive(Debug)]
pub struct CommandDispatcher {
    registry: CommandRegistry,
}

impl CommandDispatcher {
    /// Creates a dispatcher over `registry`.
    #[must_use]
    pub fn new(registry: CommandRegistry) -> Self {
        Self { registry }
    }

    /// Registered commands.
    #[must_use]
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Runs one command line for `service`.
    ///
    /// Every failure is answered with an `error` marker before it is
    /// returned; the caller only needs to log it.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownCommand`] when no verb matches,
    /// [`DispatchError::Command`] when the handler rejects the line and
    /// [`DispatchError::Contract`] when a handler answers in a way its
    /// descriptor forbids.
    pub fn dispatch(
        &self,
        service: ServiceId,
        line: &str,
        context: &mut HandlerContext<'_>,
        scheduler: &mut AsyncCommandScheduler,
        sink: &mut dyn ServiceSink,
    ) -> Result<Dispatched, DispatchError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(descriptor) = self.registry.resolve(&tokens) else {
            sink.answer(service, Answer::Error);
            return Err(DispatchError::unknown_command(line));
        };

        let invocation = descriptor.invocation(service, line);
        debug!(
            target: DISPATCH_TARGET,
            %service,
            verb = descriptor.verb,
            mode = invocation.mode,
            filter = invocation.filter.as_deref(),
            "dispatching command"
        );

        let outcome = match (descriptor.handler)(&invocation, context) {
            Ok(outcome) => outcome,
            Err(source) => {
                sink.answer(service, Answer::Error);
                return Err(DispatchError::Command {
                    verb: descriptor.verb,
                    source,
                });
            }
        };

        match (outcome, descriptor.is_async) {
            (HandlerOutcome::Answered(lines), false) => {
                for response in &lines {
                    sink.write_line(service, response);
                }
                sink.answer(service, Answer::Done);
                Ok(Dispatched::Answered)
            }
            (HandlerOutcome::Scheduled(sequence), true) => {
                let task = scheduler.schedule(service, line, sequence);
                Ok(Dispatched::Scheduled(task))
            }
            (HandlerOutcome::Answered(_), true) => {
                warn!(target: DISPATCH_TARGET, verb = descriptor.verb, "async handler answered");
                sink.answer(service, Answer::Error);
                Err(DispatchError::Contract {
                    verb: descriptor.verb,
                    expected: "a scheduled output sequence",
                })
            }
            (HandlerOutcome::Scheduled(_), false) => {
                warn!(target: DISPATCH_TARGET, verb = descriptor.verb, "sync handler scheduled");
                sink.answer(service, Answer::Error);
                Err(DispatchError::Contract {
                    verb: descriptor.verb,
                    expected: "an immediate answer",
                })
            }
        }
    }
}
