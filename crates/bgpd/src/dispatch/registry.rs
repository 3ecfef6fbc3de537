//! Table of control-channel verbs.
//!
//! The table is filled once at startup and then only read. Verbs may span
//! several words; resolution always prefers the longest match.

use std::fmt;

use bgp_config::BgpConfiguration;

use crate::peers::SessionSnapshotProvider;
use crate::scheduler::OutputSequence;

use super::commands;
use super::errors::{CommandError, DispatchError};
use super::response::ServiceId;

/// Output modifiers of `show neighbor`, in precedence order.
pub const SHOW_NEIGHBOR_MODIFIERS: &[&str] = &["json", "summary", "extensive", "configuration"];

/// Payload type a command emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Human-readable lines.
    Text,
    /// Encoded payload lines.
    Binary,
}

/// Mutable state a handler may touch.
pub struct HandlerContext<'a> {
    /// Session state and teardown requests.
    pub peers: &'a mut dyn SessionSnapshotProvider,
    /// Loaded neighbor configuration.
    pub configuration: &'a BgpConfiguration,
}

/// Parsed command line handed to a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation<'a> {
    /// Requesting client.
    pub service: ServiceId,
    /// Full command line as received.
    pub line: &'a str,
    /// Resolved verb.
    pub verb: &'static str,
    /// Words after the verb, joined by single spaces.
    pub arguments: String,
    /// Highest-precedence accepted modifier present, if any.
    pub mode: Option<&'static str>,
    /// Last non-modifier argument, if any.
    pub filter: Option<String>,
}

/// What a handler produced.
pub enum HandlerOutcome {
    /// Complete response; the dispatcher writes these lines then `done`.
    Answered(Vec<String>),
    /// Lazily produced response for the scheduler.
    Scheduled(Box<dyn OutputSequence>),
}

impl fmt::Debug for HandlerOutcome {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Answered(lines) => formatter.debug_tuple("Answered").field(lines).finish(),
            Self::Scheduled(_) => formatter.write_str("Scheduled(..)"),
        }
    }
}

/// Handler entry point.
pub type Handler =
    fn(&Invocation<'_>, &mut HandlerContext<'_>) -> Result<HandlerOutcome, CommandError>;

/// Registration record for one verb.
#[derive(Clone, Copy)]
pub struct CommandDescriptor {
    /// One or more space-separated words.
    pub verb: &'static str,
    /// Output payload type.
    pub kind: CommandKind,
    /// Whether the handler schedules its output.
    pub is_async: bool,
    /// Modifier words, highest precedence first.
    pub accepted_modifiers: &'static [&'static str],
    /// Entry point.
    pub handler: Handler,
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CommandDescriptor")
            .field("verb", &self.verb)
            .field("kind", &self.kind)
            .field("is_async", &self.is_async)
            .field("accepted_modifiers", &self.accepted_modifiers)
            .finish_non_exhaustive()
    }
}

impl CommandDescriptor {
    fn words(&self) -> impl Iterator<Item = &'static str> {
        self.verb.split_whitespace()
    }

    fn word_count(&self) -> usize {
        self.words().count()
    }

    fn prefixes(&self, tokens: &[&str]) -> bool {
        let mut count = 0;
        for word in self.words() {
            if tokens.get(count) != Some(&word) {
                return false;
            }
            count += 1;
        }
        count > 0
    }

    /// Builds the invocation for `line`, whose leading tokens are the verb.
    pub(crate) fn invocation<'a>(&self, service: ServiceId, line: &'a str) -> Invocation<'a> {
        let rest: Vec<&str> = line.split_whitespace().skip(self.word_count()).collect();
        let mode = self
            .accepted_modifiers
            .iter()
            .copied()
            .find(|modifier| rest.contains(modifier));
        let placeholder = self.words().last();
        let filter = rest
            .iter()
            .copied()
            .rev()
            .find(|token| !self.accepted_modifiers.iter().any(|modifier| modifier == token))
            .filter(|token| Some(*token) != placeholder)
            .map(str::to_owned);
        Invocation {
            service,
            line,
            verb: self.verb,
            arguments: rest.join(" "),
            mode,
            filter,
        }
    }
}

/// Verb table.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    descriptors: Vec<CommandDescriptor>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in command.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::DuplicateVerb`] if two built-ins collide.
    pub fn standard() -> Result<Self, DispatchError> {
        let mut registry = Self::new();
        registry.register(CommandDescriptor {
            verb: "teardown",
            kind: CommandKind::Text,
            is_async: false,
            accepted_modifiers: &[],
            handler: commands::teardown,
        })?;
        registry.register(CommandDescriptor {
            verb: "show neighbor",
            kind: CommandKind::Text,
            is_async: true,
            accepted_modifiers: SHOW_NEIGHBOR_MODIFIERS,
            handler: commands::show_neighbor,
        })?;
        Ok(registry)
    }

    /// Adds a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::DuplicateVerb`] when the verb is taken.
    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<(), DispatchError> {
        let words: Vec<&str> = descriptor.words().collect();
        if self
            .descriptors
            .iter()
            .any(|existing| existing.words().eq(words.iter().copied()))
        {
            return Err(DispatchError::DuplicateVerb {
                verb: descriptor.verb,
            });
        }
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Finds the descriptor with the longest verb prefixing `tokens`.
    #[must_use]
    pub fn resolve(&self, tokens: &[&str]) -> Option<&CommandDescriptor> {
        self.descriptors
            .iter()
            .filter(|descriptor| descriptor.prefixes(tokens))
            .max_by_key(|descriptor| descriptor.word_count())
    }

    /// Number of registered verbs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
