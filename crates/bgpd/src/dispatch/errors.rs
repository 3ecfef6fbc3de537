//! Error types for command dispatch.

use thiserror::Error;

use super::selector::SelectorError;

/// Failures raised by a command handler or by an output sequence.
///
/// Each one ends the command with an `error` marker; the control channel
/// stays open.
#[derive(Debug, Error)]
pub enum CommandError {
    /// `teardown` was given no code after the description.
    #[error("expected a neighbor description followed by a notification code")]
    MissingCode,
    /// The notification code is not a run of decimal digits that fits in
    /// 32 bits.
    #[error("invalid notification code '{code}'")]
    InvalidCode {
        /// Offending text.
        code: String,
    },
    /// The neighbor description could not be parsed.
    #[error("invalid neighbor description '{description}': {source}")]
    InvalidDescription {
        /// Description text.
        description: String,
        /// Parse failure.
        #[source]
        source: SelectorError,
    },
    /// Output could not be rendered.
    #[error("failed to render output: {message}")]
    Render {
        /// Renderer message.
        message: String,
    },
}

impl CommandError {
    /// Creates an invalid code error.
    pub fn invalid_code(code: impl Into<String>) -> Self {
        Self::InvalidCode { code: code.into() }
    }

    /// Creates a render error.
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(error: serde_json::Error) -> Self {
        Self::render(error.to_string())
    }
}

/// Errors surfaced by the registry and the dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A verb was registered twice.
    #[error("command '{verb}' is already registered")]
    DuplicateVerb {
        /// Verb text.
        verb: &'static str,
    },
    /// No registered verb prefixes the line.
    #[error("unknown command '{line}'")]
    UnknownCommand {
        /// Received line.
        line: String,
    },
    /// A handler answered in a way its descriptor does not allow.
    #[error("handler for '{verb}' broke its contract: expected {expected}")]
    Contract {
        /// Verb text.
        verb: &'static str,
        /// What the descriptor requires.
        expected: &'static str,
    },
    /// The handler rejected the command.
    #[error("'{verb}' failed: {source}")]
    Command {
        /// Verb text.
        verb: &'static str,
        /// Handler error.
        #[source]
        source: CommandError,
    },
}

impl DispatchError {
    /// Creates an unknown command error.
    pub fn unknown_command(line: impl Into<String>) -> Self {
        Self::UnknownCommand { line: line.into() }
    }
}
