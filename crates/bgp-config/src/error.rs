//! Errors raised while loading the neighbor configuration file.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::family::FamilyError;
use crate::tokeniser::Location;

/// Errors that abort loading of a configuration file.
///
/// Every variant raised by the parser names the offending token and the
/// location it was read from.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The configuration file could not be read.
    #[error("failed to read configuration '{path}': {source}")]
    Read {
        /// Path that failed to load.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// A quoted string was not closed.
    #[error("{location}: unterminated string")]
    UnterminatedString {
        /// Position of the opening quote.
        location: Location,
    },
    /// A token appeared where the grammar does not allow it.
    #[error("{location}: unexpected '{found}', expected {expected}")]
    UnexpectedToken {
        /// Token text.
        found: String,
        /// Description of what the grammar allows here.
        expected: &'static str,
        /// Token position.
        location: Location,
    },
    /// The file ended inside a block or statement.
    #[error("unexpected end of configuration, expected {expected}")]
    UnexpectedEof {
        /// Description of what the grammar expected next.
        expected: &'static str,
    },
    /// The AFI token is not recognised.
    #[error("{location}: unknown address family '{token}'")]
    UnknownAfi {
        /// Token text.
        token: String,
        /// Token position.
        location: Location,
    },
    /// The SAFI token is not recognised.
    #[error("{location}: unknown subsequent address family '{token}'")]
    UnknownSafi {
        /// Token text.
        token: String,
        /// Token position.
        location: Location,
    },
    /// A declared family pair was rejected by the validator.
    #[error("{location}: {source} (at '{token}')")]
    Family {
        /// Validation failure.
        #[source]
        source: FamilyError,
        /// Token that triggered the failure.
        token: String,
        /// Token position.
        location: Location,
    },
    /// A statement value could not be parsed.
    #[error("{location}: invalid value '{value}' for {field}")]
    InvalidValue {
        /// Statement keyword.
        field: &'static str,
        /// Offending value.
        value: String,
        /// Token position.
        location: Location,
    },
    /// A statement was given twice inside one neighbor block.
    #[error("{location}: {field} is already set for this neighbor")]
    DuplicateStatement {
        /// Statement keyword.
        field: &'static str,
        /// Token position.
        location: Location,
    },
    /// A neighbor referenced a family block that was never defined.
    #[error("{location}: unknown family block '{name}'")]
    UnknownFamilyReference {
        /// Referenced block name.
        name: String,
        /// Token position.
        location: Location,
    },
    /// Two family blocks share a name.
    #[error("{location}: family block '{name}' is already defined")]
    DuplicateFamilyBlock {
        /// Block name.
        name: String,
        /// Token position.
        location: Location,
    },
    /// Two neighbor blocks share a peer address.
    #[error("{location}: neighbor {address} is already defined")]
    DuplicateNeighbor {
        /// Peer address.
        address: String,
        /// Token position.
        location: Location,
    },
    /// A mandatory neighbor statement is missing.
    #[error("{location}: neighbor {address} is missing {field}")]
    MissingField {
        /// Peer address.
        address: String,
        /// Statement keyword.
        field: &'static str,
        /// Position of the neighbor keyword.
        location: Location,
    },
}
