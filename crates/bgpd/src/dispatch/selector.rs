//! Neighbor descriptions used to pick sessions from the command line.
//!
//! A description is `*` or a comma-separated list of selectors:
//!
//! ```text
//! [neighbor] <ip> [local-ip <ip>] [local-as <asn>] [peer-as <asn>]
//!     [router-id <id>] [family-allowed <families>]
//! ```
//!
//! A selector matches a session when each of its `key value` phrases appears
//! as adjacent whole words in the session's neighbor name.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

use thiserror::Error;

const NEIGHBOR_KEY: &str = "neighbor";

/// Problems found while parsing a description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// A selector had no words.
    #[error("empty neighbor selector")]
    Empty,
    /// The peer address did not parse.
    #[error("'{token}' is not an IP address")]
    InvalidAddress {
        /// Offending word.
        token: String,
    },
    /// A qualifier keyword is not recognised.
    #[error("unknown neighbor qualifier '{token}'")]
    UnknownKey {
        /// Offending word.
        token: String,
    },
    /// A qualifier was not followed by a value.
    #[error("missing value for '{key}'")]
    MissingValue {
        /// Qualifier keyword.
        key: &'static str,
    },
    /// A qualifier value did not parse.
    #[error("invalid value '{value}' for '{key}'")]
    InvalidValue {
        /// Qualifier keyword.
        key: &'static str,
        /// Offending word.
        value: String,
    },
}

#[derive(Debug, Clone, Copy)]
enum Qualifier {
    LocalIp,
    LocalAs,
    PeerAs,
    RouterId,
    FamilyAllowed,
}

impl Qualifier {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "local-ip" => Some(Self::LocalIp),
            "local-as" => Some(Self::LocalAs),
            "peer-as" => Some(Self::PeerAs),
            "router-id" => Some(Self::RouterId),
            "family-allowed" => Some(Self::FamilyAllowed),
            _ => None,
        }
    }

    const fn key(self) -> &'static str {
        match self {
            Self::LocalIp => "local-ip",
            Self::LocalAs => "local-as",
            Self::PeerAs => "peer-as",
            Self::RouterId => "router-id",
            Self::FamilyAllowed => "family-allowed",
        }
    }

    /// Checks `value` and returns its canonical spelling.
    fn normalise(self, value: &str) -> Option<String> {
        match self {
            Self::LocalIp => value.parse::<IpAddr>().ok().map(|ip| ip.to_string()),
            Self::LocalAs | Self::PeerAs => value.parse::<u32>().ok().map(|asn| asn.to_string()),
            Self::RouterId => value.parse::<Ipv4Addr>().ok().map(|id| id.to_string()),
            Self::FamilyAllowed => Some(value.to_owned()),
        }
    }
}

/// One parsed selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NeighborSelector {
    /// `*`: every session.
    Any,
    /// `key value` phrases that must all appear in the neighbor name.
    Phrases(Vec<(&'static str, String)>),
}

impl NeighborSelector {
    /// Whether the neighbor called `name` is selected.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        let Self::Phrases(phrases) = self else {
            return true;
        };
        let words: Vec<&str> = name.split_whitespace().collect();
        phrases.iter().all(|(key, value)| {
            words
                .windows(2)
                .any(|pair| matches!(pair, [word, next] if *word == *key && *next == value.as_str()))
        })
    }
}

impl fmt::Display for NeighborSelector {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => formatter.write_str("*"),
            Self::Phrases(phrases) => {
                let mut first = true;
                for (key, value) in phrases {
                    if !first {
                        formatter.write_str(" ")?;
                    }
                    first = false;
                    write!(formatter, "{key} {value}")?;
                }
                Ok(())
            }
        }
    }
}

/// Parses a full description into its selectors.
///
/// # Errors
///
/// Returns a [`SelectorError`] for the first malformed selector.
pub fn parse_selectors(description: &str) -> Result<Vec<NeighborSelector>, SelectorError> {
    description.split(',').map(parse_selector).collect()
}

fn parse_selector(text: &str) -> Result<NeighborSelector, SelectorError> {
    let mut words = text.split_whitespace().peekable();
    if words.peek() == Some(&"*") {
        words.next();
        return match words.next() {
            None => Ok(NeighborSelector::Any),
            Some(extra) => Err(SelectorError::UnknownKey {
                token: extra.to_owned(),
            }),
        };
    }
    if words.peek() == Some(&NEIGHBOR_KEY) {
        words.next();
    }

    let address = words.next().ok_or(SelectorError::Empty)?;
    let address = address
        .parse::<IpAddr>()
        .map_err(|_| SelectorError::InvalidAddress {
            token: address.to_owned(),
        })?;
    let mut phrases = vec![(NEIGHBOR_KEY, address.to_string())];

    while let Some(token) = words.next() {
        let qualifier = Qualifier::parse(token).ok_or_else(|| SelectorError::UnknownKey {
            token: token.to_owned(),
        })?;
        let value = words.next().ok_or(SelectorError::MissingValue {
            key: qualifier.key(),
        })?;
        let canonical = qualifier
            .normalise(value)
            .ok_or_else(|| SelectorError::InvalidValue {
                key: qualifier.key(),
                value: value.to_owned(),
            })?;
        phrases.push((qualifier.key(), canonical));
    }
    Ok(NeighborSelector::Phrases(phrases))
}
