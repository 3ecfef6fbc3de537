//! Parser for the neighbor configuration file.
//!
//! The file declares named `family` blocks and `neighbor` blocks:
//!
//! ```text
//! family core {
//!     all
//! }
//!
//! neighbor 10.0.0.1 {
//!     local-as 65000;
//!     peer-as 65001;
//!     family core;
//! }
//! ```
//!
//! Neighbors may also declare an inline `family { ... }` block. Family blocks
//! are validated as they are read: unknown tokens, unimplemented pairs and
//! duplicates abort loading with the location of the offending token.

use std::collections::BTreeMap;
use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use camino::Utf8Path;

use crate::error::ConfigurationError;
use crate::family::{Afi, Families, FamilyDeclaration, Safi};
use crate::neighbor::NeighborConfig;
use crate::tokeniser::{Location, Token, TokenKind, tokenise};

/// Parsed neighbor configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BgpConfiguration {
    families: BTreeMap<String, Families>,
    neighbors: Vec<NeighborConfig>,
}

impl BgpConfiguration {
    /// Reads and parses the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Read`] when the file cannot be read, or
    /// any parse error raised by [`BgpConfiguration::parse`].
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigurationError> {
        let source = fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&source)
    }

    /// Parses configuration text.
    ///
    /// # Errors
    ///
    /// Returns a located [`ConfigurationError`] for the first problem found.
    pub fn parse(source: &str) -> Result<Self, ConfigurationError> {
        let tokens = tokenise(source)
            .map_err(|error| ConfigurationError::UnterminatedString {
                location: error.location,
            })?;
        Parser::new(tokens).parse()
    }

    /// Configured neighbors in file order.
    #[must_use]
    pub fn neighbors(&self) -> &[NeighborConfig] {
        &self.neighbors
    }

    /// Looks up a named family block.
    #[must_use]
    pub fn family(&self, name: &str) -> Option<&Families> {
        self.families.get(name)
    }

    /// Builds a configuration from already validated neighbors.
    #[must_use]
    pub fn from_neighbors(neighbors: Vec<NeighborConfig>) -> Self {
        Self {
            families: BTreeMap::new(),
            neighbors,
        }
    }
}

struct Parser {
    tokens: std::vec::IntoIter<Token>,
    configuration: BgpConfiguration,
}

/// Statements collected for one neighbor block before validation.
#[derive(Default)]
struct NeighborStatements {
    description: Option<String>,
    router_id: Option<Ipv4Addr>,
    local_address: Option<IpAddr>,
    local_as: Option<u32>,
    peer_as: Option<u32>,
    hold_time: Option<u16>,
    families: Option<Families>,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into_iter(),
            configuration: BgpConfiguration::default(),
        }
    }

    fn parse(mut self) -> Result<BgpConfiguration, ConfigurationError> {
        while let Some(token) = self.tokens.next() {
            match &token.kind {
                TokenKind::Semicolon => {}
                TokenKind::Word(word) if word == "family" => self.named_family()?,
                TokenKind::Word(word) if word == "neighbor" => self.neighbor(token.location)?,
                _ => return Err(unexpected(&token, "'family' or 'neighbor'")),
            }
        }
        Ok(self.configuration)
    }

    fn next_token(&mut self, expected: &'static str) -> Result<Token, ConfigurationError> {
        self.tokens
            .next()
            .ok_or(ConfigurationError::UnexpectedEof { expected })
    }

    fn word(&mut self, expected: &'static str) -> Result<(String, Location), ConfigurationError> {
        let token = self.next_token(expected)?;
        match token.kind {
            TokenKind::Word(word) | TokenKind::Quoted(word) => Ok((word, token.location)),
            _ => Err(unexpected(&token, expected)),
        }
    }

    fn open_brace(&mut self) -> Result<(), ConfigurationError> {
        let token = self.next_token("'{'")?;
        if token.kind == TokenKind::OpenBrace {
            Ok(())
        } else {
            Err(unexpected(&token, "'{'"))
        }
    }

    fn named_family(&mut self) -> Result<(), ConfigurationError> {
        let (name, location) = self.word("family block name")?;
        self.open_brace()?;
        let families = self.family_body()?;
        if self.configuration.families.contains_key(&name) {
            return Err(ConfigurationError::DuplicateFamilyBlock { name, location });
        }
        self.configuration.families.insert(name, families);
        Ok(())
    }

    fn family_body(&mut self) -> Result<Families, ConfigurationError> {
        let mut declaration = FamilyDeclaration::new();
        loop {
            let token = self.next_token("family statement or '}'")?;
            match token.kind {
                TokenKind::CloseBrace => return Ok(declaration.finish()),
                TokenKind::Semicolon => {}
                TokenKind::Word(word) if word == "all" => {
                    declaration
                        .add_all()
                        .map_err(|source| ConfigurationError::Family {
                            source,
                            token: word,
                            location: token.location,
                        })?;
                }
                TokenKind::Word(word) => {
                    let afi = Afi::from_str(&word).map_err(|_| ConfigurationError::UnknownAfi {
                        token: word,
                        location: token.location,
                    })?;
                    self.family_safis(&mut declaration, afi)?;
                }
                _ => return Err(unexpected(&token, "family statement or '}'")),
            }
        }
    }

    fn family_safis(
        &mut self,
        declaration: &mut FamilyDeclaration,
        afi: Afi,
    ) -> Result<(), ConfigurationError> {
        let token = self.next_token("SAFI or '['")?;
        match token.kind {
            TokenKind::OpenBracket => loop {
                let inner = self.next_token("SAFI or ']'")?;
                match inner.kind {
                    TokenKind::CloseBracket => return Ok(()),
                    TokenKind::Word(safi) => add_pair(declaration, afi, safi, inner.location)?,
                    _ => return Err(unexpected(&inner, "SAFI or ']'")),
                }
            },
            TokenKind::Word(safi) => add_pair(declaration, afi, safi, token.location),
            _ => Err(unexpected(&token, "SAFI or '['")),
        }
    }

    fn neighbor(&mut self, start: Location) -> Result<(), ConfigurationError> {
        let (address_text, address_location) = self.word("neighbor address")?;
        let peer_address = parse_value::<IpAddr>("neighbor", &address_text, address_location)?;
        self.open_brace()?;

        let mut statements = NeighborStatements::default();
        loop {
            let token = self.next_token("neighbor statement or '}'")?;
            let keyword = match token.kind {
                TokenKind::CloseBrace => break,
                TokenKind::Semicolon => continue,
                TokenKind::Word(ref word) => word.clone(),
                _ => return Err(unexpected(&token, "neighbor statement or '}'")),
            };
            self.neighbor_statement(&mut statements, &keyword, token.location)?;
        }

        if self
            .configuration
            .neighbors
            .iter()
            .any(|existing| existing.peer_address == peer_address)
        {
            return Err(ConfigurationError::DuplicateNeighbor {
                address: address_text,
                location: address_location,
            });
        }

        let missing = |field| ConfigurationError::MissingField {
            address: address_text.clone(),
            field,
            location: start,
        };
        let local_as = statements.local_as.ok_or_else(|| missing("local-as"))?;
        let peer_as = statements.peer_as.ok_or_else(|| missing("peer-as"))?;
        let mut neighbor = NeighborConfig::new(peer_address, local_as, peer_as);
        neighbor.description = statements.description;
        neighbor.router_id = statements.router_id;
        neighbor.local_address = statements.local_address;
        if let Some(hold_time) = statements.hold_time {
            neighbor.hold_time = hold_time;
        }
        if let Some(families) = statements.families {
            neighbor.families = families;
        }
        self.configuration.neighbors.push(neighbor);
        Ok(())
    }

    fn neighbor_statement(
        &mut self,
        statements: &mut NeighborStatements,
        keyword: &str,
        location: Location,
    ) -> Result<(), ConfigurationError> {
        match keyword {
            "description" => {
                let (value, _) = self.word("description text")?;
                set_once(&mut statements.description, value, "description", location)
            }
            "router-id" => {
                let value = self.value::<Ipv4Addr>("router-id")?;
                set_once(&mut statements.router_id, value, "router-id", location)
            }
            "local-address" => {
                let value = self.value::<IpAddr>("local-address")?;
                set_once(&mut statements.local_address, value, "local-address", location)
            }
            "local-as" => {
                let value = self.value::<u32>("local-as")?;
                set_once(&mut statements.local_as, value, "local-as", location)
            }
            "peer-as" => {
                let value = self.value::<u32>("peer-as")?;
                set_once(&mut statements.peer_as, value, "peer-as", location)
            }
            "hold-time" => {
                let value = self.value::<u16>("hold-time")?;
                set_once(&mut statements.hold_time, value, "hold-time", location)
            }
            "family" => {
                let families = self.neighbor_family()?;
                set_once(&mut statements.families, families, "family", location)
            }
            other => Err(ConfigurationError::UnexpectedToken {
                found: other.to_owned(),
                expected: "neighbor statement or '}'",
                location,
            }),
        }
    }

    fn neighbor_family(&mut self) -> Result<Families, ConfigurationError> {
        let token = self.next_token("family block or name")?;
        match token.kind {
            TokenKind::OpenBrace => self.family_body(),
            TokenKind::Word(name) => self.configuration.family(&name).cloned().ok_or(
                ConfigurationError::UnknownFamilyReference {
                    name,
                    location: token.location,
                },
            ),
            _ => Err(unexpected(&token, "family block or name")),
        }
    }

    fn value<T: FromStr>(&mut self, field: &'static str) -> Result<T, ConfigurationError> {
        let (text, location) = self.word(field)?;
        parse_value(field, &text, location)
    }
}

fn add_pair(
    declaration: &mut FamilyDeclaration,
    afi: Afi,
    safi_token: String,
    location: Location,
) -> Result<(), ConfigurationError> {
    let Ok(safi) = Safi::from_str(&safi_token) else {
        return Err(ConfigurationError::UnknownSafi {
            token: safi_token,
            location,
        });
    };
    declaration
        .add(afi, safi)
        .map_err(|source| ConfigurationError::Family {
            source,
            token: safi_token,
            location,
        })
}

fn set_once<T>(
    slot: &mut Option<T>,
    value: T,
    field: &'static str,
    location: Location,
) -> Result<(), ConfigurationError> {
    if slot.is_some() {
        return Err(ConfigurationError::DuplicateStatement { field, location });
    }
    *slot = Some(value);
    Ok(())
}

fn parse_value<T: FromStr>(
    field: &'static str,
    text: &str,
    location: Location,
) -> Result<T, ConfigurationError> {
    text.parse().map_err(|_| ConfigurationError::InvalidValue {
        field,
        value: text.to_owned(),
        location,
    })
}

fn unexpected(token: &Token, expected: &'static str) -> ConfigurationError {
    ConfigurationError::UnexpectedToken {
        found: token.kind.to_string(),
        expected,
        location: token.location,
    }
}
