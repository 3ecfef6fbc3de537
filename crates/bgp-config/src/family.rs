//! Address family identifiers and the family declaration validator.
//!
//! A `family` block in the configuration names the AFI/SAFI pairs a neighbor
//! will negotiate. Only a fixed table of pairs is implemented; everything else
//! is rejected while the block is being read. [`FamilyDeclaration`] collects
//! pairs for one block and is frozen into [`Families`] when the block closes.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Address Family Identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Afi {
    /// IPv4 routes.
    Ipv4,
    /// IPv6 routes.
    Ipv6,
    /// Layer 2 VPN routes.
    L2vpn,
}

impl Afi {
    /// Every AFI the daemon knows, in table order.
    pub const ALL: [Self; 3] = [Self::Ipv4, Self::Ipv6, Self::L2vpn];

    /// Returns the canonical configuration token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
            Self::L2vpn => "l2vpn",
        }
    }

    /// Returns the SAFIs implemented for this AFI.
    #[must_use]
    pub const fn implemented_safi(self) -> &'static [Safi] {
        match self {
            Self::Ipv4 => &[
                Safi::Unicast,
                Safi::Multicast,
                Safi::NlriMpls,
                Safi::MplsVpn,
                Safi::Flow,
                Safi::FlowVpn,
            ],
            Self::Ipv6 => &[Safi::Unicast, Safi::Flow, Safi::FlowVpn],
            Self::L2vpn => &[Safi::Vpls],
        }
    }

    /// Returns `true` when `safi` is implemented for this AFI.
    #[must_use]
    pub fn implements(self, safi: Safi) -> bool {
        self.implemented_safi().contains(&safi)
    }
}

impl fmt::Display for Afi {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Afi {
    type Err = UnknownFamilyToken;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "ipv4" => Ok(Self::Ipv4),
            "ipv6" => Ok(Self::Ipv6),
            "l2vpn" => Ok(Self::L2vpn),
            _ => Err(UnknownFamilyToken(value.to_owned())),
        }
    }
}

/// Subsequent Address Family Identifier.
///
/// The enum lists every SAFI the configuration recognises, including ones
/// with no implemented AFI pairing (`evpn`), so that the validator can report
/// them as unimplemented rather than unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Safi {
    /// Unicast routes.
    Unicast,
    /// Multicast routes.
    Multicast,
    /// Labelled unicast (RFC 3107).
    NlriMpls,
    /// MPLS L3VPN.
    MplsVpn,
    /// Flow specification.
    Flow,
    /// Flow specification for VPNs.
    FlowVpn,
    /// Virtual private LAN service.
    Vpls,
    /// Ethernet VPN.
    Evpn,
}

impl Safi {
    /// Returns the canonical configuration token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unicast => "unicast",
            Self::Multicast => "multicast",
            Self::NlriMpls => "nlri-mpls",
            Self::MplsVpn => "mpls-vpn",
            Self::Flow => "flow",
            Self::FlowVpn => "flow-vpn",
            Self::Vpls => "vpls",
            Self::Evpn => "evpn",
        }
    }
}

impl fmt::Display for Safi {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Safi {
    type Err = UnknownFamilyToken;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "unicast" => Ok(Self::Unicast),
            "multicast" => Ok(Self::Multicast),
            "nlri-mpls" => Ok(Self::NlriMpls),
            "mpls-vpn" => Ok(Self::MplsVpn),
            "flow" => Ok(Self::Flow),
            "flow-vpn" => Ok(Self::FlowVpn),
            "vpls" => Ok(Self::Vpls),
            "evpn" => Ok(Self::Evpn),
            _ => Err(UnknownFamilyToken(value.to_owned())),
        }
    }
}

/// Error returned when an AFI or SAFI token is not recognised.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown address family token: {0}")]
pub struct UnknownFamilyToken(String);

impl UnknownFamilyToken {
    /// Returns the offending token.
    #[must_use]
    pub fn token(&self) -> &str {
        self.0.as_str()
    }
}

/// One AFI/SAFI pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Family {
    /// Address family.
    pub afi: Afi,
    /// Subsequent address family.
    pub safi: Safi,
}

impl Family {
    /// Builds a pair.
    #[must_use]
    pub const fn new(afi: Afi, safi: Safi) -> Self {
        Self { afi, safi }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} {}", self.afi, self.safi)
    }
}

/// Errors raised while validating a family declaration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FamilyError {
    /// The SAFI is not implemented for the AFI.
    #[error("the family pair afi/safi {afi}/{safi} is unimplemented")]
    Unimplemented {
        /// Declared AFI.
        afi: Afi,
        /// Declared SAFI.
        safi: Safi,
    },
    /// The pair was already declared in the same block.
    #[error("afi/safi pair {afi}/{safi} already defined in this family")]
    Duplicate {
        /// Declared AFI.
        afi: Afi,
        /// Declared SAFI.
        safi: Safi,
    },
}

/// Family pairs collected while one `family` block is open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FamilyDeclaration {
    declared: BTreeMap<Afi, Vec<Safi>>,
}

impl FamilyDeclaration {
    /// Starts an empty declaration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one pair.
    ///
    /// # Errors
    ///
    /// Returns [`FamilyError::Unimplemented`] when `safi` is not implemented
    /// for `afi` and [`FamilyError::Duplicate`] when the pair was already
    /// recorded. The declaration is unchanged on error.
    pub fn add(&mut self, afi: Afi, safi: Safi) -> Result<(), FamilyError> {
        if !afi.implements(safi) {
            return Err(FamilyError::Unimplemented { afi, safi });
        }
        let known = self.declared.entry(afi).or_default();
        if known.contains(&safi) {
            return Err(FamilyError::Duplicate { afi, safi });
        }
        known.push(safi);
        Ok(())
    }

    /// Records every implemented pair.
    ///
    /// # Errors
    ///
    /// Returns [`FamilyError::Duplicate`] when a pair was declared explicitly
    /// before `all`. The declaration is unchanged on error.
    pub fn add_all(&mut self) -> Result<(), FamilyError> {
        let implemented = || {
            Afi::ALL
                .into_iter()
                .flat_map(|afi| afi.implemented_safi().iter().map(move |safi| (afi, *safi)))
        };
        if let Some((afi, safi)) = implemented().find(|(afi, safi)| self.contains(*afi, *safi)) {
            return Err(FamilyError::Duplicate { afi, safi });
        }
        for (afi, safi) in implemented() {
            self.declared.entry(afi).or_default().push(safi);
        }
        Ok(())
    }

    /// Returns `true` when the pair has been recorded.
    #[must_use]
    pub fn contains(&self, afi: Afi, safi: Safi) -> bool {
        self.declared
            .get(&afi)
            .is_some_and(|known| known.contains(&safi))
    }

    /// Freezes the declaration.
    #[must_use]
    pub fn finish(self) -> Families {
        Families {
            declared: self
                .declared
                .into_iter()
                .filter(|(_, safis)| !safis.is_empty())
                .collect(),
        }
    }
}

/// Immutable set of declared families.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Families {
    declared: BTreeMap<Afi, Vec<Safi>>,
}

impl Families {
    /// Returns the SAFIs declared for `afi`, in declaration order.
    #[must_use]
    pub fn safis(&self, afi: Afi) -> &[Safi] {
        self.declared.get(&afi).map_or(&[], Vec::as_slice)
    }

    /// Returns `true` when the pair is part of the set.
    #[must_use]
    pub fn contains(&self, family: Family) -> bool {
        self.safis(family.afi).contains(&family.safi)
    }

    /// Iterates over every declared pair, AFI first.
    pub fn iter(&self) -> impl Iterator<Item = Family> + '_ {
        self.declared
            .iter()
            .flat_map(|(afi, safis)| safis.iter().map(|safi| Family::new(*afi, *safi)))
    }

    /// Number of declared pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.declared.values().map(Vec::len).sum()
    }

    /// Returns `true` when no pair was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declared.is_empty()
    }
}
