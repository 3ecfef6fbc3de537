//! Session state exposed to the control channel.
//!
//! The BGP state machine itself lives elsewhere; this module only describes
//! what the command layer may ask of it: which sessions exist, which are
//! established, a fresh [`SessionSnapshot`] of any of them, and a
//! fire-and-forget teardown request.

mod provider;
mod snapshot;
mod table;

use std::fmt;
use std::net::IpAddr;

pub use self::provider::SessionSnapshotProvider;
#[cfg(test)]
pub use self::provider::MockSessionSnapshotProvider;
pub use self::snapshot::{
    AddPathMode, CapabilityState, FamilyState, FsmState, MessageCounter, SessionSnapshot, Uptime,
};
pub use self::table::{MessageKind, PeerTable, RemoteOpen, SessionEvent, TeardownRequest};

const PEERS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::peers");

/// Identity of one BGP session: its local and remote addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeerKey {
    local: IpAddr,
    peer: IpAddr,
}

impl PeerKey {
    /// Builds a key from the session's address pair.
    #[must_use]
    pub const fn new(local: IpAddr, peer: IpAddr) -> Self {
        Self { local, peer }
    }

    /// Remote address.
    #[must_use]
    pub const fn peer(&self) -> IpAddr {
        self.peer
    }

    /// Local address.
    #[must_use]
    pub const fn local(&self) -> IpAddr {
        self.local
    }
}

impl fmt::Display for PeerKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}-{}", self.peer, self.local)
    }
}
