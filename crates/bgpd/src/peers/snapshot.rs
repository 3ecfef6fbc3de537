//! Point-in-time views of one BGP session.

use std::collections::BTreeMap;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

use bgp_config::Family;

/// States of the BGP finite state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FsmState {
    /// No connection attempt in progress.
    Idle,
    /// Waiting for an inbound connection.
    Active,
    /// Outbound connection in progress.
    Connect,
    /// OPEN sent, waiting for the peer's OPEN.
    OpenSent,
    /// OPEN exchanged, waiting for KEEPALIVE.
    OpenConfirm,
    /// Session up.
    Established,
}

impl FsmState {
    /// Upper-case state name as reported by the session machine.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Active => "ACTIVE",
            Self::Connect => "CONNECT",
            Self::OpenSent => "OPENSENT",
            Self::OpenConfirm => "OPENCONFIRM",
            Self::Established => "ESTABLISHED",
        }
    }

    /// Whether the session is up.
    #[must_use]
    pub const fn is_established(self) -> bool {
        matches!(self, Self::Established)
    }
}

impl fmt::Display for FsmState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// How long a session has been up, or down.
///
/// A session is always exactly one of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uptime {
    /// Seconds since the session was established.
    Up(u64),
    /// Seconds since the session was last established, or since it was
    /// configured when it never came up.
    Down(u64),
}

impl Uptime {
    /// Whether the session is currently established.
    #[must_use]
    pub const fn is_up(self) -> bool {
        matches!(self, Self::Up(_))
    }

    /// Seconds in the current state.
    #[must_use]
    pub const fn seconds(self) -> u64 {
        match self {
            Self::Up(seconds) | Self::Down(seconds) => seconds,
        }
    }

    /// `up` or `down`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Up(_) => "up",
            Self::Down(_) => "down",
        }
    }
}

/// Negotiation state of one capability.
///
/// A side is `None` while it is unknown, typically before the peer's OPEN.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilityState {
    /// Advertised locally.
    pub local: Option<bool>,
    /// Advertised by the peer.
    pub peer: Option<bool>,
}

impl CapabilityState {
    /// Whether both sides advertised the capability.
    #[must_use]
    pub const fn both_enabled(self) -> bool {
        matches!((self.local, self.peer), (Some(true), Some(true)))
    }
}

/// Negotiated add-path direction for a family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AddPathMode {
    /// Paths flow both ways.
    SendReceive,
    /// Only sent.
    Send,
    /// Only received.
    Receive,
    /// Not negotiated.
    #[default]
    Disabled,
}

impl AddPathMode {
    /// Builds the mode from the two negotiated directions.
    #[must_use]
    pub const fn from_flags(send: bool, receive: bool) -> Self {
        match (send, receive) {
            (true, true) => Self::SendReceive,
            (true, false) => Self::Send,
            (false, true) => Self::Receive,
            (false, false) => Self::Disabled,
        }
    }

    /// Whether additional paths are sent.
    #[must_use]
    pub const fn sends(self) -> bool {
        matches!(self, Self::SendReceive | Self::Send)
    }

    /// Whether additional paths are received.
    #[must_use]
    pub const fn receives(self) -> bool {
        matches!(self, Self::SendReceive | Self::Receive)
    }

    /// Text shown in the extensive and json views.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SendReceive => "send/receive",
            Self::Send => "send",
            Self::Receive => "receive",
            Self::Disabled => "disabled",
        }
    }
}

/// Negotiation state of one AFI/SAFI pair.
///
/// Fields are always read in this order: local, peer, add-path send,
/// add-path receive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FamilyState {
    /// Announced in our OPEN.
    pub local_announced: bool,
    /// Announced in the peer's OPEN.
    pub peer_announced: bool,
    /// Additional paths are sent for this family.
    pub addpath_send: bool,
    /// Additional paths are received for this family.
    pub addpath_receive: bool,
}

impl FamilyState {
    /// Whether both sides announced the family.
    #[must_use]
    pub const fn both_enabled(self) -> bool {
        self.local_announced && self.peer_announced
    }

    /// Combined add-path direction.
    #[must_use]
    pub const fn add_path(self) -> AddPathMode {
        AddPathMode::from_flags(self.addpath_send, self.addpath_receive)
    }
}

/// Message totals for one message type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageCounter {
    /// Messages sent to the peer.
    pub sent: u64,
    /// Messages received from the peer.
    pub received: u64,
}

/// Immutable view of a session, captured when queried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Local end of the session.
    pub local_address: IpAddr,
    /// Remote end of the session.
    pub peer_address: IpAddr,
    /// Local AS number.
    pub local_as: u32,
    /// AS number from the peer's OPEN.
    pub peer_as: Option<u32>,
    /// Local BGP identifier.
    pub local_id: Ipv4Addr,
    /// BGP identifier from the peer's OPEN.
    pub peer_id: Option<Ipv4Addr>,
    /// Hold time we proposed.
    pub local_hold: u16,
    /// Hold time the peer proposed.
    pub peer_hold: Option<u16>,
    /// Current FSM state.
    pub fsm_state: FsmState,
    /// Time spent up or down.
    pub uptime: Uptime,
    /// Capability name to negotiation state.
    pub capabilities: BTreeMap<String, CapabilityState>,
    /// Family to negotiation state.
    pub families: BTreeMap<Family, FamilyState>,
    /// Message type name to counters.
    pub messages: BTreeMap<String, MessageCounter>,
}

impl SessionSnapshot {
    /// Counters for UPDATE messages.
    #[must_use]
    pub fn update_counter(&self) -> MessageCounter {
        self.messages.get("update").copied().unwrap_or_default()
    }
}
