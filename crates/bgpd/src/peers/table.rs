//! In-memory session table fed by the session state machine.

use std::collections::{BTreeMap, BTreeSet};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Instant;

use bgp_config::{BgpConfiguration, Family, NeighborConfig};
use tracing::{debug, info};

use super::{
    AddPathMode, CapabilityState, FamilyState, FsmState, MessageCounter, PEERS_TARGET, PeerKey,
    SessionSnapshot, SessionSnapshotProvider, Uptime,
};

/// Capabilities every session advertises.
const LOCAL_CAPABILITIES: [&str; 3] = ["asn4", "multiprotocol", "route-refresh"];

/// BGP message types with counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessageKind {
    /// OPEN.
    Open,
    /// UPDATE.
    Update,
    /// NOTIFICATION.
    Notification,
    /// KEEPALIVE.
    Keepalive,
    /// ROUTE-REFRESH.
    RouteRefresh,
}

impl MessageKind {
    /// Every counted message type.
    pub const ALL: [Self; 5] = [
        Self::Open,
        Self::Update,
        Self::Notification,
        Self::Keepalive,
        Self::RouteRefresh,
    ];

    /// Counter name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Update => "update",
            Self::Notification => "notification",
            Self::Keepalive => "keepalive",
            Self::RouteRefresh => "refresh",
        }
    }
}

/// Parameters learnt from the peer's OPEN message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteOpen {
    /// Peer AS number.
    pub peer_as: u32,
    /// Peer BGP identifier.
    pub router_id: Ipv4Addr,
    /// Proposed hold time.
    pub hold_time: u16,
    /// Advertised capability names.
    pub capabilities: BTreeSet<String>,
    /// Announced families.
    pub families: BTreeSet<Family>,
    /// Negotiated add-path direction per family.
    pub add_path: BTreeMap<Family, AddPathMode>,
}

/// Changes reported by the session state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The FSM moved to a new state.
    Transition(FsmState),
    /// The peer's OPEN was accepted.
    OpenReceived(RemoteOpen),
    /// A message was sent to the peer.
    MessageSent(MessageKind),
    /// A message was received from the peer.
    MessageReceived(MessageKind),
}

/// A teardown the session machine has yet to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeardownRequest {
    /// Session to close.
    pub key: PeerKey,
    /// NOTIFICATION error code.
    pub code: u32,
}

#[derive(Debug, Clone)]
struct SessionState {
    fsm: FsmState,
    changed_at: Instant,
    remote: Option<RemoteOpen>,
    messages: BTreeMap<MessageKind, MessageCounter>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            fsm: FsmState::Idle,
            changed_at: Instant::now(),
            remote: None,
            messages: BTreeMap::new(),
        }
    }

    fn transition(&mut self, state: FsmState) {
        if self.fsm == state {
            return;
        }
        if self.fsm.is_established() || state.is_established() {
            self.changed_at = Instant::now();
        }
        if state == FsmState::Idle {
            self.remote = None;
        }
        self.fsm = state;
    }

    fn uptime(&self) -> Uptime {
        let seconds = self.changed_at.elapsed().as_secs();
        if self.fsm.is_established() {
            Uptime::Up(seconds)
        } else {
            Uptime::Down(seconds)
        }
    }
}

#[derive(Debug, Clone)]
struct PeerEntry {
    neighbor: NeighborConfig,
    session: SessionState,
}

/// Sessions for every configured neighbor.
#[derive(Debug, Clone, Default)]
pub struct PeerTable {
    entries: BTreeMap<PeerKey, PeerEntry>,
    /// At most one pending request per session; a newer code replaces the
    /// older one.
    teardowns: BTreeMap<PeerKey, u32>,
}

impl PeerTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates one idle session per configured neighbor.
    #[must_use]
    pub fn from_configuration(configuration: &BgpConfiguration) -> Self {
        let mut table = Self::new();
        for neighbor in configuration.neighbors() {
            table.add_neighbor(neighbor.clone());
        }
        table
    }

    /// Adds an idle session for `neighbor` and returns its key.
    pub fn add_neighbor(&mut self, neighbor: NeighborConfig) -> PeerKey {
        let key = key_for(&neighbor);
        self.entries.insert(
            key,
            PeerEntry {
                neighbor,
                session: SessionState::new(),
            },
        );
        key
    }

    /// Number of sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no neighbor is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Applies an event from the session state machine.
    ///
    /// Returns `false` when `key` names no session.
    pub fn update(&mut self, key: &PeerKey, event: SessionEvent) -> bool {
        let Some(entry) = self.entries.get_mut(key) else {
            return false;
        };
        match event {
            SessionEvent::Transition(state) => {
                debug!(
                    target: PEERS_TARGET,
                    peer = %key,
                    from = %entry.session.fsm,
                    to = %state,
                    "session state changed"
                );
                entry.session.transition(state);
            }
            SessionEvent::OpenReceived(open) => entry.session.remote = Some(open),
            SessionEvent::MessageSent(kind) => {
                entry.session.messages.entry(kind).or_default().sent += 1;
            }
            SessionEvent::MessageReceived(kind) => {
                entry.session.messages.entry(kind).or_default().received += 1;
            }
        }
        true
    }

    /// Drains teardown requests not yet handed to the session machine, in
    /// key order.
    pub fn take_teardowns(&mut self) -> Vec<TeardownRequest> {
        std::mem::take(&mut self.teardowns)
            .into_iter()
            .map(|(key, code)| TeardownRequest { key, code })
            .collect()
    }

    /// Number of teardown requests waiting for the session machine.
    #[must_use]
    pub fn pending_teardowns(&self) -> usize {
        self.teardowns.len()
    }
}

impl SessionSnapshotProvider for PeerTable {
    fn peers(&self) -> Vec<PeerKey> {
        self.entries.keys().copied().collect()
    }

    fn established_peers(&self) -> BTreeSet<PeerKey> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.session.fsm.is_established())
            .map(|(key, _)| *key)
            .collect()
    }

    fn neighbor_name(&self, key: &PeerKey) -> Option<String> {
        self.entries.get(key).map(|entry| entry.neighbor.name())
    }

    fn neighbor_ip(&self, key: &PeerKey) -> Option<IpAddr> {
        self.entries
            .get(key)
            .map(|entry| entry.neighbor.peer_address)
    }

    fn snapshot(&self, key: &PeerKey) -> Option<SessionSnapshot> {
        self.entries
            .get(key)
            .map(|entry| snapshot_of(*key, &entry.neighbor, &entry.session))
    }

    fn teardown_peer(&mut self, key: &PeerKey, code: u32) {
        let Some(entry) = self.entries.get_mut(key) else {
            return;
        };
        entry.session.transition(FsmState::Idle);
        self.teardowns.insert(*key, code);
        info!(
            target: PEERS_TARGET,
            peer = %key,
            code,
            "session teardown requested"
        );
    }
}

fn key_for(neighbor: &NeighborConfig) -> PeerKey {
    let local = neighbor
        .local_address
        .unwrap_or(match neighbor.peer_address {
            IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        });
    PeerKey::new(local, neighbor.peer_address)
}

fn local_id(key: PeerKey, neighbor: &NeighborConfig) -> Ipv4Addr {
    neighbor.router_id.unwrap_or(match key.local() {
        IpAddr::V4(address) => address,
        IpAddr::V6(_) => Ipv4Addr::UNSPECIFIED,
    })
}

fn snapshot_of(key: PeerKey, neighbor: &NeighborConfig, session: &SessionState) -> SessionSnapshot {
    let remote = session.remote.as_ref();

    let mut capabilities: BTreeMap<String, CapabilityState> = LOCAL_CAPABILITIES
        .iter()
        .map(|name| {
            let local = *name != "multiprotocol" || !neighbor.families.is_empty();
            let state = CapabilityState {
                local: Some(local),
                peer: remote.map(|open| open.capabilities.contains(*name)),
            };
            ((*name).to_owned(), state)
        })
        .collect();
    if let Some(open) = remote {
        for name in &open.capabilities {
            capabilities
                .entry(name.clone())
                .or_insert(CapabilityState {
                    local: Some(false),
                    peer: Some(true),
                });
        }
    }

    let mut families: BTreeMap<Family, FamilyState> = neighbor
        .families
        .iter()
        .map(|family| {
            let state = FamilyState {
                local_announced: true,
                ..FamilyState::default()
            };
            (family, state)
        })
        .collect();
    if let Some(open) = remote {
        for family in &open.families {
            families.entry(*family).or_default().peer_announced = true;
        }
        for (family, mode) in &open.add_path {
            let state = families.entry(*family).or_default();
            state.addpath_send = mode.sends();
            state.addpath_receive = mode.receives();
        }
    }

    let messages = MessageKind::ALL
        .iter()
        .map(|kind| {
            let counter = session.messages.get(kind).copied().unwrap_or_default();
            (kind.as_str().to_owned(), counter)
        })
        .collect();

    SessionSnapshot {
        local_address: key.local(),
        peer_address: key.peer(),
        local_as: neighbor.local_as,
        peer_as: remote.map(|open| open.peer_as),
        local_id: local_id(key, neighbor),
        peer_id: remote.map(|open| open.router_id),
        local_hold: neighbor.hold_time,
        peer_hold: remote.map(|open| open.hold_time),
        fsm_state: session.fsm,
        uptime: session.uptime(),
        capabilities,
        families,
        messages,
    }
}
