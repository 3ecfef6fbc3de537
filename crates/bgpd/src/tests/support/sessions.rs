//! Snapshot provider backed by fixed snapshots.

use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;

use crate::peers::{PeerKey, SessionSnapshot, SessionSnapshotProvider};

/// Serves snapshots handed to it and records teardown requests.
#[derive(Debug, Default)]
pub struct FixedSessions {
    sessions: BTreeMap<PeerKey, SessionSnapshot>,
    torn_down: Vec<(PeerKey, u32)>,
}

impl FixedSessions {
    /// Adds or replaces a session and returns its key.
    pub fn insert(&mut self, snapshot: SessionSnapshot) -> PeerKey {
        let key = PeerKey::new(snapshot.local_address, snapshot.peer_address);
        self.sessions.insert(key, snapshot);
        key
    }

    /// Mutable access to a stored snapshot.
    pub fn snapshot_mut(&mut self, peer: IpAddr) -> Option<&mut SessionSnapshot> {
        self.sessions
            .values_mut()
            .find(|snapshot| snapshot.peer_address == peer)
    }

    /// Teardown requests received so far.
    pub fn torn_down(&self) -> &[(PeerKey, u32)] {
        &self.torn_down
    }
}

impl SessionSnapshotProvider for FixedSessions {
    fn peers(&self) -> Vec<PeerKey> {
        self.sessions.keys().copied().collect()
    }

    fn established_peers(&self) -> BTreeSet<PeerKey> {
        self.sessions
            .iter()
            .filter(|(_, snapshot)| snapshot.fsm_state.is_established())
            .map(|(key, _)| *key)
            .collect()
    }

    fn neighbor_name(&self, key: &PeerKey) -> Option<String> {
        self.sessions.get(key).map(|snapshot| {
            format!(
                "neighbor {} local-ip {} local-as {} peer-as {}",
                snapshot.peer_address,
                snapshot.local_address,
                snapshot.local_as,
                snapshot
                    .peer_as
                    .map_or_else(|| "n/a".to_owned(), |asn| asn.to_string())
            )
        })
    }

    fn neighbor_ip(&self, key: &PeerKey) -> Option<IpAddr> {
        self.sessions.get(key).map(|snapshot| snapshot.peer_address)
    }

    fn snapshot(&self, key: &PeerKey) -> Option<SessionSnapshot> {
        self.sessions.get(key).cloned()
    }

    fn teardown_peer(&mut self, key: &PeerKey, code: u32) {
        self.torn_down.push((*key, code));
    }
}
