//! Typed records behind `show neighbor json`.

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr};

use serde::Serialize;

use crate::peers::SessionSnapshot;

/// One side of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SideView {
    /// Capability name to advertised flag; `null` when unknown.
    pub capabilities: BTreeMap<String, Option<bool>>,
    /// `"afi safi"` to announced flag.
    pub families: BTreeMap<String, bool>,
    /// `"afi safi"` to add-path flag (send for local, receive for peer).
    #[serde(rename = "add-path")]
    pub add_path: BTreeMap<String, bool>,
    /// Session address.
    pub address: IpAddr,
    /// AS number.
    #[serde(rename = "as")]
    pub asn: Option<u32>,
    /// BGP identifier.
    pub id: Option<Ipv4Addr>,
    /// Hold time.
    pub hold: Option<u16>,
}

/// Message counters keyed by message type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MessageTotals {
    /// Messages sent.
    pub sent: BTreeMap<String, u64>,
    /// Messages received.
    pub received: BTreeMap<String, u64>,
}

/// JSON object describing one peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NeighborRecord {
    /// `up` or `down`.
    pub state: &'static str,
    /// Seconds in the current state.
    pub duration: u64,
    /// FSM state name.
    pub fsm: String,
    /// Our side.
    pub local: SideView,
    /// The peer's side.
    pub peer: SideView,
    /// Message counters.
    pub messages: MessageTotals,
    /// Capabilities both sides advertised.
    pub capabilities: Vec<String>,
    /// Families both sides announced.
    pub families: Vec<String>,
    /// Combined add-path mode per family.
    #[serde(rename = "add-path")]
    pub add_path: BTreeMap<String, &'static str>,
}

impl NeighborRecord {
    /// Builds the record for one snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        let mut local = SideView {
            capabilities: BTreeMap::new(),
            families: BTreeMap::new(),
            add_path: BTreeMap::new(),
            address: snapshot.local_address,
            asn: Some(snapshot.local_as),
            id: Some(snapshot.local_id),
            hold: Some(snapshot.local_hold),
        };
        let mut peer = SideView {
            capabilities: BTreeMap::new(),
            families: BTreeMap::new(),
            add_path: BTreeMap::new(),
            address: snapshot.peer_address,
            asn: snapshot.peer_as,
            id: snapshot.peer_id,
            hold: snapshot.peer_hold,
        };
        let mut capabilities = Vec::new();
        let mut families = Vec::new();
        let mut add_path = BTreeMap::new();

        for (family, state) in &snapshot.families {
            let name = family.to_string();
            local.families.insert(name.clone(), state.local_announced);
            peer.families.insert(name.clone(), state.peer_announced);
            local.add_path.insert(name.clone(), state.addpath_send);
            peer.add_path.insert(name.clone(), state.addpath_receive);
            if state.both_enabled() {
                families.push(name.clone());
            }
            add_path.insert(name, state.add_path().as_str());
        }

        for (name, state) in &snapshot.capabilities {
            local.capabilities.insert(name.clone(), state.local);
            peer.capabilities.insert(name.clone(), state.peer);
            if state.both_enabled() {
                capabilities.push(name.clone());
            }
        }

        let mut messages = MessageTotals::default();
        for (name, counter) in &snapshot.messages {
            messages.sent.insert(name.clone(), counter.sent);
            messages.received.insert(name.clone(), counter.received);
        }

        Self {
            state: snapshot.uptime.label(),
            duration: snapshot.uptime.seconds(),
            fsm: snapshot.fsm_state.to_string(),
            local,
            peer,
            messages,
            capabilities,
            families,
            add_path,
        }
    }
}

/// Renders every snapshot as a single-line JSON array.
///
/// # Errors
///
/// Returns the serializer error if a record cannot be encoded.
pub fn render_json(snapshots: &[SessionSnapshot]) -> Result<String, serde_json::Error> {
    let records: Vec<NeighborRecord> = snapshots.iter().map(NeighborRecord::from_snapshot).collect();
    serde_json::to_string(&records)
}

#[cfg(test)]
mod tests {
    use bgp_config::{Afi, Family, Safi};
    use serde_json::Value;

    use crate::peers::{FamilyState, Uptime};
    use crate::tests::support::snapshots::established_snapshot;

    use super::*;

    #[test]
    fn families_list_only_pairs_enabled_on_both_sides() {
        let mut snapshot = established_snapshot(30);
        snapshot.families.insert(
            Family::new(Afi::Ipv6, Safi::Unicast),
            FamilyState {
                local_announced: true,
                peer_announced: false,
                ..FamilyState::default()
            },
        );
        let record = NeighborRecord::from_snapshot(&snapshot);
        assert_eq!(record.families, vec!["ipv4 unicast".to_owned()]);
        assert_eq!(record.local.families.get("ipv6 unicast"), Some(&true));
        assert_eq!(record.peer.families.get("ipv6 unicast"), Some(&false));
    }

    #[test]
    fn renders_single_line_array_with_expected_keys() {
        let mut down = established_snapshot(0);
        down.uptime = Uptime::Down(12);
        let rendered = render_json(&[established_snapshot(5), down]).expect("render");
        assert!(!rendered.contains('\n'));

        let value: Value = serde_json::from_str(&rendered).expect("valid json");
        let peers = value.as_array().expect("array");
        assert_eq!(peers.len(), 2);
        let first = &peers[0];
        assert_eq!(first["state"], "up");
        assert_eq!(first["duration"], 5);
        assert_eq!(first["fsm"], "ESTABLISHED");
        assert_eq!(first["local"]["as"], 65000);
        assert_eq!(first["peer"]["address"], "10.0.0.1");
        assert_eq!(first["messages"]["sent"]["update"], 12);
        assert_eq!(first["add-path"]["ipv4 unicast"], "receive");
        assert_eq!(first["capabilities"], serde_json::json!(["asn4"]));
        assert_eq!(peers[1]["state"], "down");
        assert_eq!(peers[1]["duration"], 12);
    }
}
