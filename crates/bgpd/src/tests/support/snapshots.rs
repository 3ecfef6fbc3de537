//! Canned session snapshots.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use bgp_config::{Afi, Family, Safi};

use crate::peers::{
    CapabilityState, FamilyState, FsmState, MessageCounter, SessionSnapshot, Uptime,
};

/// Established session with `10.0.0.1`, up for `seconds`.
///
/// IPv4 unicast is negotiated on both sides with add-path receive; UPDATE
/// counters are 12 sent and 34 received.
#[must_use]
pub fn established_snapshot(seconds: u64) -> SessionSnapshot {
    let capabilities = BTreeMap::from([
        (
            "asn4".to_owned(),
            CapabilityState {
                local: Some(true),
                peer: Some(true),
            },
        ),
        (
            "route-refresh".to_owned(),
            CapabilityState {
                local: Some(true),
                peer: Some(false),
            },
        ),
    ]);
    let families = BTreeMap::from([(
        Family::new(Afi::Ipv4, Safi::Unicast),
        FamilyState {
            local_announced: true,
            peer_announced: true,
            addpath_send: false,
            addpath_receive: true,
        },
    )]);
    let messages = BTreeMap::from([
        (
            "keepalive".to_owned(),
            MessageCounter {
                sent: 3,
                received: 3,
            },
        ),
        (
            "update".to_owned(),
            MessageCounter {
                sent: 12,
                received: 34,
            },
        ),
    ]);
    SessionSnapshot {
        local_address: "10.0.0.2".parse().expect("local address"),
        peer_address: "10.0.0.1".parse().expect("peer address"),
        local_as: 65000,
        peer_as: Some(65001),
        local_id: Ipv4Addr::new(1, 1, 1, 1),
        peer_id: Some(Ipv4Addr::new(2, 2, 2, 2)),
        local_hold: 180,
        peer_hold: Some(90),
        fsm_state: FsmState::Established,
        uptime: Uptime::Up(seconds),
        capabilities,
        families,
        messages,
    }
}
