//! Contract between the command layer and the session state machine.

use std::collections::BTreeSet;
use std::net::IpAddr;

use super::{PeerKey, SessionSnapshot};

/// Read access to live sessions plus teardown requests.
///
/// Every query reflects the state at the time of the call; nothing returned
/// here is cached by the implementation or updated afterwards.
#[cfg_attr(test, mockall::automock)]
pub trait SessionSnapshotProvider {
    /// Every known session, in a stable order.
    fn peers(&self) -> Vec<PeerKey>;

    /// Sessions currently in the established state.
    fn established_peers(&self) -> BTreeSet<PeerKey>;

    /// Selector name of the neighbor behind `key`.
    fn neighbor_name(&self, key: &PeerKey) -> Option<String>;

    /// Remote address of the neighbor behind `key`.
    fn neighbor_ip(&self, key: &PeerKey) -> Option<IpAddr>;

    /// Fresh snapshot of the session.
    fn snapshot(&self, key: &PeerKey) -> Option<SessionSnapshot>;

    /// Asks the session to close with the given NOTIFICATION error code.
    ///
    /// Returns immediately; closure happens on the session's own schedule.
    fn teardown_peer(&mut self, key: &PeerKey, code: u32);
}
