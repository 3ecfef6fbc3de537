//! One-line-per-peer summary table.

use crate::peers::{SessionSnapshot, Uptime};

use super::{format_timedelta, or_na};

/// Column header written before the first row.
pub const SUMMARY_HEADER: &str =
    "Peer            AS        up/down state       |     #sent     #recvd";

/// Renders one summary row.
///
/// Columns: peer address, peer AS, uptime or `down`, lower-case FSM state,
/// UPDATE messages sent and received.
#[must_use]
pub fn summary_row(snapshot: &SessionSnapshot) -> String {
    let uptime = match snapshot.uptime {
        Uptime::Up(seconds) => format_timedelta(seconds),
        Uptime::Down(_) => "down".to_owned(),
    };
    let updates = snapshot.update_counter();
    format!(
        "{:<15} {:<7} {:>9} {:<12} {:>10} {:>10}",
        snapshot.peer_address.to_string(),
        or_na(snapshot.peer_as),
        uptime,
        snapshot.fsm_state.as_str().to_lowercase(),
        updates.sent,
        updates.received,
    )
}
