//! Multi-section per-peer report.

use crate::peers::{SessionSnapshot, Uptime};

use super::{enabled, format_timedelta, or_na};

/// Formats one labelled row of the report.
#[must_use]
pub fn extensive_row(label: &str, first: &str, second: &str, third: &str) -> String {
    format!("   {label:<20} {first:>15} {second:>15} {third:>15}")
}

/// Renders the extensive report of one session, one entry per line.
///
/// The report ends with an empty line separating it from the next peer.
#[must_use]
pub fn extensive(snapshot: &SessionSnapshot) -> Vec<String> {
    let mut lines = vec![format!("Neighbor {}", snapshot.peer_address), String::new()];

    lines.push("    Session                         Local".to_owned());
    lines.push(extensive_row(
        "local",
        &snapshot.local_address.to_string(),
        "",
        "",
    ));
    lines.push(extensive_row("state", snapshot.fsm_state.as_str(), "", ""));
    let (label, seconds) = match snapshot.uptime {
        Uptime::Up(seconds) => ("up for", seconds),
        Uptime::Down(seconds) => ("down for", seconds),
    };
    lines.push(extensive_row(label, &format_timedelta(seconds), "", ""));
    lines.push(String::new());

    lines.push("    Setup                           Local          Remote".to_owned());
    lines.push(extensive_row(
        "AS",
        &snapshot.local_as.to_string(),
        &or_na(snapshot.peer_as),
        "",
    ));
    lines.push(extensive_row(
        "ID",
        &snapshot.local_id.to_string(),
        &or_na(snapshot.peer_id),
        "",
    ));
    lines.push(extensive_row(
        "hold-time",
        &snapshot.local_hold.to_string(),
        &or_na(snapshot.peer_hold),
        "",
    ));
    lines.push(String::new());

    lines.push("    Capability                      Local          Remote".to_owned());
    for (name, state) in &snapshot.capabilities {
        lines.push(extensive_row(
            &format!("{name}:"),
            enabled(state.local),
            enabled(state.peer),
            "",
        ));
    }
    lines.push(String::new());

    lines.push("    Families                        Local          Remote        Add-Path".to_owned());
    for (family, state) in &snapshot.families {
        lines.push(extensive_row(
            &format!("{family}:"),
            enabled(Some(state.local_announced)),
            enabled(Some(state.peer_announced)),
            state.add_path().as_str(),
        ));
    }
    lines.push(String::new());

    lines.push("    Message Statistic                Sent        Received".to_owned());
    for (name, counter) in &snapshot.messages {
        lines.push(extensive_row(
            &format!("{name}:"),
            &counter.sent.to_string(),
            &counter.received.to_string(),
            "",
        ));
    }
    lines.push(String::new());
    lines
}
