//! `show neighbor [<filter>] [summary|extensive|configuration|json]`.
//!
//! Every mode is produced lazily, one line per scheduler step. Peers are
//! listed when the first step runs and each snapshot is taken when its turn
//! comes, so output reflects live state rather than the state at dispatch.

use std::collections::VecDeque;

use crate::dispatch::errors::CommandError;
use crate::dispatch::registry::{HandlerContext, HandlerOutcome, Invocation};
use crate::format::{SUMMARY_HEADER, extensive, render_json, summary_row};
use crate::peers::{PeerKey, SessionSnapshotProvider};
use crate::scheduler::{OutputSequence, StaticLines, Step, StepContext};

const USAGE: [&str; 2] = [
    "please specify summary, extensive or configuration",
    "you can filter by peer ip address adding it after the word neighbor",
];

/// Schedules the output for the selected mode.
pub(crate) fn show_neighbor(
    invocation: &Invocation<'_>,
    _context: &mut HandlerContext<'_>,
) -> Result<HandlerOutcome, CommandError> {
    let filter = invocation.filter.clone();
    let sequence: Box<dyn OutputSequence> = match invocation.mode {
        Some("json") => Box::new(JsonOutput::default()),
        Some("summary") => Box::new(PeerOutput::new(View::Summary, filter)),
        Some("extensive") => Box::new(PeerOutput::new(View::Extensive, filter)),
        Some("configuration") => Box::new(ConfigurationOutput::new(filter)),
        _ => Box::new(StaticLines::new(USAGE)),
    };
    Ok(HandlerOutcome::Scheduled(sequence))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Summary,
    Extensive,
}

impl View {
    fn selects(self, peers: &dyn SessionSnapshotProvider, key: &PeerKey, filter: &str) -> bool {
        match self {
            Self::Summary => peers
                .neighbor_ip(key)
                .is_some_and(|ip| ip.to_string() == filter),
            Self::Extensive => peers
                .neighbor_name(key)
                .is_some_and(|name| name.contains(filter)),
        }
    }
}

/// Per-peer text output for `summary` and `extensive`.
struct PeerOutput {
    view: View,
    filter: Option<String>,
    peers: Option<VecDeque<PeerKey>>,
    pending: VecDeque<String>,
}

impl PeerOutput {
    fn new(view: View, filter: Option<String>) -> Self {
        Self {
            view,
            filter,
            peers: None,
            pending: VecDeque::new(),
        }
    }
}

impl OutputSequence for PeerOutput {
    fn step(&mut self, context: &StepContext<'_>) -> Result<Step, CommandError> {
        if let Some(line) = self.pending.pop_front() {
            return Ok(Step::Line(line));
        }
        let Some(peers) = self.peers.as_mut() else {
            self.peers = Some(context.peers.peers().into());
            return Ok(match self.view {
                View::Summary => Step::Line(SUMMARY_HEADER.to_owned()),
                View::Extensive => Step::Idle,
            });
        };
        let Some(key) = peers.pop_front() else {
            return Ok(Step::Exhausted);
        };
        if let Some(filter) = self.filter.as_deref()
            && !self.view.selects(context.peers, &key, filter)
        {
            return Ok(Step::Idle);
        }
        let Some(snapshot) = context.peers.snapshot(&key) else {
            return Ok(Step::Idle);
        };
        match self.view {
            View::Summary => Ok(Step::Line(summary_row(&snapshot))),
            View::Extensive => {
                self.pending.extend(extensive(&snapshot));
                Ok(self.pending.pop_front().map_or(Step::Idle, Step::Line))
            }
        }
    }
}

/// Configured neighbors rendered back to configuration text.
struct ConfigurationOutput {
    filter: Option<String>,
    next: usize,
    pending: VecDeque<String>,
}

impl ConfigurationOutput {
    fn new(filter: Option<String>) -> Self {
        Self {
            filter,
            next: 0,
            pending: VecDeque::new(),
        }
    }
}

impl OutputSequence for ConfigurationOutput {
    fn step(&mut self, context: &StepContext<'_>) -> Result<Step, CommandError> {
        if let Some(line) = self.pending.pop_front() {
            return Ok(Step::Line(line));
        }
        let Some(neighbor) = context.configuration.neighbors().get(self.next) else {
            return Ok(Step::Exhausted);
        };
        self.next += 1;
        if let Some(filter) = self.filter.as_deref()
            && !neighbor.name().contains(filter)
        {
            return Ok(Step::Idle);
        }
        self.pending
            .extend(neighbor.to_string().lines().map(str::to_owned));
        Ok(self.pending.pop_front().map_or(Step::Idle, Step::Line))
    }
}

/// Every peer as one JSON array; filters do not apply.
#[derive(Default)]
struct JsonOutput {
    rendered: bool,
}

impl OutputSequence for JsonOutput {
    fn step(&mut self, context: &StepContext<'_>) -> Result<Step, CommandError> {
        if self.rendered {
            return Ok(Step::Exhausted);
        }
        self.rendered = true;
        let snapshots: Vec<_> = context
            .peers
            .peers()
            .iter()
            .filter_map(|key| context.peers.snapshot(key))
            .collect();
        Ok(Step::Line(render_json(&snapshots)?))
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use bgp_config::{BgpConfiguration, NeighborConfig};
    use rstest::{fixture, rstest};

    use crate::dispatch::ServiceId;
    use crate::peers::{FsmState, PeerTable, SessionEvent};

    use super::*;

    fn neighbor(last: u8) -> NeighborConfig {
        let mut neighbor = NeighborConfig::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, last)), 65000, 65001);
        neighbor.local_address = Some(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 254)));
        neighbor
    }

    #[fixture]
    fn configuration() -> BgpConfiguration {
        BgpConfiguration::from_neighbors(vec![neighbor(1), neighbor(2)])
    }

    fn drain(
        sequence: &mut dyn OutputSequence,
        peers: &PeerTable,
        configuration: &BgpConfiguration,
    ) -> Vec<String> {
        let context = StepContext {
            peers,
            configuration,
        };
        let mut lines = Vec::new();
        loop {
            match sequence.step(&context).expect("step") {
                Step::Line(line) => lines.push(line),
                Step::Idle => {}
                Step::Exhausted => return lines,
            }
        }
    }

    fn schedule(line: &str, configuration: &BgpConfiguration) -> Box<dyn OutputSequence> {
        let mut peers = PeerTable::from_configuration(configuration);
        let mut context = HandlerContext {
            peers: &mut peers,
            configuration,
        };
        let registry = crate::dispatch::CommandRegistry::standard().expect("registry");
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let descriptor = registry.resolve(&tokens).expect("show neighbor");
        let invocation = descriptor.invocation(ServiceId::new(1), line);
        match show_neighbor(&invocation, &mut context).expect("handled") {
            HandlerOutcome::Scheduled(sequence) => sequence,
            HandlerOutcome::Answered(_) => panic!("show neighbor must schedule"),
        }
    }

    #[rstest]
    fn usage_without_mode(configuration: BgpConfiguration) {
        let peers = PeerTable::from_configuration(&configuration);
        let mut sequence = schedule("show neighbor", &configuration);
        assert_eq!(drain(sequence.as_mut(), &peers, &configuration), USAGE);
    }

    #[rstest]
    fn summary_filters_by_exact_address(configuration: BgpConfiguration) {
        let peers = PeerTable::from_configuration(&configuration);
        let mut sequence = schedule("show neighbor 10.0.0.1 summary", &configuration);
        let lines = drain(sequence.as_mut(), &peers, &configuration);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], SUMMARY_HEADER);
        assert!(lines[1].starts_with("10.0.0.1 "));
        assert!(lines[1].contains(" down "));
        assert!(lines[1].contains("idle"));
    }

    #[rstest]
    fn summary_lists_every_peer_without_filter(configuration: BgpConfiguration) {
        let peers = PeerTable::from_configuration(&configuration);
        let mut sequence = schedule("show neighbor summary", &configuration);
        assert_eq!(drain(sequence.as_mut(), &peers, &configuration).len(), 3);
    }

    #[rstest]
    fn extensive_filters_by_name_substring(configuration: BgpConfiguration) {
        let peers = PeerTable::from_configuration(&configuration);
        let mut sequence = schedule("show neighbor 10.0.0.2 extensive", &configuration);
        let lines = drain(sequence.as_mut(), &peers, &configuration);
        assert!(lines.iter().any(|line| line.contains("10.0.0.2")));
        assert!(!lines.iter().any(|line| line.contains("10.0.0.1 ")));
    }

    #[rstest]
    fn configuration_renders_neighbor_blocks(configuration: BgpConfiguration) {
        let peers = PeerTable::from_configuration(&configuration);
        let mut sequence = schedule("show neighbor configuration 10.0.0.1", &configuration);
        let lines = drain(sequence.as_mut(), &peers, &configuration);
        assert_eq!(lines.first().map(String::as_str), Some("neighbor 10.0.0.1 {"));
        assert_eq!(lines.last().map(String::as_str), Some("}"));
        assert!(!lines.iter().any(|line| line.contains("10.0.0.2")));
    }

    #[rstest]
    fn json_ignores_filter(configuration: BgpConfiguration) {
        let mut peers = PeerTable::from_configuration(&configuration);
        let key = peers.peers()[0];
        assert!(peers.update(&key, SessionEvent::Transition(FsmState::Established)));
        let mut sequence = schedule("show neighbor 10.0.0.1 json", &configuration);
        let lines = drain(sequence.as_mut(), &peers, &configuration);
        assert_eq!(lines.len(), 1);
        let value: serde_json::Value = serde_json::from_str(&lines[0]).expect("json");
        assert_eq!(value.as_array().map(Vec::len), Some(2));
    }
}
