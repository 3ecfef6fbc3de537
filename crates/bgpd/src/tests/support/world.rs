//! Scenario world for commands issued by a single control client.

use std::net::IpAddr;

use bgp_config::BgpConfiguration;

use crate::dispatch::{CommandDispatcher, CommandRegistry, HandlerContext, ServiceId};
use crate::peers::{FsmState, Uptime};
use crate::scheduler::{AsyncCommandScheduler, StepContext};

use super::capture::LogCapture;
use super::sessions::FixedSessions;
use super::sink::RecordingSink;
use super::snapshots::established_snapshot;

/// Raw id of the client issuing commands.
pub const CLIENT: u64 = 1;

const MAX_TICKS: usize = 10_000;

/// Sessions, scheduler and recorded output for one client.
pub struct CommandWorld {
    pub sessions: FixedSessions,
    pub sink: RecordingSink,
    pub scheduler: AsyncCommandScheduler,
    pub logs: LogCapture,
    pub result: Option<Result<(), String>>,
    configuration: BgpConfiguration,
    dispatcher: CommandDispatcher,
}

impl CommandWorld {
    #[must_use]
    pub fn new() -> Self {
        let registry = CommandRegistry::standard().expect("standard registry");
        Self {
            sessions: FixedSessions::default(),
            sink: RecordingSink::with_services([CLIENT]),
            scheduler: AsyncCommandScheduler::new(),
            logs: LogCapture::default(),
            result: None,
            configuration: BgpConfiguration::default(),
            dispatcher: CommandDispatcher::new(registry),
        }
    }

    /// Adds an established session with `peer`.
    pub fn add_established(&mut self, peer: IpAddr, seconds: u64) {
        let mut snapshot = established_snapshot(seconds);
        snapshot.peer_address = peer;
        self.sessions.insert(snapshot);
    }

    /// Adds a session with `peer` that is not established.
    pub fn add_idle(&mut self, peer: IpAddr) {
        let mut snapshot = established_snapshot(0);
        snapshot.peer_address = peer;
        snapshot.fsm_state = FsmState::Idle;
        snapshot.uptime = Uptime::Down(0);
        self.sessions.insert(snapshot);
    }

    /// Dispatches `line`, capturing logs.
    pub fn send(&mut self, line: &str) {
        let Self {
            sessions,
            sink,
            scheduler,
            logs,
            configuration,
            dispatcher,
            ..
        } = self;
        let outcome = logs.record(|| {
            let mut context = HandlerContext {
                peers: sessions,
                configuration,
            };
            dispatcher.dispatch(ServiceId::new(CLIENT), line, &mut context, scheduler, sink)
        });
        self.result = Some(outcome.map(|_| ()).map_err(|error| error.to_string()));
    }

    /// Ticks until every scheduled task has finished.
    pub fn run_scheduler(&mut self) {
        let context = StepContext {
            peers: &self.sessions,
            configuration: &self.configuration,
        };
        for _ in 0..MAX_TICKS {
            if self.scheduler.is_empty() {
                return;
            }
            self.scheduler.tick(&context, &mut self.sink);
        }
        panic!("scheduler did not drain within {MAX_TICKS} ticks");
    }

    /// Lines the client received.
    #[must_use]
    pub fn response(&self) -> Vec<String> {
        self.sink.lines(CLIENT)
    }
}
