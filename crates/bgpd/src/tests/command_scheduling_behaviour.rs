//! Behavioural tests for cooperative scheduling across clients.

use std::cell::RefCell;

use bgp_config::BgpConfiguration;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::dispatch::ServiceId;
use crate::peers::PeerTable;
use crate::scheduler::{AsyncCommandScheduler, StaticLines, StepContext, TaskState};

use super::support::sink::RecordingSink;
use super::support::strip_quotes;

const MAX_TICKS: usize = 1_000;

struct SchedulingWorld {
    scheduler: AsyncCommandScheduler,
    sink: RecordingSink,
    peers: PeerTable,
    configuration: BgpConfiguration,
    cancelled: usize,
}

impl SchedulingWorld {
    fn new() -> Self {
        Self {
            scheduler: AsyncCommandScheduler::new(),
            sink: RecordingSink::default(),
            peers: PeerTable::new(),
            configuration: BgpConfiguration::default(),
            cancelled: 0,
        }
    }

    fn tick(&mut self) {
        let context = StepContext {
            peers: &self.peers,
            configuration: &self.configuration,
        };
        let transitions = self.scheduler.tick(&context, &mut self.sink);
        self.cancelled += transitions
            .iter()
            .filter(|transition| transition.state == TaskState::Cancelled)
            .count();
    }
}

fn split(list: &str) -> Vec<String> {
    strip_quotes(list).split(',').map(str::to_owned).collect()
}

#[fixture]
fn world() -> RefCell<SchedulingWorld> {
    RefCell::new(SchedulingWorld::new())
}

#[given("clients {first} and {second} are connected")]
fn given_clients(world: &RefCell<SchedulingWorld>, first: u64, second: u64) {
    world.borrow_mut().sink = RecordingSink::with_services([first, second]);
}

#[when("client {client} schedules the lines \"{lines}\"")]
fn when_client_schedules(world: &RefCell<SchedulingWorld>, client: u64, lines: String) {
    let sequence = StaticLines::new(split(&lines));
    world
        .borrow_mut()
        .scheduler
        .schedule(ServiceId::new(client), "echo", Box::new(sequence));
}

#[when("the scheduler ticks once")]
fn when_scheduler_ticks(world: &RefCell<SchedulingWorld>) {
    world.borrow_mut().tick();
}

#[when("the scheduler runs until idle")]
fn when_scheduler_drains(world: &RefCell<SchedulingWorld>) {
    let mut world = world.borrow_mut();
    for _ in 0..MAX_TICKS {
        if world.scheduler.is_empty() {
            return;
        }
        world.tick();
    }
    panic!("scheduler did not drain within {MAX_TICKS} ticks");
}

#[when("client {client} disconnects")]
fn when_client_disconnects(world: &RefCell<SchedulingWorld>, client: u64) {
    world.borrow_mut().sink.disconnect(client);
}

#[then("client {client} received \"{lines}\"")]
fn then_client_received(world: &RefCell<SchedulingWorld>, client: u64, lines: String) {
    assert_eq!(world.borrow().sink.lines(client), split(&lines));
}

#[then("the clients' output was interleaved")]
fn then_output_interleaved(world: &RefCell<SchedulingWorld>) {
    let owners: Vec<u64> = world
        .borrow()
        .sink
        .interleaved()
        .into_iter()
        .map(|(owner, _)| owner)
        .collect();
    let switches = owners.windows(2).filter(|pair| pair[0] != pair[1]).count();
    assert!(switches > 1, "output was not interleaved: {owners:?}");
}

#[then("{count} task was cancelled")]
fn then_tasks_cancelled(world: &RefCell<SchedulingWorld>, count: usize) {
    assert_eq!(world.borrow().cancelled, count);
}

#[scenario(
    path = "tests/features/command_scheduling.feature",
    name = "Two clients receive their own output in order"
)]
fn clients_receive_own_output(#[from(world)] world: RefCell<SchedulingWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/command_scheduling.feature",
    name = "A disconnected client's task is dropped silently"
)]
fn disconnected_task_dropped(#[from(world)] world: RefCell<SchedulingWorld>) {
    drop(world);
}
