//! Test suites for the daemon crate.

mod command_scheduling_behaviour;
pub(crate) mod support;
