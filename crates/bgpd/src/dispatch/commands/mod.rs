//! Built-in command handlers.

mod show_neighbor;
mod teardown;

pub(super) use self::show_neighbor::show_neighbor;
pub(super) use self::teardown::teardown;
