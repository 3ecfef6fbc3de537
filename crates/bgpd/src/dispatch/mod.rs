//! Control-channel command dispatch.
//!
//! Clients send one command per line and receive zero or more response lines
//! followed by a terminal marker:
//!
//! ```text
//! > show neighbor 10.0.0.1 summary
//! < Peer            AS        up/down state       |     #sent     #recvd
//! < 10.0.0.1        65001     1:01:01 established          12         34
//! < done
//! ```
//!
//! Verbs are resolved against a [`CommandRegistry`] built once at startup.
//! Synchronous commands answer on the spot; asynchronous ones hand an output
//! sequence to the [`crate::scheduler::AsyncCommandScheduler`], which writes
//! the marker when the sequence ends.

mod commands;
mod dispatcher;
mod errors;
mod registry;
mod response;
mod selector;

pub use self::dispatcher::{CommandDispatcher, Dispatched};
pub use self::errors::{CommandError, DispatchError};
pub use self::registry::{
    CommandDescriptor, CommandKind, CommandRegistry, Handler, HandlerContext, HandlerOutcome,
    Invocation, SHOW_NEIGHBOR_MODIFIERS,
};
pub use self::response::{Answer, ServiceId, ServiceSink};
pub use self::selector::{NeighborSelector, SelectorError, parse_selectors};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
