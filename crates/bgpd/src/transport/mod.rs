//! Control socket transport.
//!
//! Everything here is non-blocking and driven from the reactor thread: the
//! listener is polled for new clients and each client's socket is read and
//! flushed once per reactor iteration.

mod errors;
mod listener;
mod service;
mod stream;

pub use self::errors::ListenerError;
pub use self::listener::SocketListener;
pub use self::service::ServiceRegistry;
pub use self::stream::ConnectionStream;

const TRANSPORT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
