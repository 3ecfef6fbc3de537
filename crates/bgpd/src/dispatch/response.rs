//! Output side of the control channel.
//!
//! Commands never touch sockets directly. They write whole lines to a
//! [`ServiceSink`], which frames them for the owning client, and finish with
//! exactly one [`Answer`] marker.

use std::fmt;

/// Identifier of a connected control-channel client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceId(u64);

impl ServiceId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "service-{}", self.0)
    }
}

/// Terminal marker closing the response to one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// The command completed.
    Done,
    /// The command failed.
    Error,
}

impl Answer {
    /// Marker line sent to the client.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::Error => "error",
        }
    }
}

/// Line-oriented writer addressed by service.
pub trait ServiceSink {
    /// Whether the service is still connected.
    fn is_connected(&self, service: ServiceId) -> bool;

    /// Queues one line for the service. Lines for disconnected services are
    /// discarded.
    fn write_line(&mut self, service: ServiceId, line: &str);

    /// Queues the answer marker for the service.
    fn answer(&mut self, service: ServiceId, answer: Answer) {
        self.write_line(service, answer.as_str());
    }
}
