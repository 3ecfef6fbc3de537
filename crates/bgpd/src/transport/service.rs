//! Per-client buffers for the control channel.

use std::collections::{BTreeMap, VecDeque};
use std::io::{self, Read, Write};

use tracing::{debug, warn};

use crate::dispatch::{ServiceId, ServiceSink};

use super::{ConnectionStream, TRANSPORT_TARGET};

/// Longest command line accepted from a client.
pub(crate) const MAX_LINE_BYTES: usize = 64 * 1024;

const READ_CHUNK: usize = 4096;

/// Chunks read from one client per reactor iteration.
const READ_BUDGET: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Inbound {
    /// More input may follow.
    Open,
    /// The client shut down its write side.
    Finished,
    /// A line grew past [`MAX_LINE_BYTES`].
    Overlong,
}

struct Service {
    stream: ConnectionStream,
    inbound: Vec<u8>,
    lines: VecDeque<String>,
    outbound: Vec<u8>,
    input_finished: bool,
    closed: bool,
}

impl Service {
    fn new(stream: ConnectionStream) -> Self {
        Self {
            stream,
            inbound: Vec::new(),
            lines: VecDeque::new(),
            outbound: Vec::new(),
            input_finished: false,
            closed: false,
        }
    }

    /// Reads at most [`READ_BUDGET`] chunks, queueing complete lines as
    /// they arrive.
    fn fill(&mut self) -> io::Result<Inbound> {
        let mut chunk = [0_u8; READ_CHUNK];
        let mut reads = 0;
        while reads < READ_BUDGET {
            match self.stream.read(&mut chunk) {
                Ok(0) => return Ok(Inbound::Finished),
                Ok(read) => {
                    reads += 1;
                    self.inbound.extend_from_slice(&chunk[..read]);
                    if !self.split_lines() {
                        return Ok(Inbound::Overlong);
                    }
                }
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => break,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                Err(error) => return Err(error),
            }
        }
        Ok(Inbound::Open)
    }

    /// Moves complete lines from the inbound buffer to the line queue.
    /// Returns `false` when the unterminated remainder exceeds the limit.
    fn split_lines(&mut self) -> bool {
        while let Some(end) = self.inbound.iter().position(|byte| *byte == b'\n') {
            let raw: Vec<u8> = self.inbound.drain(..=end).collect();
            let line = String::from_utf8_lossy(&raw[..end]);
            let line = line.trim_end_matches('\r').trim();
            if !line.is_empty() {
                self.lines.push_back(line.to_owned());
            }
        }
        self.inbound.len() <= MAX_LINE_BYTES
    }

    fn drain_outbound(&mut self) -> io::Result<()> {
        while !self.outbound.is_empty() {
            match self.stream.write(&self.outbound) {
                Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                Ok(written) => {
                    self.outbound.drain(..written);
                }
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                Err(error) => return Err(error),
            }
        }
        Ok(())
    }
}

/// Connected control-channel clients.
///
/// Inbound bytes are split into command lines; outbound lines are buffered
/// until the socket accepts them. A client that shuts down its write side
/// stays writable: lines it already sent are still dispatched and answered.
#[derive(Default)]
pub struct ServiceRegistry {
    services: BTreeMap<ServiceId, Service>,
    next_id: u64,
}

impl ServiceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopts an accepted connection.
    ///
    /// # Errors
    ///
    /// Returns the OS error when the stream cannot be made non-blocking.
    pub fn register(&mut self, stream: ConnectionStream) -> io::Result<ServiceId> {
        stream.set_nonblocking(true)?;
        self.next_id += 1;
        let id = ServiceId::new(self.next_id);
        self.services.insert(id, Service::new(stream));
        debug!(target: TRANSPORT_TARGET, service = %id, "service connected");
        Ok(id)
    }

    /// Reads what every client has sent, within a per-client budget.
    ///
    /// Returns the services that failed during this call: read errors and
    /// overlong lines. They stay registered, reported as not connected,
    /// until [`Self::remove`]. End of input is not a failure; see
    /// [`Self::finished`].
    pub fn read_available(&mut self) -> Vec<ServiceId> {
        let mut failed = Vec::new();
        for (id, service) in &mut self.services {
            if service.closed || service.input_finished {
                continue;
            }
            match service.fill() {
                Ok(Inbound::Open) => {}
                Ok(Inbound::Finished) => {
                    debug!(target: TRANSPORT_TARGET, service = %id, "input finished");
                    service.input_finished = true;
                }
                Ok(Inbound::Overlong) => {
                    warn!(
                        target: TRANSPORT_TARGET,
                        service = %id,
                        limit = MAX_LINE_BYTES,
                        "command line too long"
                    );
                    service.closed = true;
                    failed.push(*id);
                }
                Err(error) => {
                    warn!(target: TRANSPORT_TARGET, service = %id, %error, "read failed");
                    service.closed = true;
                    failed.push(*id);
                }
            }
        }
        failed
    }

    /// Services whose input has ended and whose queued lines and output are
    /// all gone.
    #[must_use]
    pub fn finished(&self) -> Vec<ServiceId> {
        self.services
            .iter()
            .filter(|(_, service)| {
                service.input_finished && service.lines.is_empty() && service.outbound.is_empty()
            })
            .map(|(id, _)| *id)
            .collect()
    }

    /// Takes the next complete command line of `service`.
    pub fn next_line(&mut self, service: ServiceId) -> Option<String> {
        self.services
            .get_mut(&service)
            .filter(|entry| !entry.closed)
            .and_then(|entry| entry.lines.pop_front())
    }

    /// Connected services with at least one queued command line.
    #[must_use]
    pub fn with_pending_lines(&self) -> Vec<ServiceId> {
        self.services
            .iter()
            .filter(|(_, service)| !service.closed && !service.lines.is_empty())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Writes buffered output without blocking.
    ///
    /// Returns the services whose socket failed.
    pub fn flush(&mut self) -> Vec<ServiceId> {
        let mut failed = Vec::new();
        for (id, service) in &mut self.services {
            if service.closed {
                continue;
            }
            if let Err(error) = service.drain_outbound() {
                debug!(target: TRANSPORT_TARGET, service = %id, %error, "write failed");
                service.closed = true;
                failed.push(*id);
            }
        }
        failed
    }

    /// Forgets a service and closes its socket.
    pub fn remove(&mut self, service: ServiceId) {
        if self.services.remove(&service).is_some() {
            debug!(target: TRANSPORT_TARGET, %service, "service removed");
        }
    }

    /// Number of registered services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether no service is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl ServiceSink for ServiceRegistry {
    fn is_connected(&self, service: ServiceId) -> bool {
        self.services
            .get(&service)
            .is_some_and(|entry| !entry.closed)
    }

    fn write_line(&mut self, service: ServiceId, line: &str) {
        let Some(entry) = self.services.get_mut(&service) else {
            return;
        };
        if entry.closed {
            return;
        }
        entry.outbound.extend_from_slice(line.as_bytes());
        entry.outbound.push(b'\n');
    }
}
