//! In-memory [`ServiceSink`] recording every line written.

use std::collections::BTreeSet;

use crate::dispatch::{ServiceId, ServiceSink};

/// Records lines in write order across all services.
#[derive(Debug, Default)]
pub struct RecordingSink {
    connected: BTreeSet<ServiceId>,
    written: Vec<(ServiceId, String)>,
}

impl RecordingSink {
    /// Sink with the given services connected.
    pub fn with_services(ids: impl IntoIterator<Item = u64>) -> Self {
        Self {
            connected: ids.into_iter().map(ServiceId::new).collect(),
            written: Vec::new(),
        }
    }

    /// Marks a service as gone.
    pub fn disconnect(&mut self, id: u64) {
        self.connected.remove(&ServiceId::new(id));
    }

    /// Lines written to one service, in order.
    pub fn lines(&self, id: u64) -> Vec<String> {
        let service = ServiceId::new(id);
        self.written
            .iter()
            .filter(|(owner, _)| *owner == service)
            .map(|(_, line)| line.clone())
            .collect()
    }

    /// Every line with its raw service id, in write order.
    pub fn interleaved(&self) -> Vec<(u64, String)> {
        self.written
            .iter()
            .map(|(owner, line)| (owner.get(), line.clone()))
            .collect()
    }
}

impl ServiceSink for RecordingSink {
    fn is_connected(&self, service: ServiceId) -> bool {
        self.connected.contains(&service)
    }

    fn write_line(&mut self, service: ServiceId, line: &str) {
        if self.is_connected(service) {
            self.written.push((service, line.to_owned()));
        }
    }
}
