//! Single-threaded event loop.
//!
//! One iteration accepts new control clients, reads what they sent, cancels
//! the work of clients that failed, dispatches at most one command per idle
//! client, advances every scheduled task by one step and flushes output.
//! A client's next command waits until its previous one has finished, so
//! responses never interleave within one client.

use std::thread;
use std::time::Duration;

use bgp_config::BgpConfiguration;
use tracing::{debug, info, warn};

use crate::dispatch::{CommandDispatcher, HandlerContext, ServiceId};
use crate::peers::SessionSnapshotProvider;
use crate::process::ShutdownSignal;
use crate::scheduler::{AsyncCommandScheduler, StepContext};
use crate::transport::{ServiceRegistry, SocketListener};

const REACTOR_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::reactor");

/// Event loop owning the control channel and the command scheduler.
pub struct Reactor<P> {
    listener: SocketListener,
    services: ServiceRegistry,
    dispatcher: CommandDispatcher,
    scheduler: AsyncCommandScheduler,
    peers: P,
    configuration: BgpConfiguration,
    idle: Duration,
}

impl<P> Reactor<P>
where
    P: SessionSnapshotProvider,
{
    /// Assembles a reactor; `idle` is slept after an iteration with no work.
    #[must_use]
    pub fn new(
        listener: SocketListener,
        dispatcher: CommandDispatcher,
        peers: P,
        configuration: BgpConfiguration,
        idle: Duration,
    ) -> Self {
        Self {
            listener,
            services: ServiceRegistry::new(),
            dispatcher,
            scheduler: AsyncCommandScheduler::new(),
            peers,
            configuration,
            idle,
        }
    }

    /// Control socket listener.
    #[must_use]
    pub fn listener(&self) -> &SocketListener {
        &self.listener
    }

    /// Session state.
    #[must_use]
    pub fn peers(&self) -> &P {
        &self.peers
    }

    /// Mutable session state, for the session state machine.
    pub fn peers_mut(&mut self) -> &mut P {
        &mut self.peers
    }

    /// Scheduled command output.
    #[must_use]
    pub fn scheduler(&self) -> &AsyncCommandScheduler {
        &self.scheduler
    }

    /// Runs iterations until `shutdown` is requested.
    pub fn run(&mut self, shutdown: &dyn ShutdownSignal) {
        info!(
            target: REACTOR_TARGET,
            endpoint = %self.listener.endpoint(),
            "reactor running"
        );
        while !shutdown.requested() {
            if !self.turn() {
                thread::sleep(self.idle);
            }
        }
        info!(
            target: REACTOR_TARGET,
            services = self.services.len(),
            tasks = self.scheduler.len(),
            "reactor stopping"
        );
    }

    /// Performs one iteration. Returns whether any work was done.
    pub fn turn(&mut self) -> bool {
        let mut busy = self.accept_clients();

        let gone = self.services.read_available();
        busy |= !gone.is_empty();
        self.drop_services(&gone);

        busy |= self.dispatch_lines();

        if !self.scheduler.is_empty() {
            let context = StepContext {
                peers: &self.peers,
                configuration: &self.configuration,
            };
            self.scheduler.tick(&context, &mut self.services);
            busy = true;
        }

        let failed = self.services.flush();
        self.drop_services(&failed);

        let finished: Vec<ServiceId> = self
            .services
            .finished()
            .into_iter()
            .filter(|service| !self.scheduler.is_busy(*service))
            .collect();
        busy |= !finished.is_empty();
        self.drop_services(&finished);
        busy
    }

    fn accept_clients(&mut self) -> bool {
        let mut accepted = false;
        loop {
            match self.listener.accept() {
                Ok(Some(stream)) => match self.services.register(stream) {
                    Ok(_) => accepted = true,
                    Err(error) => {
                        warn!(target: REACTOR_TARGET, %error, "failed to adopt client");
                    }
                },
                Ok(None) => return accepted,
                Err(error) => {
                    warn!(target: REACTOR_TARGET, %error, "socket accept error");
                    return accepted;
                }
            }
        }
    }

    fn dispatch_lines(&mut self) -> bool {
        let mut dispatched = false;
        for service in self.services.with_pending_lines() {
            if self.scheduler.is_busy(service) {
                continue;
            }
            let Some(line) = self.services.next_line(service) else {
                continue;
            };
            dispatched = true;
            let mut context = HandlerContext {
                peers: &mut self.peers,
                configuration: &self.configuration,
            };
            match self.dispatcher.dispatch(
                service,
                &line,
                &mut context,
                &mut self.scheduler,
                &mut self.services,
            ) {
                Ok(outcome) => {
                    debug!(target: REACTOR_TARGET, %service, ?outcome, "command accepted");
                }
                Err(error) => {
                    warn!(target: REACTOR_TARGET, %service, %error, "command failed");
                }
            }
        }
        dispatched
    }

    fn drop_services(&mut self, services: &[ServiceId]) {
        for service in services {
            for transition in self.scheduler.cancel_for_service(*service) {
                debug!(
                    target: REACTOR_TARGET,
                    task = %transition.task,
                    %service,
                    "task of departed client cancelled"
                );
            }
            self.services.remove(*service);
        }
    }
}
