//! Server startup, blocking request loop and guaranteed teardown.
//!
//! The lifecycle walks `Idle → Running → Stopping → Terminated`. An
//! interrupt flips a shared flag; the loop observes it at its own poll
//! granularity, so in-flight requests complete and nothing is cancelled
//! mid-dispatch. Teardown releases every acquired resource exactly once,
//! in reverse-acquisition order, with each release individually guarded
//! by whether that acquisition actually happened.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use opal_common::config::ServerConfig;
use opal_common::status::StatusCode;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::address_space::{AddressSpace, AddressSpaceError};
use crate::builder::{self, AcquiredHardware};
use crate::certificate::load_certificate;

/// How often the loop re-checks the running flag.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Loop iterations between heartbeat logs.
const HEARTBEAT_EVERY: u64 = 200;

/// Lifecycle states, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Created, nothing acquired.
    Idle,
    /// Resources acquired, address space populated, loop runnable.
    Running,
    /// Stop observed, loop returned, teardown pending.
    Stopping,
    /// Every acquired resource released.
    Terminated,
}

/// Error raised by lifecycle transitions.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A transition was requested out of order.
    #[error("invalid lifecycle transition: {0}")]
    InvalidState(&'static str),

    /// Node registration failed while populating the address space.
    #[error("address space population failed: {0}")]
    AddressSpace(#[from] AddressSpaceError),

    /// The interrupt handler could not be installed.
    #[error("failed to install interrupt handler: {0}")]
    Signal(String),
}

/// Owns the server's startup, loop and teardown.
pub struct ServerLifecycle {
    config: ServerConfig,
    state: LifecycleState,
    running: Arc<AtomicBool>,
    space: Option<AddressSpace>,
    hardware: Option<AcquiredHardware>,
    certificate: Vec<u8>,
    iterations: u64,
}

impl ServerLifecycle {
    /// Create an idle lifecycle for the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            state: LifecycleState::Idle,
            running: Arc::new(AtomicBool::new(false)),
            space: None,
            hardware: None,
            certificate: Vec::new(),
            iterations: 0,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// The shared keep-running flag, for signal handlers.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Request the loop to stop at its next poll.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Install the interrupt handler that flips the running flag.
    ///
    /// Installable once per process; tests drive the flag directly
    /// instead.
    ///
    /// # Errors
    /// Returns `LifecycleError::Signal` when the handler cannot be
    /// registered.
    pub fn install_interrupt_handler(&self) -> Result<(), LifecycleError> {
        let running = self.running_flag();
        ctrlc::set_handler(move || {
            info!("received shutdown signal");
            running.store(false, Ordering::SeqCst);
        })
        .map_err(|e| LifecycleError::Signal(e.to_string()))
    }

    /// `Idle → Running`: load the certificate, acquire hardware and
    /// populate the address space.
    ///
    /// # Errors
    /// Returns an error when called out of order or when node
    /// registration fails. Hardware acquisition failures are not errors;
    /// they degrade the address space.
    pub fn start(&mut self) -> Result<(), LifecycleError> {
        if self.state != LifecycleState::Idle {
            return Err(LifecycleError::InvalidState("start requires Idle"));
        }

        self.certificate = load_certificate(&self.config.server.certificate);

        let mut space = AddressSpace::new();
        let hardware = builder::populate(&mut space, &self.config)?;
        self.space = Some(space);
        self.hardware = Some(hardware);

        self.running.store(true, Ordering::SeqCst);
        self.state = LifecycleState::Running;
        info!(
            service = %self.config.shared.service_name,
            port = self.config.server.port,
            "server started"
        );
        Ok(())
    }

    /// Run the blocking request loop until the flag is cleared.
    ///
    /// The transport layer drives request dispatch; this loop owns the
    /// cadence at which the stop flag is observed. Returns the status
    /// the process exits with.
    pub fn run(&mut self) -> StatusCode {
        if self.state != LifecycleState::Running {
            warn!("run called outside Running state");
            return StatusCode::BadInternalError;
        }

        info!("request loop entered");
        while self.running.load(Ordering::SeqCst) {
            std::thread::sleep(POLL_INTERVAL);
            self.iterations += 1;
            if self.iterations % HEARTBEAT_EVERY == 0 {
                debug!(iterations = self.iterations, "request loop heartbeat");
            }
        }

        self.state = LifecycleState::Stopping;
        info!(iterations = self.iterations, "request loop stopped");
        StatusCode::Good
    }

    /// `Stopping → Terminated`: release every acquired resource.
    ///
    /// Runs in reverse-acquisition order and is safe to call regardless
    /// of how far startup got; each release is guarded by whether that
    /// resource was actually acquired.
    pub fn shutdown(&mut self) {
        // LED first: the trigger must be restored to its default mode
        // before the handles close.
        if let Some(hardware) = self.hardware.take() {
            if let Some(led) = &hardware.led {
                led.release();
            }
        }

        // Dropping the address space closes the remaining resource
        // handles (the sensor, then the LED files once the last Arc
        // goes).
        if self.space.take().is_some() {
            debug!("address space released");
        }

        self.state = LifecycleState::Terminated;
        info!("shutdown complete");
    }

    /// The populated address space, while running.
    pub fn address_space(&self) -> Option<&AddressSpace> {
        self.space.as_ref()
    }

    /// The acquired hardware inventory, while running.
    pub fn hardware(&self) -> Option<&AcquiredHardware> {
        self.hardware.as_ref()
    }

    /// The loaded certificate bytes; empty when none was found.
    pub fn certificate(&self) -> &[u8] {
        &self.certificate
    }
}
