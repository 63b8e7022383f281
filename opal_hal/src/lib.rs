//! # OPAL HAL Library
//!
//! Hardware resources and the data-source bindings that expose them as
//! server-visible variables.
//!
//! Each binding pairs a read/write contract with one hardware resource:
//! the system clock, the CPU temperature sensor or the status LED. The
//! address space dispatches into bindings synchronously on each client
//! request, possibly from overlapping connections, so every binding is
//! `Send + Sync` and the one piece of shared mutable state (the LED
//! status) lives behind a reader/writer lock.
//!
//! # Module Structure
//!
//! - [`clock`] - System clock resource
//! - [`thermal`] - CPU temperature sensor resource
//! - [`led`] - Status LED actuator and its lock discipline
//! - [`source`] - `DataSource` trait and the per-resource bindings
//! - [`error`] - Resource error types

#![deny(warnings)]
#![deny(missing_docs)]

pub mod clock;
pub mod error;
pub mod led;
pub mod source;
pub mod thermal;

// Re-export key types for convenience
pub use crate::clock::SystemClock;
pub use crate::error::ResourceError;
pub use crate::led::LedActuator;
pub use crate::source::{ClockSource, DataSource, LedSource, TemperatureSource};
pub use crate::thermal::ThermalSensor;
