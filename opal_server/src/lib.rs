//! # OPAL Edge Server Library
//!
//! Address-space construction and process lifecycle for the OPAL edge
//! server. The binary in `main.rs` wires these together with the CLI
//! and logging setup.
//!
//! # Module Structure
//!
//! - [`address_space`] - Node registration facade and request dispatch
//! - [`builder`] - Hardware probing and address-space population
//! - [`certificate`] - Server certificate loading
//! - [`lifecycle`] - Startup, blocking request loop and guaranteed teardown

#![deny(warnings)]
#![deny(missing_docs)]

pub mod address_space;
pub mod builder;
pub mod certificate;
pub mod lifecycle;

// Re-export key types for convenience
pub use crate::address_space::AddressSpace;
pub use crate::builder::AcquiredHardware;
pub use crate::lifecycle::{LifecycleState, ServerLifecycle};
