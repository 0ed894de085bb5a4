//! Application core: pure domain logic, no direct I/O.
//!
//! This module contains the business rules for the mousetrap: latch
//! orchestration, mode selection, capture confirmation, notifications and
//! start-up sequencing.  All interaction with hardware and the network
//! happens through **port traits** defined in [`ports`], keeping this layer
//! fully testable without real peripherals.

pub mod events;
pub mod notices;
pub mod ports;
pub mod retry;
pub mod runner;
pub mod sampler;
pub mod service;
