//! Simulation layer for the VNA driver stack
//!
//! Provides a simulated NanoVNA that speaks the firmware shell protocol
//! from the device side, for exercising the driver without hardware. The
//! simulator implements the driver's `Interface` trait, so everything
//! from version negotiation to binary screen capture runs against it
//! unchanged. See [`SimVna`].

pub mod device;

pub use device::{Fault, SimConfig, SimVna};
