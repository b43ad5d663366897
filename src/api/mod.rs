//! Contracts of the externally supplied backing objects.
//!
//! The detector behaviour itself lives in the wrapped acquisition library;
//! this layer only declares the surface it forwards to. Implementations are
//! expected to serialize their own hardware access internally.

mod camera;
pub use camera::{Camera, ClockMode, HeadVoltage};

mod interface;
pub use interface::AcquisitionInterface;

use std::sync::Arc;

/// The two backing objects every request is routed to, in resolution order:
/// the acquisition interface first, the camera second.
///
/// Constructed exactly once per process by the lifecycle shim and never
/// mutated afterwards.
#[derive(Debug, Clone)]
pub struct BackingObjectSet {
    /// Acquisition-level interface wrapping the camera.
    pub interface: Arc<dyn AcquisitionInterface>,
    /// The low-level camera object.
    pub camera: Arc<dyn Camera>,
}
