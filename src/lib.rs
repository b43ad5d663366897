//! Control-bus adapter for the Xh X-ray detector.
//!
//! The adapter sits between a control-bus transport and the acquisition
//! library's two backing objects, a camera and the acquisition interface
//! wrapping it. It publishes a static capability table describing every
//! attribute and command of the device, coerces wire values to the declared
//! types, resolves each request to the backing object that serves it and
//! forwards the call.
//!
//! Transports hand requests to [`XhAdapter`]; everything below it is
//! transport-agnostic.

pub mod api;
mod attr_name;
pub mod capability;
mod dispatch;
mod errors;
mod lifecycle;
mod provider;
pub mod wire;

#[cfg(test)]
mod test_utils;

pub use attr_name::AttrName;
pub use capability::{
    Access, AccessKind, Arg, CLOCK_MODES, CapabilityDescriptor, CapabilityKind, CapabilityTable,
    Cardinality, capabilities,
};
pub use dispatch::XhDevice;
pub use errors::{Fault, XhResult};
pub use lifecycle::{
    BackendFactory, ConnectionConfig, DEFAULT_TIMING_SCRIPTS, DeviceState, XhAdapter,
};
pub use provider::{CameraProvider, CapabilityProvider, InterfaceProvider};
pub use wire::{EnumLookup, WireType, WireValue};
