//! Device lifecycle: guarded one-time construction of the backing objects
//! from connection parameters.
//!
//! Exactly one configuration attempt may construct the backing set;
//! concurrent first-time callers block until it is ready. Construction is
//! all-or-nothing: on failure the shim returns to `Uninitialized` and a
//! later attempt may try again.

use crate::api::BackingObjectSet;
use crate::dispatch::XhDevice;
use crate::errors::{Fault, XhResult};
use crate::wire::WireValue;
use serde::Deserialize;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// The timing scripts loaded when the device class declares none.
pub const DEFAULT_TIMING_SCRIPTS: &[&str] = &[
    "config_timing_1turn",
    "config_timing_2turn",
    "config_timing_3turn",
    "config_timing_4turn",
    "config_timing_3turn_no_overlap",
    "config_timing_4turn_no_overlap",
    "config_timing_2turn_4bunch",
    "config_timing_2turn_16bunch",
    "config_timing_2turn_4bunch_no",
    "config_timing_2turn_16bunch_no",
    "config_timing_3turn_4bunch",
    "config_timing_3turn_16bunch",
    "config_timing_4turn_4bunch",
    "config_timing_4turn_16bunch",
    "config_timing_5turn_4bunch",
    "config_timing_5turn_16bunch",
];

/// Connection parameters supplied by the device-class properties.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// da.server host address.
    pub address: String,
    /// da.server port.
    pub port: u16,
    /// Name of the configuration loaded on startup.
    pub config_name: String,
    /// Timing scripts available for selection.
    pub timing_scripts: Vec<String>,
    /// Optional clock scale factor applied by the backend.
    pub clock_factor: f64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            address: "0".to_owned(),
            port: 1972,
            config_name: "config".to_owned(),
            timing_scripts: DEFAULT_TIMING_SCRIPTS
                .iter()
                .map(|&script| script.to_owned())
                .collect(),
            clock_factor: 1.0,
        }
    }
}

/// Constructs the backing objects from connection parameters.
///
/// In production this wraps the acquisition library's constructors; tests
/// supply stubs.
pub trait BackendFactory: Send + Sync {
    /// Build both backing objects. All-or-nothing: a partial set must never
    /// be returned.
    fn build(&self, config: &ConnectionConfig) -> eyre::Result<BackingObjectSet>;
}

/// Coarse device state as reported on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum DeviceState {
    /// Not configured yet.
    #[display("OFF")]
    Off,
    /// Configuration in progress.
    #[display("INIT")]
    Init,
    /// Backing objects constructed, requests are served.
    #[display("ON")]
    On,
    /// Never set by this layer; backend errors propagate as faults instead.
    #[display("FAULT")]
    Fault,
}

#[derive(Debug, Default)]
enum Phase {
    #[default]
    Uninitialized,
    Configuring,
    Ready(Arc<BackingObjectSet>),
}

/// The process-wide adapter: owns the factory, the lifecycle state and the
/// dispatch surface once configured.
#[derive(derive_more::Debug)]
pub struct XhAdapter {
    #[debug(skip)]
    factory: Box<dyn BackendFactory>,
    phase: Mutex<Phase>,
    ready: Condvar,
}

impl XhAdapter {
    /// Create an unconfigured adapter around a backend factory.
    pub fn new(factory: impl BackendFactory + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            phase: Mutex::new(Phase::default()),
            ready: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Phase> {
        self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Construct the backing objects on first call; later calls (and
    /// concurrent callers waiting on the first) receive the same handle.
    #[tracing::instrument(
        level = "debug",
        skip(self, config),
        fields(address = %config.address, port = config.port)
    )]
    pub fn configure(&self, config: &ConnectionConfig) -> XhResult<Arc<BackingObjectSet>> {
        let mut phase = self.lock();
        loop {
            match &*phase {
                Phase::Ready(backing) => return Ok(Arc::clone(backing)),
                Phase::Configuring => {
                    phase = self
                        .ready
                        .wait(phase)
                        .unwrap_or_else(PoisonError::into_inner);
                }
                Phase::Uninitialized => break,
            }
        }
        *phase = Phase::Configuring;
        drop(phase);

        tracing::info!(config_name = %config.config_name, "constructing backing objects");
        let built = self.factory.build(config);

        let mut phase = self.lock();
        match built {
            Ok(backing) => {
                let backing = Arc::new(backing);
                *phase = Phase::Ready(Arc::clone(&backing));
                self.ready.notify_all();
                tracing::info!("device ready");
                Ok(backing)
            }
            Err(err) => {
                // no partial state is retained; a later call may retry
                *phase = Phase::Uninitialized;
                self.ready.notify_all();
                tracing::warn!(error = %err, "backend construction failed");
                Err(Fault::backend(err))
            }
        }
    }

    /// The backing set, if configuration has completed.
    pub fn backing(&self) -> XhResult<Arc<BackingObjectSet>> {
        match &*self.lock() {
            Phase::Ready(backing) => Ok(Arc::clone(backing)),
            _ => Err(Fault::NotReady),
        }
    }

    /// The dispatch surface, once the adapter is ready.
    pub fn device(&self) -> XhResult<XhDevice> {
        Ok(XhDevice::new(&*self.backing()?))
    }

    /// Bus-visible device state.
    pub fn state(&self) -> DeviceState {
        match &*self.lock() {
            Phase::Uninitialized => DeviceState::Off,
            Phase::Configuring => DeviceState::Init,
            Phase::Ready(_) => DeviceState::On,
        }
    }

    /// Convenience forwarding for transports: attribute read.
    pub fn read_attribute(&self, name: &str) -> XhResult<WireValue> {
        self.device()?.read_attribute(name)
    }

    /// Convenience forwarding for transports: attribute write.
    pub fn write_attribute(&self, name: &str, value: WireValue) -> XhResult<()> {
        self.device()?.write_attribute(name, value)
    }

    /// Convenience forwarding for transports: command invocation.
    pub fn command(&self, name: &str, args: Vec<WireValue>) -> XhResult<WireValue> {
        self.device()?.command(name, args)
    }
}
