//! Capability providers: the uniform lookup surface over the two backing
//! objects, consulted in fixed priority order (interface first, camera
//! second).
//!
//! Presence is checked explicitly through [`CapabilityProvider::provides`]
//! before anything is executed, so a failing backend call is never mistaken
//! for an absent method and retried against the other object.

use crate::api::{AcquisitionInterface, Camera, ClockMode, HeadVoltage};
use crate::capability::AccessKind;
use crate::errors::{Fault, XhResult};
use crate::wire::{WireType, WireValue};
use std::fmt::Debug;
use std::sync::Arc;

/// One candidate backing object for attribute and command resolution.
///
/// `name` arguments are the canonical capability-table names, so
/// implementations match on them exactly.
pub trait CapabilityProvider: Debug + Send + Sync {
    /// Short label used in logs.
    fn provider_name(&self) -> &'static str;

    /// Whether this provider implements the named capability for the given
    /// access kind. Must not touch the backend.
    fn provides(&self, name: &str, kind: AccessKind) -> bool;

    /// Read an attribute value.
    fn read(&self, name: &str) -> XhResult<WireValue>;

    /// Write an attribute value. The value has already been coerced to the
    /// declared wire type (including enum-to-code translation).
    fn write(&self, name: &str, value: &WireValue) -> XhResult<()>;

    /// Invoke a command with coerced positional arguments.
    fn invoke(&self, name: &str, args: &[WireValue]) -> XhResult<WireValue>;
}

/// Find the first provider implementing `name` for `kind`.
///
/// The two-tier fallback is a routing choice, not error recovery: a subset
/// of attributes is served by the acquisition interface while the remainder
/// fall through to the camera, without the caller knowing which.
pub(crate) fn resolve<'set>(
    providers: &'set [Box<dyn CapabilityProvider>],
    name: &str,
    kind: AccessKind,
) -> XhResult<&'set dyn CapabilityProvider> {
    providers
        .iter()
        .map(Box::as_ref)
        .find(|provider| provider.provides(name, kind))
        .ok_or_else(|| Fault::NotSupported {
            name: name.to_owned(),
        })
}

fn required<'args>(args: &'args [WireValue], idx: usize, name: &str) -> XhResult<&'args WireValue> {
    args.get(idx).ok_or_else(|| Fault::ArityMismatch {
        name: name.to_owned(),
        expected: idx + 1,
        got: args.len(),
    })
}

fn optional_int(args: &[WireValue], idx: usize, default: i64) -> XhResult<i64> {
    args.get(idx).map_or(Ok(default), WireValue::as_int)
}

fn optional_bool(args: &[WireValue], idx: usize, default: bool) -> XhResult<bool> {
    args.get(idx).map_or(Ok(default), WireValue::as_bool)
}

/// Serves acquisition-scoped attributes from the interface object.
#[derive(Debug)]
pub struct InterfaceProvider {
    interface: Arc<dyn AcquisitionInterface>,
}

impl InterfaceProvider {
    /// Wrap the acquisition interface object.
    pub fn new(interface: Arc<dyn AcquisitionInterface>) -> Self {
        Self { interface }
    }
}

impl CapabilityProvider for InterfaceProvider {
    fn provider_name(&self) -> &'static str {
        "interface"
    }

    fn provides(&self, name: &str, kind: AccessKind) -> bool {
        match kind {
            AccessKind::Read | AccessKind::Write => name == "nb_groups",
            AccessKind::Command => false,
        }
    }

    fn read(&self, name: &str) -> XhResult<WireValue> {
        match name {
            "nb_groups" => Ok(self.interface.nb_groups().map_err(Fault::backend)?.into()),
            _ => Err(Fault::NotSupported {
                name: name.to_owned(),
            }),
        }
    }

    fn write(&self, name: &str, value: &WireValue) -> XhResult<()> {
        match name {
            "nb_groups" => self
                .interface
                .set_nb_groups(value.as_int()?)
                .map_err(Fault::backend),
            _ => Err(Fault::NotSupported {
                name: name.to_owned(),
            }),
        }
    }

    fn invoke(&self, name: &str, _args: &[WireValue]) -> XhResult<WireValue> {
        Err(Fault::NotSupported {
            name: name.to_owned(),
        })
    }
}

/// Serves every Xh-specific attribute and command from the camera object.
#[derive(Debug)]
pub struct CameraProvider {
    camera: Arc<dyn Camera>,
}

impl CameraProvider {
    /// Wrap the camera object.
    pub fn new(camera: Arc<dyn Camera>) -> Self {
        Self { camera }
    }

    fn head_voltage(code: i64) -> XhResult<HeadVoltage> {
        HeadVoltage::try_from(code).map_err(|_| Fault::UnknownEnumValue {
            table: "head_voltage",
            value: code.to_string(),
        })
    }

    fn clock_mode(code: i64) -> XhResult<ClockMode> {
        ClockMode::try_from(code).map_err(|_| Fault::UnknownEnumValue {
            table: "clockmode",
            value: code.to_string(),
        })
    }
}

impl CapabilityProvider for CameraProvider {
    fn provider_name(&self) -> &'static str {
        "camera"
    }

    fn provides(&self, name: &str, kind: AccessKind) -> bool {
        match kind {
            AccessKind::Read => matches!(
                name,
                "nbscans"
                    | "maxframes"
                    | "trig_mux"
                    | "orbit_trigger"
                    | "lemo_out"
                    | "correct_rounding"
                    | "group_delay"
                    | "frame_delay"
                    | "scan_period"
                    | "aux_delay"
                    | "aux_width"
                    | "bias"
                    | "temperature"
            ),
            AccessKind::Write => matches!(
                name,
                "clockmode"
                    | "nbscans"
                    | "trig_mux"
                    | "orbit_trigger"
                    | "lemo_out"
                    | "correct_rounding"
                    | "group_delay"
                    | "frame_delay"
                    | "scan_period"
                    | "aux_delay"
                    | "aux_width"
                    | "custom_trigger_mode"
            ),
            AccessKind::Command => matches!(
                name,
                "reset"
                    | "setHeadCaps"
                    | "sendCommand"
                    | "sendCommandNumber"
                    | "sendCommandString"
                    | "setHighVoltageOn"
                    | "setHighVoltageOff"
                    | "setHeadDac"
                    | "getAvailableCaps"
                    | "getAvailableTriggerModes"
                    | "setXhTimingScript"
                    | "getXhTimingScript"
                    | "getTemperature"
                    | "setTimingOrbit"
                    | "coolDown"
                    | "powerDown"
            ),
        }
    }

    fn read(&self, name: &str) -> XhResult<WireValue> {
        let cam = &self.camera;
        match name {
            "nbscans" => Ok(cam.nb_scans().map_err(Fault::backend)?.into()),
            // da.server reports the frame limit as text; widen it here
            "maxframes" => {
                let raw = cam.max_frames().map_err(Fault::backend)?;
                WireType::Long.coerce(WireValue::Str(raw))
            }
            "trig_mux" => Ok(cam.trig_mux().map_err(Fault::backend)?.into()),
            "orbit_trigger" => Ok(cam.orbit_trigger().map_err(Fault::backend)?.into()),
            "lemo_out" => Ok(cam.lemo_out().map_err(Fault::backend)?.into()),
            "correct_rounding" => Ok(cam.correct_rounding().map_err(Fault::backend)?.into()),
            "group_delay" => Ok(cam.group_delay().map_err(Fault::backend)?.into()),
            "frame_delay" => Ok(cam.frame_delay().map_err(Fault::backend)?.into()),
            "scan_period" => Ok(cam.scan_period().map_err(Fault::backend)?.into()),
            "aux_delay" => Ok(cam.aux_delay().map_err(Fault::backend)?.into()),
            "aux_width" => Ok(cam.aux_width().map_err(Fault::backend)?.into()),
            "bias" => Ok(cam.bias().map_err(Fault::backend)?.into()),
            "temperature" => Ok(cam.temperature(0).map_err(Fault::backend)?.into()),
            _ => Err(Fault::NotSupported {
                name: name.to_owned(),
            }),
        }
    }

    fn write(&self, name: &str, value: &WireValue) -> XhResult<()> {
        let cam = &self.camera;
        let result = match name {
            "clockmode" => cam.setup_clock(Self::clock_mode(value.as_int()?)?),
            "nbscans" => cam.set_nb_scans(value.as_int()?),
            "trig_mux" => cam.set_trig_mux(value.as_int()?),
            "orbit_trigger" => cam.set_orbit_trigger(value.as_int()?),
            "lemo_out" => cam.set_lemo_out(&value.to_int_vec()?),
            "correct_rounding" => cam.set_correct_rounding(value.as_bool()?),
            "group_delay" => cam.set_group_delay(value.as_int()?),
            "frame_delay" => cam.set_frame_delay(value.as_int()?),
            "scan_period" => cam.set_scan_period(value.as_int()?),
            "aux_delay" => cam.set_aux_delay(value.as_int()?),
            "aux_width" => cam.set_aux_width(value.as_int()?),
            "custom_trigger_mode" => cam.set_custom_trigger_mode(value.as_str()?),
            _ => {
                return Err(Fault::NotSupported {
                    name: name.to_owned(),
                });
            }
        };
        result.map_err(Fault::backend)
    }

    fn invoke(&self, name: &str, args: &[WireValue]) -> XhResult<WireValue> {
        let cam = &self.camera;
        match name {
            "reset" => {
                cam.reset().map_err(Fault::backend)?;
                Ok(WireValue::Void)
            }
            "setHeadCaps" => {
                let caps_ab = required(args, 0, name)?.as_int()?;
                let caps_cd = required(args, 1, name)?.as_int()?;
                cam.set_head_caps(caps_ab, caps_cd)
                    .map_err(Fault::backend)?;
                Ok(WireValue::Void)
            }
            "sendCommand" => {
                cam.send_command(required(args, 0, name)?.as_str()?)
                    .map_err(Fault::backend)?;
                Ok(WireValue::Void)
            }
            "sendCommandNumber" => Ok(cam
                .send_command_number(required(args, 0, name)?.as_str()?)
                .map_err(Fault::backend)?
                .into()),
            "sendCommandString" => Ok(cam
                .send_command_string(required(args, 0, name)?.as_str()?)
                .map_err(Fault::backend)?
                .into()),
            "setHighVoltageOn" => {
                cam.enable_hv(true).map_err(Fault::backend)?;
                Ok(WireValue::Void)
            }
            "setHighVoltageOff" => {
                cam.enable_hv(false).map_err(Fault::backend)?;
                Ok(WireValue::Void)
            }
            "setHeadDac" => {
                let value = required(args, 0, name)?.as_float()?;
                let voltage = Self::head_voltage(required(args, 1, name)?.as_int()?)?;
                let head = optional_int(args, 2, -1)?;
                let direct = optional_bool(args, 3, false)?;
                cam.set_head_dac(value, voltage, head, direct)
                    .map_err(Fault::backend)?;
                Ok(WireValue::Void)
            }
            "getAvailableCaps" => Ok(cam.list_available_caps().map_err(Fault::backend)?.into()),
            "getAvailableTriggerModes" => Ok(cam
                .available_trigger_modes()
                .map_err(Fault::backend)?
                .into()),
            "setXhTimingScript" => {
                cam.set_timing_script(required(args, 0, name)?.as_str()?)
                    .map_err(Fault::backend)?;
                Ok(WireValue::Void)
            }
            "getXhTimingScript" => Ok(cam.timing_script().map_err(Fault::backend)?.into()),
            "getTemperature" => {
                let channel = optional_int(args, 0, 0)?;
                Ok(cam.temperature(channel).map_err(Fault::backend)?.into())
            }
            "setTimingOrbit" => {
                let delay = required(args, 0, name)?.as_int()?;
                let falling_edge = optional_bool(args, 1, false)?;
                cam.set_timing_orbit(delay, falling_edge)
                    .map_err(Fault::backend)?;
                Ok(WireValue::Void)
            }
            "coolDown" => {
                cam.cool_down().map_err(Fault::backend)?;
                Ok(WireValue::Void)
            }
            "powerDown" => {
                cam.power_down().map_err(Fault::backend)?;
                Ok(WireValue::Void)
            }
            _ => Err(Fault::NotSupported {
                name: name.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct FixedStub {
        label: &'static str,
        serves: &'static str,
    }

    impl CapabilityProvider for FixedStub {
        fn provider_name(&self) -> &'static str {
            self.label
        }

        fn provides(&self, name: &str, _kind: AccessKind) -> bool {
            name == self.serves
        }

        fn read(&self, _name: &str) -> XhResult<WireValue> {
            Ok(self.label.into())
        }

        fn write(&self, _name: &str, _value: &WireValue) -> XhResult<()> {
            Ok(())
        }

        fn invoke(&self, _name: &str, _args: &[WireValue]) -> XhResult<WireValue> {
            Ok(WireValue::Void)
        }
    }

    fn pair(first: &'static str, second: &'static str) -> Vec<Box<dyn CapabilityProvider>> {
        vec![
            Box::new(FixedStub {
                label: "first",
                serves: first,
            }),
            Box::new(FixedStub {
                label: "second",
                serves: second,
            }),
        ]
    }

    #[test]
    fn resolution_prefers_the_first_provider() {
        let providers = pair("shared", "shared");
        let provider = resolve(&providers, "shared", AccessKind::Read).unwrap();
        assert_eq!(provider.provider_name(), "first");
    }

    #[test]
    fn resolution_falls_through_to_the_second_provider() {
        let providers = pair("only_first", "only_second");
        let provider = resolve(&providers, "only_second", AccessKind::Read).unwrap();
        assert_eq!(provider.provider_name(), "second");
    }

    #[test]
    fn unimplemented_names_are_not_supported() {
        let providers = pair("a", "b");
        assert!(matches!(
            resolve(&providers, "c", AccessKind::Read),
            Err(Fault::NotSupported { .. })
        ));
    }
}
