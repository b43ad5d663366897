//! The static capability registry: every attribute and command exposed on
//! the bus, keyed by name, with its wire type, access and cardinality.
//!
//! The table is built once at startup and only ever consulted through
//! [`CapabilityTable::describe`]; request-shape validation (arity, types)
//! belongs to the bus transport, which consumes these descriptors.

use crate::attr_name::AttrName;
use crate::errors::{Fault, XhResult};
use crate::wire::{EnumLookup, WireType};
use indexmap::IndexMap;
use std::sync::LazyLock;

/// The kind of access a request performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum AccessKind {
    /// Attribute read.
    #[display("reads")]
    Read,
    /// Attribute write.
    #[display("writes")]
    Write,
    /// Command invocation.
    #[display("commands")]
    Command,
}

/// Declared direction of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Readable only.
    Read,
    /// Writable only.
    Write,
    /// Both.
    ReadWrite,
}

impl Access {
    /// Whether this access declaration permits the given request kind.
    pub const fn allows(self, kind: AccessKind) -> bool {
        match kind {
            AccessKind::Read => matches!(self, Self::Read | Self::ReadWrite),
            AccessKind::Write => matches!(self, Self::Write | Self::ReadWrite),
            AccessKind::Command => false,
        }
    }
}

/// Scalar or fixed-maximum-length array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Single value.
    Scalar,
    /// One-dimensional array, up to `max_len` elements.
    Spectrum {
        /// Declared maximum length.
        max_len: usize,
    },
}

/// A positional command argument.
#[derive(Debug, Clone, Copy)]
pub struct Arg {
    /// Declared wire type; inbound values are coerced to it.
    pub ty: WireType,
    /// Optional arguments may be omitted from the tail of the argument list;
    /// the backing object supplies its own default.
    pub required: bool,
}

impl Arg {
    const fn new(ty: WireType) -> Self {
        Self { ty, required: true }
    }

    const fn optional(ty: WireType) -> Self {
        Self {
            ty,
            required: false,
        }
    }
}

/// What a capability is, and how its values are shaped.
#[derive(Debug, Clone, Copy)]
pub enum CapabilityKind {
    /// A readable and/or writable attribute.
    Attribute {
        /// Element wire type.
        ty: WireType,
        /// Declared direction.
        access: Access,
        /// Scalar or spectrum.
        cardinality: Cardinality,
        /// Lookup table for enum-coerced writes, if any.
        values: Option<&'static EnumLookup>,
    },
    /// A command with positional arguments.
    Command {
        /// Declared argument list.
        argin: &'static [Arg],
        /// Result wire type (`Void` for none).
        argout: WireType,
        /// Result cardinality.
        argout_cardinality: Cardinality,
    },
}

/// Immutable description of one exposed capability.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityDescriptor {
    /// Unique name on the bus.
    pub name: &'static str,
    /// Attribute or command shape.
    pub kind: CapabilityKind,
}

impl CapabilityDescriptor {
    const fn attr(name: &'static str, ty: WireType, access: Access) -> Self {
        Self {
            name,
            kind: CapabilityKind::Attribute {
                ty,
                access,
                cardinality: Cardinality::Scalar,
                values: None,
            },
        }
    }

    const fn spectrum_attr(
        name: &'static str,
        ty: WireType,
        access: Access,
        max_len: usize,
    ) -> Self {
        Self {
            name,
            kind: CapabilityKind::Attribute {
                ty,
                access,
                cardinality: Cardinality::Spectrum { max_len },
                values: None,
            },
        }
    }

    const fn enum_attr(name: &'static str, access: Access, values: &'static EnumLookup) -> Self {
        Self {
            name,
            kind: CapabilityKind::Attribute {
                ty: WireType::String,
                access,
                cardinality: Cardinality::Scalar,
                values: Some(values),
            },
        }
    }

    const fn command(name: &'static str, argin: &'static [Arg], argout: WireType) -> Self {
        Self {
            name,
            kind: CapabilityKind::Command {
                argin,
                argout,
                argout_cardinality: Cardinality::Scalar,
            },
        }
    }

    const fn listing_command(
        name: &'static str,
        argin: &'static [Arg],
        argout: WireType,
        max_len: usize,
    ) -> Self {
        Self {
            name,
            kind: CapabilityKind::Command {
                argin,
                argout,
                argout_cardinality: Cardinality::Spectrum { max_len },
            },
        }
    }

    /// The enum lookup table attached to this attribute, if any.
    pub const fn values(&self) -> Option<&'static EnumLookup> {
        match self.kind {
            CapabilityKind::Attribute { values, .. } => values,
            CapabilityKind::Command { .. } => None,
        }
    }

    /// Whether this capability is an attribute (as opposed to a command).
    pub const fn is_attribute(&self) -> bool {
        matches!(self.kind, CapabilityKind::Attribute { .. })
    }
}

/// Clock-mode names accepted on the `clockmode` attribute, mapped to the
/// codes the camera's `setupClock` expects.
pub static CLOCK_MODES: EnumLookup = EnumLookup::new(
    "clockmode",
    &[
        ("XhInternalClock", 0),
        ("XhESRF5468Mhz", 1),
        ("XhESRF1136Mhz", 2),
    ],
);

const STRING_ARG: &[Arg] = &[Arg::new(WireType::String)];
const NO_ARGS: &[Arg] = &[];

/// Everything the Xh device exposes on the bus.
static XH_CAPABILITIES: &[CapabilityDescriptor] = &[
    // commands
    CapabilityDescriptor::listing_command(
        "getAttrStringValueList",
        STRING_ARG,
        WireType::String,
        64,
    ),
    CapabilityDescriptor::command("reset", NO_ARGS, WireType::Void),
    CapabilityDescriptor::command(
        "setHeadCaps",
        &[Arg::new(WireType::Long), Arg::new(WireType::Long)],
        WireType::Void,
    ),
    CapabilityDescriptor::command("sendCommand", STRING_ARG, WireType::Void),
    CapabilityDescriptor::command("sendCommandNumber", STRING_ARG, WireType::Float),
    CapabilityDescriptor::command("sendCommandString", STRING_ARG, WireType::String),
    CapabilityDescriptor::command("setHighVoltageOn", NO_ARGS, WireType::Void),
    CapabilityDescriptor::command("setHighVoltageOff", NO_ARGS, WireType::Void),
    CapabilityDescriptor::command(
        "setHeadDac",
        &[
            Arg::new(WireType::Float),
            Arg::new(WireType::Long),
            Arg::optional(WireType::Long),
            Arg::optional(WireType::Bool),
        ],
        WireType::Void,
    ),
    CapabilityDescriptor::listing_command("getAvailableCaps", NO_ARGS, WireType::Short, 64),
    CapabilityDescriptor::listing_command(
        "getAvailableTriggerModes",
        NO_ARGS,
        WireType::String,
        32,
    ),
    CapabilityDescriptor::command("setXhTimingScript", STRING_ARG, WireType::Void),
    CapabilityDescriptor::command("getXhTimingScript", NO_ARGS, WireType::String),
    CapabilityDescriptor::command(
        "getTemperature",
        &[Arg::optional(WireType::Long)],
        WireType::Float,
    ),
    CapabilityDescriptor::command(
        "setTimingOrbit",
        &[Arg::new(WireType::Long), Arg::optional(WireType::Bool)],
        WireType::Void,
    ),
    CapabilityDescriptor::command("coolDown", NO_ARGS, WireType::Void),
    CapabilityDescriptor::command("powerDown", NO_ARGS, WireType::Void),
    // attributes
    CapabilityDescriptor::enum_attr("clockmode", Access::Write, &CLOCK_MODES),
    CapabilityDescriptor::attr("nbscans", WireType::Long, Access::ReadWrite),
    CapabilityDescriptor::attr("nb_groups", WireType::Long, Access::ReadWrite),
    CapabilityDescriptor::attr("maxframes", WireType::Long, Access::Read),
    CapabilityDescriptor::attr("trig_mux", WireType::Long, Access::ReadWrite),
    CapabilityDescriptor::attr("orbit_trigger", WireType::Long, Access::ReadWrite),
    CapabilityDescriptor::spectrum_attr("lemo_out", WireType::Long, Access::ReadWrite, 1024),
    CapabilityDescriptor::attr("correct_rounding", WireType::Bool, Access::ReadWrite),
    CapabilityDescriptor::attr("group_delay", WireType::Long, Access::ReadWrite),
    CapabilityDescriptor::attr("frame_delay", WireType::Long, Access::ReadWrite),
    CapabilityDescriptor::attr("scan_period", WireType::Long, Access::ReadWrite),
    CapabilityDescriptor::attr("aux_delay", WireType::Long, Access::ReadWrite),
    CapabilityDescriptor::attr("aux_width", WireType::Long, Access::ReadWrite),
    CapabilityDescriptor::attr("custom_trigger_mode", WireType::String, Access::Write),
    CapabilityDescriptor::attr("bias", WireType::Float, Access::Read),
    CapabilityDescriptor::attr("temperature", WireType::Float, Access::Read),
];

/// Name-keyed view over the capability descriptors.
#[derive(Debug)]
pub struct CapabilityTable {
    by_name: IndexMap<&'static AttrName, &'static CapabilityDescriptor>,
}

impl CapabilityTable {
    fn build(descriptors: &'static [CapabilityDescriptor]) -> Self {
        let mut by_name = IndexMap::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let previous = by_name.insert(AttrName::new(descriptor.name), descriptor);
            assert!(
                previous.is_none(),
                "duplicate capability {:?}",
                descriptor.name
            );
        }
        Self { by_name }
    }

    /// Look a capability up by its (case-insensitive) bus name.
    pub fn describe(&self, name: &str) -> XhResult<&'static CapabilityDescriptor> {
        self.by_name
            .get(AttrName::new(name))
            .copied()
            .ok_or_else(|| Fault::NotFound {
                name: name.to_owned(),
            })
    }

    /// All descriptors, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &'static CapabilityDescriptor> + '_ {
        self.by_name.values().copied()
    }
}

/// The process-wide Xh capability table, built on first use.
pub fn capabilities() -> &'static CapabilityTable {
    static TABLE: LazyLock<CapabilityTable> =
        LazyLock::new(|| CapabilityTable::build(XH_CAPABILITIES));
    &TABLE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_names_are_not_found() {
        assert!(matches!(
            capabilities().describe("no_such_attribute"),
            Err(Fault::NotFound { .. })
        ));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let descriptor = capabilities().describe("ClockMode").unwrap();
        assert_eq!(descriptor.name, "clockmode");
    }

    #[test]
    fn every_declared_capability_resolves() {
        for descriptor in capabilities().iter() {
            assert_eq!(
                capabilities().describe(descriptor.name).unwrap().name,
                descriptor.name
            );
        }
    }

    #[test]
    fn lemo_out_is_a_bounded_spectrum() {
        let descriptor = capabilities().describe("lemo_out").unwrap();
        match descriptor.kind {
            CapabilityKind::Attribute {
                ty,
                access,
                cardinality,
                ..
            } => {
                assert_eq!(ty, WireType::Long);
                assert_eq!(access, Access::ReadWrite);
                assert_eq!(cardinality, Cardinality::Spectrum { max_len: 1024 });
            }
            CapabilityKind::Command { .. } => panic!("lemo_out must be an attribute"),
        }
    }

    #[test]
    fn clockmode_carries_its_lookup_table() {
        let descriptor = capabilities().describe("clockmode").unwrap();
        let values = descriptor.values().unwrap();
        assert_eq!(values.code("XhESRF5468Mhz").unwrap(), 1);
    }
}
