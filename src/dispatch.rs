//! Request forwarding: coerce inbound values per the capability table, then
//! invoke the resolved backing method positionally.
//!
//! No retries and no timeouts live here; if the backend call fails, the
//! fault propagates to the caller unchanged.

use crate::api::BackingObjectSet;
use crate::capability::{AccessKind, Arg, CapabilityKind, Cardinality, capabilities};
use crate::errors::{Fault, XhResult};
use crate::provider::{CameraProvider, CapabilityProvider, InterfaceProvider, resolve};
use crate::wire::{WireType, WireValue};
use std::sync::Arc;

/// The Xh device as seen from the control bus: typed attribute reads and
/// writes plus commands, all forwarded 1:1 to the backing objects.
#[derive(Debug)]
pub struct XhDevice {
    providers: Vec<Box<dyn CapabilityProvider>>,
}

impl XhDevice {
    /// Build the dispatch surface over an already-constructed backing set.
    pub fn new(backing: &BackingObjectSet) -> Self {
        Self {
            providers: vec![
                Box::new(InterfaceProvider::new(Arc::clone(&backing.interface))),
                Box::new(CameraProvider::new(Arc::clone(&backing.camera))),
            ],
        }
    }

    /// Read an attribute. The backend's return value is passed through
    /// untouched as the attribute's current value.
    pub fn read_attribute(&self, name: &str) -> XhResult<WireValue> {
        let descriptor = capabilities().describe(name)?;
        let CapabilityKind::Attribute { access, .. } = descriptor.kind else {
            return Err(Fault::WrongAccess {
                name: descriptor.name.to_owned(),
                kind: AccessKind::Read,
            });
        };
        if !access.allows(AccessKind::Read) {
            return Err(Fault::WrongAccess {
                name: descriptor.name.to_owned(),
                kind: AccessKind::Read,
            });
        }
        let provider = resolve(&self.providers, descriptor.name, AccessKind::Read)?;
        tracing::debug!(
            attribute = descriptor.name,
            provider = provider.provider_name(),
            "read"
        );
        provider.read(descriptor.name)
    }

    /// Write an attribute, coercing the value to its declared wire type
    /// first (including enum-name-to-code translation).
    pub fn write_attribute(&self, name: &str, value: WireValue) -> XhResult<()> {
        let descriptor = capabilities().describe(name)?;
        let CapabilityKind::Attribute {
            ty,
            access,
            cardinality,
            values,
        } = descriptor.kind
        else {
            return Err(Fault::WrongAccess {
                name: descriptor.name.to_owned(),
                kind: AccessKind::Write,
            });
        };
        if !access.allows(AccessKind::Write) {
            return Err(Fault::WrongAccess {
                name: descriptor.name.to_owned(),
                kind: AccessKind::Write,
            });
        }

        let coerced = match cardinality {
            Cardinality::Scalar => ty.coerce(value)?,
            Cardinality::Spectrum { max_len } => {
                let elements = match value {
                    WireValue::Spectrum(elements) => elements,
                    other => return Err(Fault::TypeMismatch {
                        expected: ty,
                        value: other,
                    }),
                };
                if elements.len() > max_len {
                    return Err(Fault::SpectrumOverflow {
                        name: descriptor.name.to_owned(),
                        max_len,
                        got: elements.len(),
                    });
                }
                WireValue::Spectrum(ty.coerce_elements(elements)?)
            }
        };
        // enum-valued attributes reach the backend as their integer code;
        // an unknown name must fail before any provider is consulted
        let coerced = match values {
            Some(lookup) => WireValue::Int(lookup.code(coerced.as_str()?)?),
            None => coerced,
        };

        let provider = resolve(&self.providers, descriptor.name, AccessKind::Write)?;
        tracing::debug!(
            attribute = descriptor.name,
            provider = provider.provider_name(),
            "write"
        );
        provider.write(descriptor.name, &coerced)
    }

    /// Invoke a command with positional arguments, coercing each argument to
    /// its declared type. The backend's return value is passed through.
    pub fn command(&self, name: &str, args: Vec<WireValue>) -> XhResult<WireValue> {
        let descriptor = capabilities().describe(name)?;
        let CapabilityKind::Command { argin, .. } = descriptor.kind else {
            return Err(Fault::WrongAccess {
                name: descriptor.name.to_owned(),
                kind: AccessKind::Command,
            });
        };

        let coerced = coerce_args(descriptor.name, argin, args)?;

        // authorized enum values come from the capability table itself,
        // not from a backing object
        if descriptor.name == "getAttrStringValueList" {
            let attribute = coerced[0].as_str()?;
            let names = self.attr_string_value_list(attribute)?;
            return Ok(names.into());
        }

        let provider = resolve(&self.providers, descriptor.name, AccessKind::Command)?;
        tracing::debug!(
            command = descriptor.name,
            provider = provider.provider_name(),
            "invoke"
        );
        provider.invoke(descriptor.name, &coerced)
    }

    /// The authorized string values of an enum-coerced attribute, or an
    /// empty list when the attribute is not value-constrained.
    pub fn attr_string_value_list(&self, attribute: &str) -> XhResult<Vec<String>> {
        let descriptor = capabilities().describe(attribute)?;
        Ok(descriptor
            .values()
            .map(|lookup| lookup.names().map(str::to_owned).collect())
            .unwrap_or_default())
    }
}

fn coerce_args(name: &str, argin: &[Arg], args: Vec<WireValue>) -> XhResult<Vec<WireValue>> {
    let required = argin.iter().filter(|arg| arg.required).count();
    if args.len() < required || args.len() > argin.len() {
        return Err(Fault::ArityMismatch {
            name: name.to_owned(),
            expected: required,
            got: args.len(),
        });
    }
    argin
        .iter()
        .zip(args)
        .map(|(arg, value)| match arg.ty {
            WireType::Void => Ok(value),
            ty => ty.coerce(value),
        })
        .collect()
}
