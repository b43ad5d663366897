//! Typed values as represented by the control-bus transport.
//!
//! The transport's own encoding governs the byte layout; this module only
//! defines the in-process representation and the coercion rules applied
//! before a value is forwarded to a backing object.

use crate::errors::{Fault, XhResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar wire types understood by the bus transport.
///
/// Integers are carried canonically as `i64`; the declared wire type drives
/// range checking during coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireType {
    /// No value (command without argument or result).
    Void,
    /// Boolean scalar.
    Bool,
    /// 16-bit signed integer.
    Short,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// Double-precision float.
    Float,
    /// Text scalar.
    String,
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A dynamically typed value crossing the bus boundary.
///
/// Spectrum (fixed-maximum-length array) attributes are carried as a
/// homogeneous `Spectrum` of scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireValue {
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar; range checks happen against the declared [`WireType`].
    Int(i64),
    /// Float scalar.
    Float(f64),
    /// Text scalar.
    Str(String),
    /// One-dimensional array of scalars.
    Spectrum(Vec<WireValue>),
    /// No value.
    Void,
}

impl WireValue {
    /// Extract a boolean, failing with `TypeMismatch` otherwise.
    pub fn as_bool(&self) -> XhResult<bool> {
        match *self {
            Self::Bool(b) => Ok(b),
            ref other => Err(mismatch(WireType::Bool, other)),
        }
    }

    /// Extract an integer, failing with `TypeMismatch` otherwise.
    pub fn as_int(&self) -> XhResult<i64> {
        match *self {
            Self::Int(value) => Ok(value),
            ref other => Err(mismatch(WireType::Long, other)),
        }
    }

    /// Extract a float. Integers widen losslessly enough for this layer.
    #[expect(clippy::as_conversions, clippy::cast_precision_loss)]
    pub fn as_float(&self) -> XhResult<f64> {
        match *self {
            Self::Float(value) => Ok(value),
            Self::Int(value) => Ok(value as f64),
            ref other => Err(mismatch(WireType::Float, other)),
        }
    }

    /// Extract a string slice, failing with `TypeMismatch` otherwise.
    pub fn as_str(&self) -> XhResult<&str> {
        match self {
            Self::Str(value) => Ok(value),
            other => Err(mismatch(WireType::String, other)),
        }
    }

    /// Extract the elements of a spectrum value.
    pub fn spectrum(&self) -> XhResult<&[WireValue]> {
        match self {
            Self::Spectrum(values) => Ok(values),
            other => Err(mismatch(WireType::Long, other)),
        }
    }

    /// Collect an integer spectrum into a plain vector, preserving order.
    pub fn to_int_vec(&self) -> XhResult<Vec<i64>> {
        self.spectrum()?.iter().map(Self::as_int).collect()
    }
}

fn mismatch(expected: WireType, value: &WireValue) -> Fault {
    Fault::TypeMismatch {
        expected,
        value: value.clone(),
    }
}

impl From<bool> for WireValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i16> for WireValue {
    fn from(value: i16) -> Self {
        Self::Int(value.into())
    }
}

impl From<i32> for WireValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<i64> for WireValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for WireValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for WireValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for WireValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl<T: Into<WireValue>> From<Vec<T>> for WireValue {
    fn from(values: Vec<T>) -> Self {
        Self::Spectrum(values.into_iter().map(Into::into).collect())
    }
}

impl WireType {
    /// Apply this type's coercion rule to a single scalar.
    ///
    /// Rules, in the order the bus transport relies on them:
    /// strings parse into the declared numeric type, floats truncate toward
    /// zero when an integer is declared, integers widen to float, and
    /// integers are range-checked against the declared width.
    pub fn coerce(self, value: WireValue) -> XhResult<WireValue> {
        match self {
            Self::Void => match value {
                WireValue::Void => Ok(WireValue::Void),
                other => Err(mismatch(self, &other)),
            },
            Self::Bool => match value {
                WireValue::Bool(_) => Ok(value),
                // the original device class accepted 0/1 flags in
                // numeric command arrays
                WireValue::Int(0) => Ok(WireValue::Bool(false)),
                WireValue::Int(1) => Ok(WireValue::Bool(true)),
                WireValue::Str(s) => parse_as(self, &s).map(WireValue::Bool),
                other => Err(mismatch(self, &other)),
            },
            Self::Short | Self::Int | Self::Long => {
                let wide = match value {
                    WireValue::Int(v) => v,
                    WireValue::Float(v) => truncate(v),
                    WireValue::Str(s) => parse_as(self, &s)?,
                    other => return Err(mismatch(self, &other)),
                };
                self.check_range(wide)?;
                Ok(WireValue::Int(wide))
            }
            Self::Float => match value {
                WireValue::Float(_) => Ok(value),
                WireValue::Int(_) => value.as_float().map(WireValue::Float),
                WireValue::Str(s) => parse_as(self, &s).map(WireValue::Float),
                other => Err(mismatch(self, &other)),
            },
            Self::String => match value {
                WireValue::Str(_) => Ok(value),
                other => Err(mismatch(self, &other)),
            },
        }
    }

    /// Coerce every element of a spectrum to this element type, in order.
    pub fn coerce_elements(self, values: Vec<WireValue>) -> XhResult<Vec<WireValue>> {
        values.into_iter().map(|value| self.coerce(value)).collect()
    }

    fn check_range(self, value: i64) -> XhResult {
        let ok = match self {
            Self::Short => i16::try_from(value).is_ok(),
            Self::Int => i32::try_from(value).is_ok(),
            _ => true,
        };
        if ok {
            Ok(())
        } else {
            Err(Fault::OutOfRange {
                expected: self,
                value,
            })
        }
    }
}

#[expect(clippy::as_conversions, clippy::cast_possible_truncation)]
fn truncate(value: f64) -> i64 {
    value.trunc() as i64
}

fn parse_as<T: serde::de::DeserializeOwned>(expected: WireType, s: &str) -> XhResult<T> {
    serde_plain::from_str(s).map_err(|err| Fault::BadParameter { expected, err })
}

/// An immutable mapping from human-readable names to integer codes,
/// consulted only while coercing writes of enum-valued attributes.
#[derive(Debug, Clone, Copy)]
pub struct EnumLookup {
    name: &'static str,
    entries: &'static [(&'static str, i64)],
}

impl EnumLookup {
    /// Build a lookup table. Entries never change after construction.
    pub const fn new(name: &'static str, entries: &'static [(&'static str, i64)]) -> Self {
        Self { name, entries }
    }

    /// Which attribute this table belongs to.
    pub const fn table_name(&self) -> &'static str {
        self.name
    }

    /// Translate a name into its integer code.
    ///
    /// Lookup is exact: enum values are identifiers, not free-form text.
    pub fn code(&self, value: &str) -> XhResult<i64> {
        self.entries
            .iter()
            .find(|(key, _)| *key == value)
            .map(|&(_, code)| code)
            .ok_or_else(|| Fault::UnknownEnumValue {
                table: self.name,
                value: value.to_owned(),
            })
    }

    /// The authorized names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.entries.iter().map(|&(key, _)| key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paste::paste;

    macro_rules! test_coerce_num {
        ($ty:ident, $case:ident, $input:expr, $expected:expr) => {
            paste! {
                #[test]
                fn [<coerce_ $ty:lower _ $case>]() {
                    let coerced = WireType::$ty.coerce($input.into()).unwrap();
                    assert_eq!(coerced, $expected.into());
                }
            }
        };
    }

    test_coerce_num!(Long, from_string, "42", 42_i64);
    test_coerce_num!(Long, from_float, 7.9_f64, 7_i64);
    test_coerce_num!(Int, from_negative_string, "-12", -12_i64);
    test_coerce_num!(Short, in_range, 1024_i64, 1024_i64);
    test_coerce_num!(Float, from_int, 3_i64, 3.0_f64);
    test_coerce_num!(Float, from_string, "21.5", 21.5_f64);

    #[test]
    fn truncation_is_toward_zero() {
        assert_eq!(
            WireType::Long.coerce(WireValue::Float(-7.9)).unwrap(),
            WireValue::Int(-7)
        );
    }

    #[test]
    fn short_range_is_checked() {
        assert!(matches!(
            WireType::Short.coerce(WireValue::Int(70_000)),
            Err(Fault::OutOfRange {
                expected: WireType::Short,
                value: 70_000,
            })
        ));
    }

    #[test]
    fn unparsable_string_is_a_bad_parameter() {
        assert!(matches!(
            WireType::Long.coerce(WireValue::Str("not-a-number".to_owned())),
            Err(Fault::BadParameter {
                expected: WireType::Long,
                ..
            })
        ));
    }

    #[test]
    fn string_type_rejects_numbers() {
        assert!(matches!(
            WireType::String.coerce(WireValue::Int(5)),
            Err(Fault::TypeMismatch { .. })
        ));
    }

    #[test]
    fn spectrum_elements_coerce_in_order() {
        let coerced = WireType::Long
            .coerce_elements(vec!["3".into(), "1".into(), "2".into()])
            .unwrap();
        assert_eq!(
            coerced,
            vec![WireValue::Int(3), WireValue::Int(1), WireValue::Int(2)]
        );
    }

    #[test]
    fn wire_values_round_trip_through_json() {
        let value = WireValue::Spectrum(vec![
            WireValue::Int(1),
            WireValue::Float(2.5),
            WireValue::Str("three".to_owned()),
        ]);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"[1,2.5,"three"]"#);
        assert_eq!(serde_json::from_str::<WireValue>(&json).unwrap(), value);
    }

    #[test]
    fn enum_lookup_resolves_codes() {
        static MODES: EnumLookup = EnumLookup::new("mode", &[("slow", 0), ("fast", 1)]);
        assert_eq!(MODES.code("fast").unwrap(), 1);
        assert!(matches!(
            MODES.code("FAST"),
            Err(Fault::UnknownEnumValue { table: "mode", .. })
        ));
        assert_eq!(MODES.names().collect::<Vec<_>>(), ["slow", "fast"]);
    }
}
