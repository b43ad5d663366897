use crate::capability::AccessKind;
use crate::wire::{WireType, WireValue};
use thiserror::Error;

/// A fault surfaced to the control bus.
///
/// This layer performs no local recovery: every fault propagates to the
/// caller unchanged, and backend errors keep their original message.
#[derive(Debug, Error)]
pub enum Fault {
    /// The name is absent from the capability table.
    #[error("unknown attribute or command {name:?}")]
    NotFound {
        /// Requested capability name.
        name: String,
    },

    /// The name is declared in the capability table, but neither the
    /// interface nor the camera object implements it.
    #[error("{name:?} is not implemented by the interface or the camera")]
    NotSupported {
        /// Requested capability name.
        name: String,
    },

    /// Read of a write-only attribute, or write of a read-only one.
    #[error("attribute {name:?} does not allow {kind}")]
    WrongAccess {
        /// Attribute name.
        name: String,
        /// The rejected access kind.
        kind: AccessKind,
    },

    /// A string argument is not a key of the relevant enum lookup table.
    #[error("unknown {table} value {value:?}")]
    UnknownEnumValue {
        /// Name of the lookup table.
        table: &'static str,
        /// The offending string.
        value: String,
    },

    /// The value cannot be coerced into the declared wire type.
    #[error("cannot coerce {value:?} into {expected}")]
    TypeMismatch {
        /// Declared wire type.
        expected: WireType,
        /// The offending value.
        value: WireValue,
    },

    /// A string argument failed to parse as the declared numeric type.
    #[error("couldn't parse parameter as {expected}: {err:#}")]
    BadParameter {
        /// Declared wire type.
        expected: WireType,
        /// Parse error.
        #[source]
        err: serde_plain::Error,
    },

    /// An integer is outside the range of the declared wire type.
    #[error("{value} is out of range for {expected}")]
    OutOfRange {
        /// Declared wire type.
        expected: WireType,
        /// The offending integer.
        value: i64,
    },

    /// Wrong number of command arguments.
    #[error("{name} expects {expected} argument(s), got {got}")]
    ArityMismatch {
        /// Command name.
        name: String,
        /// Declared argument count.
        expected: usize,
        /// Received argument count.
        got: usize,
    },

    /// A spectrum value is longer than its declared maximum length.
    #[error("{name} accepts at most {max_len} elements, got {got}")]
    SpectrumOverflow {
        /// Attribute name.
        name: String,
        /// Declared maximum length.
        max_len: usize,
        /// Received length.
        got: usize,
    },

    /// A request arrived before configuration completed.
    #[error("device is not configured yet")]
    NotReady,

    /// The backend call failed; the original message is preserved.
    #[error("backend call failed: {message}")]
    BackendFailure {
        /// Formatted backend error chain.
        message: String,
    },
}

impl Fault {
    /// Wrap a backend error, preserving its full report chain in the message.
    pub fn backend(err: eyre::Report) -> Self {
        Self::BackendFailure {
            message: format!("{err:#}"),
        }
    }
}

/// Result type for everything crossing the bus boundary.
pub type XhResult<T = ()> = Result<T, Fault>;
