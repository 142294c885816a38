//! Widget model errors.

use smol_str::SmolStr;
use thiserror::Error;

/// Errors raised while decoding or validating a widget record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Record is not a JSON object.
    #[error("widget record must be a JSON object")]
    NotAnObject,

    /// Record has no `type` key.
    #[error("widget record has no 'type'")]
    MissingType,

    /// Record `type` is outside the known widget set.
    #[error("unknown widget type '{0}'")]
    UnknownType(SmolStr),

    /// Record has no usable `channel`.
    #[error("widget record of type '{0}' has no 'channel'")]
    MissingChannel(SmolStr),

    /// A key holds a value of the wrong JSON type.
    #[error("invalid value for '{key}': expected {expected}")]
    InvalidValue { key: SmolStr, expected: &'static str },
}

/// Errors raised by value normalization.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum NormalizeError {
    /// Input range has zero width, so remapping is undefined.
    #[error("degenerate range [{min}, {max}]")]
    DegenerateRange { min: f64, max: f64 },
}
