//! Error types for value conversion across the erasure boundary.

use thiserror::Error;

/// Errors that can occur when converting between typed values, storage
/// slots and text.
///
/// None of these reach a caller of the invocation path: the call path resolves
/// every conversion failure to the target type's default value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// Storage slot holds a different kind of value
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// Attempted to convert a null handle to a non-nullable type
    #[error("null handle cannot be converted to {target_type}")]
    NullHandle { target_type: &'static str },

    /// Integer does not fit the target type
    #[error("integer overflow: value {value} does not fit in {target_type}")]
    IntegerOverflow {
        value: i64,
        target_type: &'static str,
    },

    /// Float cannot be represented by the target type
    #[error("float conversion error: value {value} cannot be represented as {target_type}")]
    FloatConversion {
        value: f64,
        target_type: &'static str,
    },

    /// Text could not be parsed as the target type
    #[error("cannot parse {text:?} as {target_type}")]
    Parse {
        text: String,
        target_type: &'static str,
    },

    /// The target type has no representation for this operation
    #[error("{target_type} does not support {operation}")]
    Unsupported {
        target_type: &'static str,
        operation: &'static str,
    },
}

impl ConversionError {
    /// Create a parse error for `text`.
    pub fn parse(text: impl Into<String>, target_type: &'static str) -> Self {
        ConversionError::Parse {
            text: text.into(),
            target_type,
        }
    }
}
