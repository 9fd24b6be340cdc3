//! Error types for the script-engine boundary.

use callkit_core::ConversionError;
use thiserror::Error;

/// Errors a [`ScriptSession`](crate::ScriptSession) reports, or that occur
/// while forwarding a call into one.
///
/// Script-bound callables never surface these to their caller: any error
/// resolves to the return type's default value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScriptError {
    /// Session was dropped or its lock poisoned
    #[error("script session unavailable")]
    SessionUnavailable,

    /// Session is already running a call on this thread
    #[error("script session is busy on this thread")]
    SessionBusy,

    /// Session refused to begin the call
    #[error("script call to {name} rejected")]
    CallRejected { name: String },

    /// Session refused an argument
    #[error("argument {index} rejected")]
    ArgumentRejected { index: usize },

    /// Call succeeded but produced no return value
    #[error("script call produced no return value")]
    MissingReturn,

    /// Return value could not be converted to the declared type
    #[error("return value conversion: {0}")]
    Conversion(#[from] ConversionError),

    /// Script execution failed
    #[error("script error: {message}")]
    Failed { message: String },
}

impl ScriptError {
    /// Create a rejection error for the function `name`.
    pub fn rejected(name: impl Into<String>) -> Self {
        ScriptError::CallRejected { name: name.into() }
    }

    /// Create a generic script failure.
    pub fn failed(message: impl Into<String>) -> Self {
        ScriptError::Failed {
            message: message.into(),
        }
    }
}
