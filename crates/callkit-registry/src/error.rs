use thiserror::Error;

/// Errors reported by [`CallableRegistry`](crate::CallableRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A callable with this name and signature is already registered.
    #[error("duplicate registration: {name} already registered as {signature}")]
    Duplicate {
        /// The qualified name.
        name: String,
        /// The signature text.
        signature: String,
    },

    /// Unbound callables cannot be registered.
    #[error("cannot register unbound callable as {0}")]
    Unbound(String),

    /// No callable is registered under this name.
    #[error("callable not found: {0}")]
    NotFound(String),

    /// The name has several overloads and no signature was given.
    #[error("ambiguous call to '{name}': {overloads} overloads registered")]
    Ambiguous {
        /// The qualified name.
        name: String,
        /// Number of registered overloads.
        overloads: usize,
    },
}
