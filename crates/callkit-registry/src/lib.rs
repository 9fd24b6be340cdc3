//! callkit registry crate.
//!
//! Named storage for dynamic callables, keyed by qualified name and
//! signature. Lookups hand out borrowed callables or independent clones.

mod error;
pub use error::RegistryError;

mod registry;
pub use registry::CallableRegistry;

// Re-export the key types so registry users need one import
pub use callkit_core::{QualifiedName, Signature};
pub use callkit_runtime::DynamicCallable;
