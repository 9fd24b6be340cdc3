//! callkit core crate.
//!
//! This crate holds the building blocks of the invocation layer that do not
//! depend on any callable:
//! - Type identity (`TypeHash`, `QualifiedName`, `Signature`)
//! - Storage values and the object heap (`Dynamic`, `ObjectHandle`, `ObjectHeap`)
//! - Per-type conversion policy (`TypeAdapter`) and tuple parameter lists
//! - Field sources for the text and structured-document call surfaces

// Type identity
mod type_hash;
pub use type_hash::{TypeHash, hash_constants};

mod qualified_name;
pub use qualified_name::QualifiedName;

// Error types
mod error;
pub use error::ConversionError;

// Storage values
mod value;
pub use value::Dynamic;

mod object_heap;
pub use object_heap::{MAX_HEAP_SLOTS, ObjectHandle, ObjectHeap, SharedHeap};

// Conversion policy
mod adapter;
pub use adapter::{TypeAdapter, parse_or_default, storage_or_default};

mod params;
pub use params::{MAX_ARITY, ParamList};

mod signature;
pub use signature::Signature;

// Field sources
mod text;
pub use text::{
    FieldSource, FlatStringParser, ParseFlags, ParseOptions, escape_field, join_fields,
};

#[cfg(feature = "xml")]
mod element;
#[cfg(feature = "xml")]
pub use element::{ElementFields, VALUE_ATTRIBUTE, element_value};

// Used by the adapter macros
#[doc(hidden)]
pub mod __private {
    pub use num_enum;
}
