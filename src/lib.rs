//! callkit: dynamic invocation for native functions.
//!
//! Wrap a typed native callable once and invoke it from a parameter pack, a
//! flat call string or a structured document node, without the caller knowing
//! its types at compile time. Callables can also construct native objects or
//! forward into a script engine.
//!
//! ```
//! use callkit::prelude::*;
//!
//! fn greet(times: u8, name: String) -> String {
//!     format!("{}{}", "hi ".repeat(times as usize), name)
//! }
//!
//! let mut callable = DynamicCallable::from_fn(greet);
//! assert_eq!(callable.signature().text(), "string(uint8,string)");
//! assert_eq!(callable.invoke_with_return("2|bob"), "hi hi bob");
//!
//! let mut pack = ParameterPack::new::<String, (u8, String)>((1, "amy".into()));
//! callable.invoke(&mut pack);
//! assert_eq!(pack.return_value::<String>().as_deref(), Some("hi amy"));
//! ```
//!
//! # Crates
//!
//! - [`callkit_core`]: type identity, storage, adapters and field sources
//! - [`callkit_runtime`]: parameter packs and callables
//! - [`callkit_registry`]: named callable storage
//!
//! # Features
//!
//! - `xml` (default): invoke from `roxmltree` nodes
//! - `profiling`: instrument the call path with the `profiling` crate

pub use callkit_core as core;
pub use callkit_registry as registry;
pub use callkit_runtime as runtime;

#[cfg(feature = "xml")]
pub use roxmltree;

pub use callkit_core::{
    ConversionError, Dynamic, FieldSource, FlatStringParser, MAX_ARITY, ObjectHandle, ObjectHeap,
    ParamList, ParseFlags, ParseOptions, QualifiedName, SharedHeap, Signature, TypeAdapter,
    TypeHash, enum_adapter, flags_adapter,
};
pub use callkit_registry::{CallableRegistry, RegistryError};
pub use callkit_runtime::{
    ConstructingCallable, Constructible, DynamicCallable, EmptyCallable, FnCallable,
    MismatchCounter, MismatchObserver, NativeClass, Ownership, ParameterPack,
    ScriptBoundCallable, ScriptError, ScriptSession, SessionRef, SignatureMismatch, TypedCallable,
};

/// Everything needed to wrap and invoke callables.
pub mod prelude {
    pub use callkit_core::{
        Dynamic, ObjectHandle, ParseOptions, QualifiedName, SharedHeap, Signature, TypeAdapter,
    };
    pub use callkit_registry::CallableRegistry;
    pub use callkit_runtime::{
        ConstructingCallable, Constructible, DynamicCallable, NativeClass, ParameterPack,
        ScriptBoundCallable, ScriptSession, SessionRef, TypedCallable,
    };
}
