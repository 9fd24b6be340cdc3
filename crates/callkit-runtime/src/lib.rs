//! callkit runtime crate.
//!
//! Callables and the per-call storage they run against:
//! - `ParameterPack`: one storage slot per parameter plus a return slot
//! - `TypedCallable`: statically typed callables, with closure and placeholder impls
//! - `DynamicCallable`: signature-erased callables invoked from packs, text or documents
//! - `ConstructingCallable`: builds native objects onto a shared heap
//! - `ScriptBoundCallable`: forwards calls through a `ScriptSession`
//!
//! Nothing on the call path returns an error or panics. Mismatched packs and
//! unbound callables are no-ops, unreadable input takes default values, and an
//! unavailable script session yields the default return value.

mod error;
pub use error::ScriptError;

mod pack;
pub use pack::ParameterPack;

mod callable;
pub use callable::{EmptyCallable, FnCallable, Invoke, TypedCallable};

mod diagnostics;
pub use diagnostics::{MismatchCounter, MismatchObserver, SignatureMismatch};

mod dynamic;
pub use dynamic::{DynamicCallable, Ownership};

mod construct;
pub use construct::{ConstructingCallable, Constructible, NativeClass};

mod script;
pub use script::{ScriptBoundCallable, ScriptSession, SessionRef};
