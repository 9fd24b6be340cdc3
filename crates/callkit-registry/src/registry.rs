//! CallableRegistry - named storage for dynamic callables.
//!
//! # Storage Model
//!
//! Callables are stored by [`QualifiedName`]; each name holds a list of
//! overloads with distinct signatures. A `(name, signature)` pair identifies
//! exactly one callable, so signature equality is the whole matching rule.
//!
//! # Thread Safety
//!
//! `CallableRegistry` is `Send` but not `Sync`. Populate it on one thread,
//! then either wrap it in a lock or [`checkout`](CallableRegistry::checkout)
//! independent clones for each thread that needs to call.
//!
//! # Example
//!
//! ```
//! use callkit_registry::{CallableRegistry, DynamicCallable, QualifiedName};
//!
//! let mut registry = CallableRegistry::new();
//! registry
//!     .register("Math::add", DynamicCallable::from_fn(|a: i32, b: i32| a + b))
//!     .unwrap();
//!
//! let name = QualifiedName::from("Math::add");
//! assert_eq!(registry.invoke_text(&name, "2|3").unwrap(), "5");
//! ```

use rustc_hash::FxHashMap;

use callkit_core::{QualifiedName, Signature};
use callkit_runtime::DynamicCallable;

use crate::RegistryError;

/// Callables by name and signature.
#[derive(Default)]
pub struct CallableRegistry {
    /// Overloads by qualified name.
    functions: FxHashMap<QualifiedName, Vec<DynamicCallable<'static>>>,

    /// Total callables across all names.
    count: usize,
}

impl CallableRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callable` under `name`.
    ///
    /// Fails for unbound callables and when the name already has a callable
    /// with the same signature.
    pub fn register(
        &mut self,
        name: impl Into<QualifiedName>,
        callable: DynamicCallable<'static>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if !callable.is_bound() {
            return Err(RegistryError::Unbound(name.to_string()));
        }

        let signature = callable.signature();
        if self.contains(&name, &signature) {
            return Err(RegistryError::Duplicate {
                name: name.to_string(),
                signature: signature.to_string(),
            });
        }

        log::debug!("[CallableRegistry::register] {} {}", name, signature);
        self.functions.entry(name).or_default().push(callable);
        self.count += 1;
        Ok(())
    }

    /// Callable registered under `name` with exactly `signature`.
    pub fn get(&self, name: &QualifiedName, signature: &Signature) -> Option<&DynamicCallable<'static>> {
        self.overloads(name)
            .iter()
            .find(|c| &c.signature() == signature)
    }

    /// Mutable callable registered under `name` with exactly `signature`.
    pub fn get_mut(
        &mut self,
        name: &QualifiedName,
        signature: &Signature,
    ) -> Option<&mut DynamicCallable<'static>> {
        self.functions
            .get_mut(name)?
            .iter_mut()
            .find(|c| &c.signature() == signature)
    }

    /// All overloads registered under `name`, in registration order.
    pub fn overloads(&self, name: &QualifiedName) -> &[DynamicCallable<'static>] {
        self.functions
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Check if a callable is registered under `name` with `signature`.
    pub fn contains(&self, name: &QualifiedName, signature: &Signature) -> bool {
        self.get(name, signature).is_some()
    }

    /// Remove and return the callable under `name` with `signature`.
    pub fn remove(
        &mut self,
        name: &QualifiedName,
        signature: &Signature,
    ) -> Option<DynamicCallable<'static>> {
        let overloads = self.functions.get_mut(name)?;
        let index = overloads.iter().position(|c| &c.signature() == signature)?;
        let removed = overloads.remove(index);
        if overloads.is_empty() {
            self.functions.remove(name);
        }
        self.count -= 1;
        log::debug!("[CallableRegistry::remove] {} {}", name, signature);
        Some(removed)
    }

    /// An independent clone of a registered callable.
    ///
    /// The clone shares nothing mutable with the registered one and can be
    /// moved to another thread.
    pub fn checkout(
        &self,
        name: &QualifiedName,
        signature: &Signature,
    ) -> Option<DynamicCallable<'static>> {
        self.get(name, signature).map(DynamicCallable::clone_owned)
    }

    /// Invoke the only overload of `name` with a flat call string.
    ///
    /// Returns the result as text (empty for void callables).
    pub fn invoke_text(&mut self, name: &QualifiedName, text: &str) -> Result<String, RegistryError> {
        let overloads = self
            .functions
            .get_mut(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        match overloads.as_mut_slice() {
            [callable] => Ok(callable.invoke_with_return(text)),
            many => Err(RegistryError::Ambiguous {
                name: name.to_string(),
                overloads: many.len(),
            }),
        }
    }

    /// Registered names.
    pub fn names(&self) -> impl Iterator<Item = &QualifiedName> {
        self.functions.keys()
    }

    /// Total registered callables.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
