//! Signature-erased callables.
//!
//! A [`DynamicCallable`] wraps any [`TypedCallable`] behind a uniform
//! interface. Callers hand it a [`ParameterPack`], a flat call string or a
//! document node; the callable converts the fields to its parameter types,
//! runs, and writes the return slot.
//!
//! Nothing on this path returns an error. A pack built for a different
//! signature is ignored, an unbound callable does nothing, and unreadable
//! fields take their defaults.
//!
//! ```
//! use callkit_runtime::DynamicCallable;
//!
//! let mut callable = DynamicCallable::from_fn(|a: i32, b: String| a + b.len() as i32);
//! assert_eq!(callable.signature().text(), "int(int,string)");
//! assert_eq!(callable.invoke_with_return("3|hello"), "8");
//! assert_eq!(callable.invoke_with_return("3"), "3");
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use callkit_core::{
    FieldSource, FlatStringParser, ParamList, ParseOptions, Signature, TypeAdapter, TypeHash,
    storage_or_default,
};

use crate::callable::{FnCallable, Invoke, TypedCallable};
use crate::diagnostics::{MismatchObserver, SignatureMismatch};
use crate::pack::ParameterPack;

/// Whether a dynamic callable owns its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ownership {
    /// Target is owned and dropped with the callable
    Owned,
    /// Target is borrowed from the caller
    Borrowed,
}

/// Where a binding keeps its typed target.
trait Target<R: TypeAdapter, A: ParamList>: Send {
    const OWNERSHIP: Ownership;

    fn target(&self) -> &dyn TypedCallable<R, A>;

    fn target_mut(&mut self) -> &mut dyn TypedCallable<R, A>;
}

impl<R: TypeAdapter, A: ParamList> Target<R, A> for Box<dyn TypedCallable<R, A>> {
    const OWNERSHIP: Ownership = Ownership::Owned;

    fn target(&self) -> &dyn TypedCallable<R, A> {
        &**self
    }

    fn target_mut(&mut self) -> &mut dyn TypedCallable<R, A> {
        &mut **self
    }
}

impl<R: TypeAdapter, A: ParamList> Target<R, A> for &mut (dyn TypedCallable<R, A> + 'static) {
    const OWNERSHIP: Ownership = Ownership::Borrowed;

    fn target(&self) -> &dyn TypedCallable<R, A> {
        &**self
    }

    fn target_mut(&mut self) -> &mut dyn TypedCallable<R, A> {
        &mut **self
    }
}

/// Object-safe view of a typed binding.
trait ErasedCallable: Send {
    fn signature(&self) -> &Signature;

    fn ownership(&self) -> Ownership;

    /// Check if `pack` was built for this binding's signature and real types.
    fn accepts(&self, pack: &ParameterPack) -> bool;

    /// Run against a pack already known to be accepted.
    fn call(&mut self, pack: &mut ParameterPack);

    fn default_pack(&self) -> ParameterPack;

    fn pack_from_fields(&self, source: &mut dyn FieldSource) -> ParameterPack;

    fn return_text(&self, pack: &ParameterPack) -> String;

    fn clone_owned(&self) -> Box<dyn ErasedCallable>;
}

struct Binding<R, A, T> {
    target: T,
    signature: Signature,
    _marker: PhantomData<fn(A) -> R>,
}

impl<R, A, T> Binding<R, A, T>
where
    R: TypeAdapter,
    A: ParamList,
    T: Target<R, A>,
{
    fn new(target: T) -> Self {
        Self::with_signature(target, Signature::of::<R, A>())
    }

    fn with_signature(target: T, signature: Signature) -> Self {
        Self {
            target,
            signature,
            _marker: PhantomData,
        }
    }
}

impl<R, A, T> ErasedCallable for Binding<R, A, T>
where
    R: TypeAdapter,
    A: ParamList,
    T: Target<R, A>,
{
    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn ownership(&self) -> Ownership {
        T::OWNERSHIP
    }

    fn accepts(&self, pack: &ParameterPack) -> bool {
        pack.signature() == &self.signature && pack.built_for::<R, A>()
    }

    fn call(&mut self, pack: &mut ParameterPack) {
        let args = A::from_storage(pack.parameters());
        let result = self.target.target_mut().invoke(args);
        if !R::IS_VOID {
            pack.write_return(result.into_storage());
        }
    }

    fn default_pack(&self) -> ParameterPack {
        ParameterPack::with_signature::<R, A>(self.signature.clone(), A::default_storage())
    }

    fn pack_from_fields(&self, source: &mut dyn FieldSource) -> ParameterPack {
        let args = A::from_fields(source);
        ParameterPack::with_signature::<R, A>(self.signature.clone(), args.into_storage())
    }

    fn return_text(&self, pack: &ParameterPack) -> String {
        if R::IS_VOID {
            return String::new();
        }
        pack.return_storage()
            .map(storage_or_default::<R>)
            .unwrap_or_else(R::default_value)
            .to_text()
    }

    fn clone_owned(&self) -> Box<dyn ErasedCallable> {
        Box::new(Binding::<R, A, Box<dyn TypedCallable<R, A>>>::with_signature(
            self.target.target().clone_boxed(),
            self.signature.clone(),
        ))
    }
}

/// A callable whose signature is only known at runtime.
///
/// The lifetime is `'static` for owned callables and the borrow's lifetime for
/// [`borrowed`](DynamicCallable::borrowed) ones. Cloning always produces an
/// owned, independent callable.
///
/// A `DynamicCallable` is `Send` but not internally synchronized. Give each
/// thread its own clone.
pub struct DynamicCallable<'a> {
    inner: Option<Box<dyn ErasedCallable + 'a>>,
    observer: Option<Arc<dyn MismatchObserver>>,
}

impl DynamicCallable<'static> {
    /// Take ownership of a typed callable.
    pub fn owned<R, A, C>(callable: C) -> Self
    where
        R: TypeAdapter,
        A: ParamList,
        C: TypedCallable<R, A> + 'static,
    {
        Self::from_boxed::<R, A>(Box::new(callable))
    }

    /// Take ownership of a boxed typed callable.
    pub fn from_boxed<R, A>(callable: Box<dyn TypedCallable<R, A>>) -> Self
    where
        R: TypeAdapter,
        A: ParamList,
    {
        Self {
            inner: Some(Box::new(Binding::<R, A, _>::new(callable))),
            observer: None,
        }
    }

    /// Wrap a closure or function.
    pub fn from_fn<F, R, A>(f: F) -> Self
    where
        F: Invoke<A, R> + Clone + Send + 'static,
        R: TypeAdapter,
        A: ParamList,
    {
        Self::owned(FnCallable::<F, R, A>::new(f))
    }
}

impl<'a> DynamicCallable<'a> {
    /// Borrow a typed callable for the lifetime `'a`.
    ///
    /// Calls mutate the caller's callable. Clones of the result own a copy
    /// made with [`TypedCallable::clone_boxed`].
    pub fn borrowed<R, A, C>(callable: &'a mut C) -> Self
    where
        R: TypeAdapter,
        A: ParamList,
        C: TypedCallable<R, A> + 'static,
    {
        let target: &'a mut (dyn TypedCallable<R, A> + 'static) = callable;
        Self {
            inner: Some(Box::new(Binding::<R, A, _>::new(target))),
            observer: None,
        }
    }

    /// A callable with no target. Every invocation is a no-op.
    pub fn unbound() -> Self {
        Self {
            inner: None,
            observer: None,
        }
    }

    /// Attach a mismatch observer.
    pub fn with_observer(mut self, observer: Arc<dyn MismatchObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Replace or remove the mismatch observer.
    pub fn set_observer(&mut self, observer: Option<Arc<dyn MismatchObserver>>) {
        self.observer = observer;
    }

    /// Check if the callable has a target.
    pub fn is_bound(&self) -> bool {
        self.inner.is_some()
    }

    /// Ownership of the target. Unbound callables report `Owned`.
    pub fn ownership(&self) -> Ownership {
        self.inner
            .as_ref()
            .map_or(Ownership::Owned, |inner| inner.ownership())
    }

    /// The callable's signature, or [`Signature::unbound`] without a target.
    pub fn signature(&self) -> Signature {
        match &self.inner {
            Some(inner) => inner.signature().clone(),
            None => Signature::unbound(),
        }
    }

    /// Number of parameters. Zero when unbound.
    pub fn parameter_count(&self) -> usize {
        self.inner
            .as_ref()
            .map_or(0, |inner| inner.signature().arity())
    }

    /// Type of parameter `index`, or [`TypeHash::EMPTY`] when out of range or
    /// unbound.
    pub fn parameter_type_id(&self, index: usize) -> TypeHash {
        self.inner
            .as_ref()
            .map_or(TypeHash::EMPTY, |inner| inner.signature().param_type(index))
    }

    /// Return type, or [`TypeHash::EMPTY`] when unbound.
    pub fn return_type_id(&self) -> TypeHash {
        self.inner
            .as_ref()
            .map_or(TypeHash::EMPTY, |inner| inner.signature().return_type())
    }

    /// Invoke with a prepared pack.
    ///
    /// Does nothing when the pack's signature differs from the callable's or
    /// the callable is unbound. A pack built for different Rust types that
    /// share adapter names also counts as a mismatch. Otherwise converts each slot in order, calls
    /// the target and stores the result in the pack's return slot.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn invoke(&mut self, pack: &mut ParameterPack) {
        let Some(inner) = self.inner.as_mut() else {
            return;
        };
        if !inner.accepts(pack) {
            if let Some(observer) = &self.observer {
                observer.on_mismatch(&SignatureMismatch {
                    expected: inner.signature(),
                    actual: pack.signature(),
                });
            }
            return;
        }
        inner.call(pack);
    }

    /// Invoke with fields pulled from `source`, returning the result as text.
    ///
    /// Void and unbound callables return an empty string.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn invoke_fields(&mut self, source: &mut dyn FieldSource) -> String {
        let Some(inner) = self.inner.as_mut() else {
            log::trace!("[DynamicCallable::invoke_fields] unbound callable, skipping");
            return String::new();
        };
        let mut pack = inner.pack_from_fields(source);
        inner.call(&mut pack);
        inner.return_text(&pack)
    }

    /// Invoke with a flat call string, discarding the result.
    pub fn invoke_text(&mut self, text: &str) {
        self.invoke_text_with(text, &ParseOptions::default());
    }

    /// Invoke with a flat call string parsed with `options`, discarding the
    /// result.
    pub fn invoke_text_with(&mut self, text: &str, options: &ParseOptions) {
        self.invoke_with_return_with(text, options);
    }

    /// Invoke with a flat call string and return the result as text.
    pub fn invoke_with_return(&mut self, text: &str) -> String {
        self.invoke_with_return_with(text, &ParseOptions::default())
    }

    /// Invoke with a flat call string parsed with `options` and return the
    /// result as text.
    pub fn invoke_with_return_with(&mut self, text: &str, options: &ParseOptions) -> String {
        self.invoke_fields(&mut FlatStringParser::with_options(text, *options))
    }

    /// Invoke with the child elements of `node`, discarding the result.
    #[cfg(feature = "xml")]
    pub fn invoke_element(&mut self, node: roxmltree::Node<'_, '_>) {
        self.invoke_element_with_return(node);
    }

    /// Invoke with the child elements of `node` and return the result as text.
    #[cfg(feature = "xml")]
    pub fn invoke_element_with_return(&mut self, node: roxmltree::Node<'_, '_>) -> String {
        self.invoke_fields(&mut callkit_core::ElementFields::new(node))
    }

    /// A pack matching this callable with every parameter at its default.
    pub fn make_pack(&self) -> Option<ParameterPack> {
        self.inner.as_ref().map(|inner| inner.default_pack())
    }

    /// A pack matching this callable, filled from a flat call string.
    pub fn make_pack_from_text(&self, text: &str) -> Option<ParameterPack> {
        let inner = self.inner.as_ref()?;
        Some(inner.pack_from_fields(&mut FlatStringParser::new(text)))
    }

    /// An owned, independent copy. Unbound callables copy to unbound.
    ///
    /// The copy shares this callable's observer.
    pub fn clone_owned(&self) -> DynamicCallable<'static> {
        DynamicCallable {
            inner: self.inner.as_ref().map(|inner| inner.clone_owned()),
            observer: self.observer.clone(),
        }
    }
}

impl Default for DynamicCallable<'_> {
    fn default() -> Self {
        Self::unbound()
    }
}

impl Clone for DynamicCallable<'_> {
    fn clone(&self) -> Self {
        self.clone_owned()
    }
}

impl fmt::Debug for DynamicCallable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicCallable")
            .field("signature", &self.signature())
            .field("ownership", &self.ownership())
            .field("observed", &self.observer.is_some())
            .finish()
    }
}
