//! Per-call parameter storage.
//!
//! A [`ParameterPack`] carries one storage slot per declared parameter plus a
//! return slot for non-void callables. It remembers the [`Signature`] it was
//! built for, which is how a dynamic callable decides whether a pack matches.
//!
//! # Copy semantics
//!
//! `clone()` duplicates every parameter slot but resets the return slot to the
//! return type's default, so a call result never silently propagates into a
//! new pack. `clone_from()` is assignment: it carries the return slot over.

use std::any::TypeId;
use std::fmt;

use callkit_core::{
    Dynamic, FieldSource, FlatStringParser, ParamList, ParseOptions, Signature, TypeAdapter,
    TypeHash,
};

fn default_return<R: TypeAdapter>() -> Option<Dynamic> {
    (!R::IS_VOID).then(|| R::default_value().into_storage())
}

/// Storage for one call.
pub struct ParameterPack {
    signature: Signature,
    /// Real `(R, A)` types; adapter names alone may collide.
    types: (TypeId, TypeId),
    slots: Vec<Dynamic>,
    return_slot: Option<Dynamic>,
    return_default: fn() -> Option<Dynamic>,
}

impl ParameterPack {
    fn with_slots<R: TypeAdapter, A: ParamList>(slots: Vec<Dynamic>) -> Self {
        Self::with_signature::<R, A>(Signature::of::<R, A>(), slots)
    }

    /// Build a pack for a signature the caller already resolved.
    ///
    /// `signature` must be `Signature::of::<R, A>()` for the `A` that
    /// produced `slots`.
    pub(crate) fn with_signature<R: TypeAdapter, A: ParamList>(
        signature: Signature,
        slots: Vec<Dynamic>,
    ) -> Self {
        Self {
            signature,
            types: (TypeId::of::<R>(), TypeId::of::<A>()),
            slots,
            return_slot: default_return::<R>(),
            return_default: default_return::<R>,
        }
    }

    /// Build a pack from typed argument values.
    pub fn new<R: TypeAdapter, A: ParamList>(args: A) -> Self {
        Self::with_slots::<R, A>(args.into_storage())
    }

    /// Build a pack with every parameter at its default value.
    pub fn defaults<R: TypeAdapter, A: ParamList>() -> Self {
        Self::with_slots::<R, A>(A::default_storage())
    }

    /// Build a pack from a flat call string with default parse options.
    ///
    /// Never fails: missing or malformed fields take their defaults.
    pub fn from_text<R: TypeAdapter, A: ParamList>(text: &str) -> Self {
        Self::from_text_with::<R, A>(text, &ParseOptions::default())
    }

    /// Build a pack from a flat call string.
    pub fn from_text_with<R: TypeAdapter, A: ParamList>(text: &str, options: &ParseOptions) -> Self {
        Self::from_fields::<R, A>(&mut FlatStringParser::with_options(text, *options))
    }

    /// Build a pack from any ordered field source.
    pub fn from_fields<R: TypeAdapter, A: ParamList>(source: &mut dyn FieldSource) -> Self {
        Self::new::<R, A>(A::from_fields(source))
    }

    /// Build a pack from the child elements of a structured-document node.
    #[cfg(feature = "xml")]
    pub fn from_element<R: TypeAdapter, A: ParamList>(node: roxmltree::Node<'_, '_>) -> Self {
        Self::from_fields::<R, A>(&mut callkit_core::ElementFields::new(node))
    }

    /// Signature this pack was built for.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Check if this pack was built for exactly `R` and `A`.
    pub(crate) fn built_for<R: TypeAdapter, A: ParamList>(&self) -> bool {
        self.types == (TypeId::of::<R>(), TypeId::of::<A>())
    }

    /// Number of parameter slots.
    pub fn arity(&self) -> usize {
        self.slots.len()
    }

    /// All parameter slots, in order.
    pub fn parameters(&self) -> &[Dynamic] {
        &self.slots
    }

    /// Type of parameter `index`, or [`TypeHash::EMPTY`] when out of range.
    pub fn parameter_type_id(&self, index: usize) -> TypeHash {
        self.signature.param_type(index)
    }

    /// Storage of parameter `index`, or `None` when out of range.
    pub fn parameter_storage(&self, index: usize) -> Option<&Dynamic> {
        self.slots.get(index)
    }

    /// Mutable storage of parameter `index`, or `None` when out of range.
    pub fn parameter_storage_mut(&mut self, index: usize) -> Option<&mut Dynamic> {
        self.slots.get_mut(index)
    }

    /// Typed value of parameter `index`.
    ///
    /// Returns `None` when the index is out of range, `T` is not the declared
    /// type, or the slot no longer holds a `T`.
    pub fn parameter<T: TypeAdapter>(&self, index: usize) -> Option<T> {
        if self.parameter_type_id(index) != T::type_hash() {
            return None;
        }
        T::from_storage(self.slots.get(index)?).ok()
    }

    /// Overwrite parameter `index` with a typed value.
    ///
    /// Returns false, leaving the pack untouched, when the index is out of
    /// range or `T` is not the declared type.
    pub fn set_parameter<T: TypeAdapter>(&mut self, index: usize, value: T) -> bool {
        if self.parameter_type_id(index) != T::type_hash() {
            return false;
        }
        match self.slots.get_mut(index) {
            Some(slot) => {
                *slot = value.into_storage();
                true
            }
            None => false,
        }
    }

    /// Declared return type. Void callables report the `void` hash.
    pub fn return_type_id(&self) -> TypeHash {
        self.signature.return_type()
    }

    /// Check if the pack has a return slot.
    pub fn has_return(&self) -> bool {
        self.return_slot.is_some()
    }

    /// Return slot storage, or `None` for void callables.
    pub fn return_storage(&self) -> Option<&Dynamic> {
        self.return_slot.as_ref()
    }

    /// Mutable return slot storage, or `None` for void callables.
    pub fn return_storage_mut(&mut self) -> Option<&mut Dynamic> {
        self.return_slot.as_mut()
    }

    /// Typed return value.
    ///
    /// Returns `None` for void callables or when `R` is not the declared
    /// return type.
    pub fn return_value<R: TypeAdapter>(&self) -> Option<R> {
        if R::IS_VOID || self.return_type_id() != R::type_hash() {
            return None;
        }
        R::from_storage(self.return_slot.as_ref()?).ok()
    }

    /// Reset the return slot to the return type's default.
    pub fn reset_return(&mut self) {
        self.return_slot = (self.return_default)();
    }

    /// Store a call result. Ignored for void callables.
    pub(crate) fn write_return(&mut self, value: Dynamic) {
        if let Some(slot) = self.return_slot.as_mut() {
            *slot = value;
        }
    }
}

impl Clone for ParameterPack {
    fn clone(&self) -> Self {
        Self {
            signature: self.signature.clone(),
            types: self.types,
            slots: self.slots.clone(),
            return_slot: (self.return_default)(),
            return_default: self.return_default,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.signature = source.signature.clone();
        self.types = source.types;
        self.slots.clone_from(&source.slots);
        self.return_slot.clone_from(&source.return_slot);
        self.return_default = source.return_default;
    }
}

impl fmt::Debug for ParameterPack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterPack")
            .field("signature", &self.signature)
            .field("slots", &self.slots)
            .field("return_slot", &self.return_slot)
            .finish()
    }
}
