//! Statically typed callables.
//!
//! [`TypedCallable`] is the typed half of the call layer: a callable with a
//! fixed return type `R` and parameter tuple `A`. Anything implementing it can
//! be erased into a [`DynamicCallable`](crate::DynamicCallable).

use std::fmt;
use std::marker::PhantomData;

use callkit_core::{ParamList, TypeAdapter};

/// A callable with a fixed signature.
///
/// Implementors only need [`clone_boxed`](TypedCallable::clone_boxed); the
/// provided `invoke` does no work and returns the default `R`, which makes a
/// bare implementation a legal placeholder.
pub trait TypedCallable<R: TypeAdapter, A: ParamList>: Send {
    /// Run the callable.
    fn invoke(&mut self, _args: A) -> R {
        R::default_value()
    }

    /// Produce an independent copy of this callable.
    fn clone_boxed(&self) -> Box<dyn TypedCallable<R, A>>;
}

impl<R: TypeAdapter, A: ParamList> fmt::Debug for dyn TypedCallable<R, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedCallable").finish_non_exhaustive()
    }
}

/// Placeholder callable that always returns the default `R`.
pub struct EmptyCallable<R, A> {
    _marker: PhantomData<fn(A) -> R>,
}

impl<R, A> EmptyCallable<R, A> {
    /// Create a placeholder.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<R, A> Default for EmptyCallable<R, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, A> Clone for EmptyCallable<R, A> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<R, A> fmt::Debug for EmptyCallable<R, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EmptyCallable")
    }
}

impl<R: TypeAdapter, A: ParamList> TypedCallable<R, A> for EmptyCallable<R, A> {
    fn clone_boxed(&self) -> Box<dyn TypedCallable<R, A>> {
        Box::new(Self::new())
    }
}

/// Calls a function with its arguments packed in a tuple.
///
/// Implemented for every `FnMut` of up to sixteen parameters, so closures and
/// plain functions can back a [`FnCallable`].
pub trait Invoke<A, R> {
    /// Call with unpacked arguments.
    fn invoke_with(&mut self, args: A) -> R;
}

macro_rules! impl_invoke {
    ($($P:ident $p:ident),*) => {
        impl<F, R, $($P),*> Invoke<($($P,)*), R> for F
        where
            F: FnMut($($P),*) -> R,
        {
            #[allow(clippy::unused_unit)]
            fn invoke_with(&mut self, ($($p,)*): ($($P,)*)) -> R {
                (self)($($p),*)
            }
        }
    };
}

impl_invoke!();
impl_invoke!(P0 p0);
impl_invoke!(P0 p0, P1 p1);
impl_invoke!(P0 p0, P1 p1, P2 p2);
impl_invoke!(P0 p0, P1 p1, P2 p2, P3 p3);
impl_invoke!(P0 p0, P1 p1, P2 p2, P3 p3, P4 p4);
impl_invoke!(P0 p0, P1 p1, P2 p2, P3 p3, P4 p4, P5 p5);
impl_invoke!(P0 p0, P1 p1, P2 p2, P3 p3, P4 p4, P5 p5, P6 p6);
impl_invoke!(P0 p0, P1 p1, P2 p2, P3 p3, P4 p4, P5 p5, P6 p6, P7 p7);
impl_invoke!(P0 p0, P1 p1, P2 p2, P3 p3, P4 p4, P5 p5, P6 p6, P7 p7, P8 p8);
impl_invoke!(P0 p0, P1 p1, P2 p2, P3 p3, P4 p4, P5 p5, P6 p6, P7 p7, P8 p8, P9 p9);
impl_invoke!(P0 p0, P1 p1, P2 p2, P3 p3, P4 p4, P5 p5, P6 p6, P7 p7, P8 p8, P9 p9, P10 p10);
impl_invoke!(
    P0 p0, P1 p1, P2 p2, P3 p3, P4 p4, P5 p5, P6 p6, P7 p7, P8 p8, P9 p9, P10 p10, P11 p11
);
impl_invoke!(
    P0 p0, P1 p1, P2 p2, P3 p3, P4 p4, P5 p5, P6 p6, P7 p7, P8 p8, P9 p9, P10 p10, P11 p11,
    P12 p12
);
impl_invoke!(
    P0 p0, P1 p1, P2 p2, P3 p3, P4 p4, P5 p5, P6 p6, P7 p7, P8 p8, P9 p9, P10 p10, P11 p11,
    P12 p12, P13 p13
);
impl_invoke!(
    P0 p0, P1 p1, P2 p2, P3 p3, P4 p4, P5 p5, P6 p6, P7 p7, P8 p8, P9 p9, P10 p10, P11 p11,
    P12 p12, P13 p13, P14 p14
);
impl_invoke!(
    P0 p0, P1 p1, P2 p2, P3 p3, P4 p4, P5 p5, P6 p6, P7 p7, P8 p8, P9 p9, P10 p10, P11 p11,
    P12 p12, P13 p13, P14 p14, P15 p15
);

/// A typed callable backed by a closure or function.
///
/// Cloning clones the closure, including any state it captured.
pub struct FnCallable<F, R, A> {
    f: F,
    _marker: PhantomData<fn(A) -> R>,
}

impl<F, R, A> FnCallable<F, R, A>
where
    F: Invoke<A, R>,
{
    /// Wrap `f`.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

impl<F: Clone, R, A> Clone for FnCallable<F, R, A> {
    fn clone(&self) -> Self {
        Self {
            f: self.f.clone(),
            _marker: PhantomData,
        }
    }
}

impl<F, R, A> fmt::Debug for FnCallable<F, R, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCallable").finish_non_exhaustive()
    }
}

impl<F, R, A> TypedCallable<R, A> for FnCallable<F, R, A>
where
    F: Invoke<A, R> + Clone + Send + 'static,
    R: TypeAdapter,
    A: ParamList,
{
    #[cfg_attr(feature = "profiling", profiling::function)]
    fn invoke(&mut self, args: A) -> R {
        self.f.invoke_with(args)
    }

    fn clone_boxed(&self) -> Box<dyn TypedCallable<R, A>> {
        Box::new(self.clone())
    }
}
