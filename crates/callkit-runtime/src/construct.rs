//! Constructor callables.
//!
//! A [`ConstructingCallable`] builds a new native object from its arguments,
//! places it on a [`SharedHeap`] and returns the handle. Its signature returns
//! `object@`, the same as any other function handing back an object handle.
//! The handle is null only when the heap is full.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use callkit_core::{ObjectHandle, ParamList, SharedHeap, TypeHash};

use crate::callable::TypedCallable;

/// A native type that can live on an object heap.
pub trait NativeClass: Any + Send {
    /// Type name used for identity.
    const NAME: &'static str;

    /// Type hash derived from [`NAME`](NativeClass::NAME).
    fn class_hash() -> TypeHash {
        TypeHash::from_name(Self::NAME)
    }
}

/// A native type constructible from the parameter list `A`.
pub trait Constructible<A: ParamList>: NativeClass + Sized {
    /// Build a new instance.
    fn construct(args: A) -> Self;
}

/// Callable that constructs a `T` per invocation.
///
/// ```
/// use callkit_core::{SharedHeap, ObjectHandle};
/// use callkit_runtime::{Constructible, ConstructingCallable, DynamicCallable, NativeClass};
///
/// struct Point { x: f32, y: f32 }
///
/// impl NativeClass for Point {
///     const NAME: &'static str = "Point";
/// }
///
/// impl Constructible<(f32, f32)> for Point {
///     fn construct((x, y): (f32, f32)) -> Self {
///         Point { x, y }
///     }
/// }
///
/// let heap = SharedHeap::new();
/// let mut ctor = DynamicCallable::owned(ConstructingCallable::<Point, (f32, f32)>::new(heap.clone()));
/// assert_eq!(ctor.signature().text(), "object@(float,float)");
///
/// let mut pack = ctor.make_pack_from_text("1.5|2.5").unwrap();
/// ctor.invoke(&mut pack);
/// let handle = pack.return_value::<Option<ObjectHandle>>().flatten().unwrap();
/// assert_eq!(heap.read(handle, |p: &Point| p.x + p.y), Some(4.0));
/// ```
pub struct ConstructingCallable<T, A> {
    heap: SharedHeap,
    _marker: PhantomData<fn(A) -> T>,
}

impl<T, A> ConstructingCallable<T, A>
where
    T: Constructible<A>,
    A: ParamList,
{
    /// Construct onto `heap`.
    pub fn new(heap: SharedHeap) -> Self {
        Self {
            heap,
            _marker: PhantomData,
        }
    }

    /// Heap new instances are placed on.
    pub fn heap(&self) -> &SharedHeap {
        &self.heap
    }

    /// Identity of this constructor: the class plus its parameter types.
    pub fn constructor_id() -> TypeHash {
        TypeHash::from_constructor(T::class_hash(), &A::type_hashes())
    }
}

impl<T, A> Clone for ConstructingCallable<T, A> {
    fn clone(&self) -> Self {
        Self {
            heap: self.heap.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: NativeClass, A> fmt::Debug for ConstructingCallable<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructingCallable")
            .field("class", &T::NAME)
            .finish_non_exhaustive()
    }
}

impl<T, A> TypedCallable<Option<ObjectHandle>, A> for ConstructingCallable<T, A>
where
    T: Constructible<A>,
    A: ParamList,
{
    #[cfg_attr(feature = "profiling", profiling::function)]
    fn invoke(&mut self, args: A) -> Option<ObjectHandle> {
        let handle = self.heap.allocate(T::construct(args));
        if handle.is_none() {
            log::debug!("[ConstructingCallable::invoke] heap full, {} not constructed", T::NAME);
        }
        handle
    }

    fn clone_boxed(&self) -> Box<dyn TypedCallable<Option<ObjectHandle>, A>> {
        Box::new(self.clone())
    }
}
