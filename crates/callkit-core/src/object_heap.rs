//! Generational object storage for the object-handle return channel.
//!
//! Constructors and object-returning callables hand out [`ObjectHandle`]s
//! instead of pointers. A handle names a heap slot plus the generation it was
//! allocated in, so a handle to a freed object never resolves again.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// Handle to a heap-allocated object.
///
/// This is a safe, copyable reference to an object in the [`ObjectHeap`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectHandle {
    /// Index into ObjectHeap.slots
    pub index: u32,
    /// Generation for use-after-free detection
    pub generation: u32,
    /// Rust TypeId for runtime type verification
    pub type_id: TypeId,
}

impl ObjectHandle {
    /// Create a new object handle.
    pub fn new(index: u32, generation: u32, type_id: TypeId) -> Self {
        Self {
            index,
            generation,
            type_id,
        }
    }

    /// A handle that never resolves on any heap.
    pub fn dangling() -> Self {
        Self::new(u32::MAX, u32::MAX, TypeId::of::<()>())
    }

    /// Check if this handle was created by [`ObjectHandle::dangling`].
    pub fn is_dangling(&self) -> bool {
        self.index == u32::MAX && self.generation == u32::MAX
    }

    /// Check whether the handle was allocated for a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

/// Most slots a heap can address. Index `u32::MAX` is reserved for
/// [`ObjectHandle::dangling`].
pub const MAX_HEAP_SLOTS: u32 = u32::MAX;

/// Heap storage for objects with generational indices.
///
/// When an object is freed its slot is reused, but the generation is
/// incremented so stale handles are detected.
pub struct ObjectHeap {
    slots: Vec<HeapSlot>,
    free_list: Vec<u32>,
    max_slots: u32,
}

struct HeapSlot {
    generation: u32,
    value: Option<Box<dyn Any + Send>>,
    ref_count: u32,
}

impl ObjectHeap {
    /// Create a new empty object heap.
    pub fn new() -> Self {
        Self::with_max_slots(MAX_HEAP_SLOTS)
    }

    /// Create a heap that never grows past `max_slots` slots.
    pub fn with_max_slots(max_slots: u32) -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            max_slots,
        }
    }

    /// Allocate a new object on the heap.
    ///
    /// Returns `None` when every slot is live and the heap is at its slot
    /// limit. Handles already handed out are never reused while live.
    pub fn allocate<T: Any + Send>(&mut self, value: T) -> Option<ObjectHandle> {
        let type_id = TypeId::of::<T>();

        if let Some(index) = self.free_list.pop() {
            let slot = self.slots.get_mut(index as usize)?;
            slot.value = Some(Box::new(value));
            slot.ref_count = 1;
            return Some(ObjectHandle::new(index, slot.generation, type_id));
        }

        let index = u32::try_from(self.slots.len())
            .ok()
            .filter(|index| *index < self.max_slots)?;
        self.slots.push(HeapSlot {
            generation: 0,
            value: Some(Box::new(value)),
            ref_count: 1,
        });
        Some(ObjectHandle::new(index, 0, type_id))
    }

    fn live_slot(&self, handle: ObjectHandle) -> Option<&HeapSlot> {
        let slot = self.slots.get(handle.index as usize)?;
        (slot.generation == handle.generation && slot.value.is_some()).then_some(slot)
    }

    fn live_slot_mut(&mut self, handle: ObjectHandle) -> Option<&mut HeapSlot> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        (slot.generation == handle.generation && slot.value.is_some()).then_some(slot)
    }

    /// Get immutable reference to an object.
    ///
    /// Returns None if the handle is stale or the type doesn't match.
    pub fn get<T: Any>(&self, handle: ObjectHandle) -> Option<&T> {
        self.live_slot(handle)?.value.as_ref()?.downcast_ref::<T>()
    }

    /// Get mutable reference to an object.
    ///
    /// Returns None if the handle is stale or the type doesn't match.
    pub fn get_mut<T: Any>(&mut self, handle: ObjectHandle) -> Option<&mut T> {
        self.live_slot_mut(handle)?.value.as_mut()?.downcast_mut::<T>()
    }

    /// Check whether a handle still refers to a live object.
    pub fn contains(&self, handle: ObjectHandle) -> bool {
        self.live_slot(handle).is_some()
    }

    /// Increment reference count.
    pub fn add_ref(&mut self, handle: ObjectHandle) -> bool {
        match self.live_slot_mut(handle) {
            Some(slot) => {
                slot.ref_count = slot.ref_count.saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Decrement reference count, free if zero.
    ///
    /// Returns true if the object was freed.
    pub fn release(&mut self, handle: ObjectHandle) -> bool {
        let Some(slot) = self.live_slot_mut(handle) else {
            return false;
        };
        slot.ref_count = slot.ref_count.saturating_sub(1);
        if slot.ref_count == 0 {
            self.free(handle);
            return true;
        }
        false
    }

    /// Free object immediately.
    pub fn free(&mut self, handle: ObjectHandle) {
        if let Some(slot) = self.live_slot_mut(handle) {
            slot.value = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free_list.push(handle.index);
        }
    }

    /// Get the reference count for an object.
    pub fn ref_count(&self, handle: ObjectHandle) -> Option<u32> {
        self.live_slot(handle).map(|slot| slot.ref_count)
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    /// Check if the heap holds no live objects.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ObjectHeap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObjectHeap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectHeap")
            .field("slot_count", &self.slots.len())
            .field("free_count", &self.free_list.len())
            .finish()
    }
}

/// An [`ObjectHeap`] shared between the callables that allocate into it and
/// the code that reads the results.
///
/// Cloning shares the heap. A poisoned lock is recovered; the heap holds no
/// invariants a panicking reader could break.
#[derive(Clone, Default)]
pub struct SharedHeap {
    inner: Arc<Mutex<ObjectHeap>>,
}

impl SharedHeap {
    /// Create a new empty shared heap.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ObjectHeap> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Create a shared heap that never grows past `max_slots` slots.
    pub fn with_max_slots(max_slots: u32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ObjectHeap::with_max_slots(max_slots))),
        }
    }

    /// Allocate a new object on the shared heap.
    ///
    /// Returns `None` when the heap is full.
    pub fn allocate<T: Any + Send>(&self, value: T) -> Option<ObjectHandle> {
        self.lock().allocate(value)
    }

    /// Run `f` against the object behind `handle`.
    ///
    /// Returns None if the handle is stale or the type doesn't match.
    pub fn read<T: Any, R>(&self, handle: ObjectHandle, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.lock().get::<T>(handle).map(f)
    }

    /// Run `f` against the object behind `handle`, mutably.
    pub fn write<T: Any, R>(&self, handle: ObjectHandle, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.lock().get_mut::<T>(handle).map(f)
    }

    /// Run `f` with exclusive access to the whole heap.
    pub fn with<R>(&self, f: impl FnOnce(&mut ObjectHeap) -> R) -> R {
        f(&mut self.lock())
    }

    /// Decrement reference count, free if zero.
    pub fn release(&self, handle: ObjectHandle) -> bool {
        self.lock().release(handle)
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if the heap holds no live objects.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check whether two values share the same underlying heap.
    pub fn ptr_eq(&self, other: &SharedHeap) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for SharedHeap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedHeap")
            .field("live", &self.len())
            .finish()
    }
}
