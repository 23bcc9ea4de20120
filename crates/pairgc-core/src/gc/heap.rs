//! Heap registry for VM objects
//!
//! The heap is the sole owner of every object. Objects live in the slots of
//! a growable arena; freed slots are pushed onto a free list and reused by
//! later allocations, so insertion and removal are both O(1). Reusing a slot
//! bumps its generation, which invalidates handles to the previous occupant;
//! a slot whose generation would overflow is retired instead.

use crate::object::{Object, ObjectRef};

/// One arena slot
#[derive(Debug)]
struct Slot {
    /// Generation of the current (or next) occupant
    generation: u32,

    /// Occupant, `None` while the slot is on the free list
    object: Option<Object>,
}

/// Heap registry for GC-managed objects
#[derive(Debug, Default)]
pub struct Heap {
    /// Slot arena
    slots: Vec<Slot>,

    /// Indices of vacant slots
    free: Vec<u32>,

    /// Number of occupied slots
    live: usize,
}

impl Heap {
    /// Create an empty heap
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object and return its handle
    ///
    /// # Panics
    ///
    /// Panics if the arena would need more than `u32::MAX` slots.
    pub fn insert(&mut self, object: Object) -> ObjectRef {
        self.live += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.object.is_none(), "free list holds an occupied slot");
            slot.object = Some(object);
            return ObjectRef::new(index, slot.generation);
        }

        let index = match u32::try_from(self.slots.len()) {
            Ok(index) => index,
            Err(_) => panic!("Heap slot space exhausted"),
        };
        self.slots.push(Slot {
            generation: 0,
            object: Some(object),
        });
        ObjectRef::new(index, 0)
    }

    /// Look up an object; `None` for stale handles
    #[inline]
    pub fn get(&self, handle: ObjectRef) -> Option<&Object> {
        let slot = self.slots.get(handle.index())?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.object.as_ref()
    }

    /// Look up an object mutably; `None` for stale handles
    #[inline]
    pub fn get_mut(&mut self, handle: ObjectRef) -> Option<&mut Object> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.object.as_mut()
    }

    /// Check whether a handle still resolves to a live object
    #[inline]
    pub fn contains(&self, handle: ObjectRef) -> bool {
        self.get(handle).is_some()
    }

    /// Number of live objects
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Check if the heap holds no objects
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of arena slots, occupied or not
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of vacant slots waiting for reuse
    #[inline]
    pub fn free_slots(&self) -> usize {
        self.free.len()
    }

    /// Iterate over live objects in slot order
    pub fn iter(&self) -> impl Iterator<Item = (ObjectRef, &Object)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.object
                .as_ref()
                .map(|object| (ObjectRef::new(index as u32, slot.generation), object))
        })
    }

    /// Occupant of slot `index`, regardless of generation (used by sweep)
    #[inline]
    pub(crate) fn object_at_mut(&mut self, index: usize) -> Option<&mut Object> {
        self.slots.get_mut(index)?.object.as_mut()
    }

    /// Free slot `index` and return its occupant (used by sweep)
    ///
    /// A slot whose generation counter is exhausted is retired rather than
    /// put back on the free list, so no handle can ever alias a later
    /// occupant.
    pub(crate) fn release_at(&mut self, index: usize) -> Option<Object> {
        let slot = self.slots.get_mut(index)?;
        let object = slot.object.take()?;
        self.live -= 1;

        match slot.generation.checked_add(1) {
            Some(next) => {
                slot.generation = next;
                self.free.push(index as u32);
            }
            None => log::debug!("retiring heap slot {} (generation exhausted)", index),
        }
        Some(object)
    }
}
