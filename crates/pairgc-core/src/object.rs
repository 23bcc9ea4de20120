//! Heap object model
//!
//! Every heap object is either a scalar or a pair. Pairs hold two links to
//! other heap objects; since links can be reassigned after construction, the
//! object graph may contain cycles of any length, including self-cycles.

use std::fmt;

/// Handle to an object stored in the [`Heap`](crate::gc::Heap)
///
/// A handle is a slot index plus the generation the slot had when the object
/// was allocated. Freeing the object advances the slot's generation, so a
/// handle to a reclaimed object never resolves to whatever reuses the slot.
/// A slot that has used up all `u32` generations is retired, not reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectRef {
    index: u32,
    generation: u32,
}

impl ObjectRef {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index in the heap arena
    #[inline]
    pub fn index(&self) -> usize {
        self.index as usize
    }

    /// Slot generation this handle was issued for
    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.index, self.generation)
    }
}

/// Object kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Integer leaf
    Scalar,
    /// Two links to other objects
    Pair,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Scalar => f.pad("scalar"),
            ObjectKind::Pair => f.pad("pair"),
        }
    }
}

/// Object contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Integer value
    Scalar(i32),

    /// Links to two other heap objects
    Pair {
        /// First (left) link
        first: ObjectRef,
        /// Second (right) link
        second: ObjectRef,
    },
}

impl Payload {
    /// Kind tag of this payload
    #[inline]
    pub fn kind(&self) -> ObjectKind {
        match self {
            Payload::Scalar(_) => ObjectKind::Scalar,
            Payload::Pair { .. } => ObjectKind::Pair,
        }
    }
}

/// A heap object: payload plus the collector's mark bit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    /// Mark bit (true = reached during the current cycle)
    marked: bool,

    payload: Payload,
}

impl Object {
    /// Create an unmarked object
    pub fn new(payload: Payload) -> Self {
        Self {
            marked: false,
            payload,
        }
    }

    /// Create a scalar object
    pub fn scalar(value: i32) -> Self {
        Self::new(Payload::Scalar(value))
    }

    /// Create a pair object
    pub fn pair(first: ObjectRef, second: ObjectRef) -> Self {
        Self::new(Payload::Pair { first, second })
    }

    /// Kind tag
    #[inline]
    pub fn kind(&self) -> ObjectKind {
        self.payload.kind()
    }

    /// Object contents
    #[inline]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Scalar value, if this is a scalar
    #[inline]
    pub fn as_scalar(&self) -> Option<i32> {
        match self.payload {
            Payload::Scalar(value) => Some(value),
            Payload::Pair { .. } => None,
        }
    }

    /// Both links, if this is a pair
    #[inline]
    pub fn as_pair(&self) -> Option<(ObjectRef, ObjectRef)> {
        match self.payload {
            Payload::Pair { first, second } => Some((first, second)),
            Payload::Scalar(_) => None,
        }
    }

    /// First link, if this is a pair
    #[inline]
    pub fn first(&self) -> Option<ObjectRef> {
        self.as_pair().map(|(first, _)| first)
    }

    /// Second link, if this is a pair
    #[inline]
    pub fn second(&self) -> Option<ObjectRef> {
        self.as_pair().map(|(_, second)| second)
    }

    /// Outgoing links (empty for scalars)
    pub fn references(&self) -> impl Iterator<Item = ObjectRef> {
        self.as_pair()
            .into_iter()
            .flat_map(|(first, second)| [first, second])
    }

    /// Reassign the first link. Returns false for scalars.
    pub(crate) fn set_first(&mut self, target: ObjectRef) -> bool {
        match &mut self.payload {
            Payload::Pair { first, .. } => {
                *first = target;
                true
            }
            Payload::Scalar(_) => false,
        }
    }

    /// Reassign the second link. Returns false for scalars.
    pub(crate) fn set_second(&mut self, target: ObjectRef) -> bool {
        match &mut self.payload {
            Payload::Pair { second, .. } => {
                *second = target;
                true
            }
            Payload::Scalar(_) => false,
        }
    }

    /// Check if this object is marked
    #[inline]
    pub fn is_marked(&self) -> bool {
        self.marked
    }

    /// Mark this object as reachable
    ///
    /// Returns false if it was already marked.
    #[inline]
    pub(crate) fn mark(&mut self) -> bool {
        !std::mem::replace(&mut self.marked, true)
    }

    /// Unmark this object (for next GC cycle)
    #[inline]
    pub(crate) fn unmark(&mut self) {
        self.marked = false;
    }
}
