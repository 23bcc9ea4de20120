//! VM state
//!
//! A [`Vm`] owns its root stack and its garbage collector. There is no global
//! state: every operation goes through an explicit `Vm` value, so independent
//! instances can coexist in one process.

use crate::defaults::{DEFAULT_GC_THRESHOLD, DEFAULT_STACK_MAX};
use crate::gc::{CollectReason, GarbageCollector, GcStats, Heap, HeapStats};
use crate::object::{Object, ObjectRef};
use crate::stack::{RootStack, StackStats};
use crate::{VmError, VmResult};

/// Options for creating a Vm
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmOptions {
    /// Root stack capacity (in slots)
    pub stack_max: usize,

    /// Initial GC threshold (in live objects)
    pub gc_threshold: usize,
}

impl Default for VmOptions {
    fn default() -> Self {
        Self {
            stack_max: DEFAULT_STACK_MAX,
            gc_threshold: DEFAULT_GC_THRESHOLD,
        }
    }
}

/// Which link of a pair to reassign
#[derive(Debug, Clone, Copy)]
enum Link {
    First,
    Second,
}

/// Toy stack VM with a garbage-collected heap
#[derive(Debug)]
pub struct Vm {
    /// Operand stack and root set
    stack: RootStack,

    /// Garbage collector (owns the heap)
    gc: GarbageCollector,
}

impl Vm {
    /// Create a new VM with default options
    pub fn new() -> Self {
        Self::with_options(VmOptions::default())
    }

    /// Create a new VM with specific options
    pub fn with_options(options: VmOptions) -> Self {
        Self {
            stack: RootStack::with_capacity(options.stack_max),
            gc: GarbageCollector::with_threshold(options.gc_threshold),
        }
    }

    // ========================================================================
    // Stack Operations
    // ========================================================================

    /// Allocate a scalar and push it
    ///
    /// # Errors
    ///
    /// Returns `VmError::StackOverflow` if the stack is full. Nothing is
    /// allocated in that case.
    pub fn push_scalar(&mut self, value: i32) -> VmResult<ObjectRef> {
        if self.stack.is_full() {
            return Err(VmError::StackOverflow {
                capacity: self.stack.max_size(),
            });
        }

        let handle = self.gc.allocate(Object::scalar(value), self.stack.as_slice());
        self.stack.push(handle)?;
        Ok(handle)
    }

    /// Replace the top two stack slots with a pair of them
    ///
    /// The top of the stack becomes `second` and the slot below it `first`.
    /// Both operands stay on the stack while the pair is allocated, so a
    /// collection triggered by the allocation keeps them alive.
    ///
    /// # Errors
    ///
    /// Returns `VmError::StackUnderflow` if fewer than two handles are on the
    /// stack. Nothing is allocated or popped in that case.
    pub fn push_pair(&mut self) -> VmResult<ObjectRef> {
        let second = self.stack.peek_n(0)?;
        let first = self.stack.peek_n(1)?;

        let pair = self
            .gc
            .allocate(Object::pair(first, second), self.stack.as_slice());

        self.stack.pop()?;
        self.stack.pop()?;
        self.stack.push(pair)?;
        Ok(pair)
    }

    /// Pop the top handle
    ///
    /// The object stays in the heap until a collection finds it unreachable.
    ///
    /// # Errors
    ///
    /// Returns `VmError::StackUnderflow` if the stack is empty.
    pub fn pop(&mut self) -> VmResult<ObjectRef> {
        self.stack.pop()
    }

    /// Peek at the top handle
    ///
    /// # Errors
    ///
    /// Returns `VmError::StackUnderflow` if the stack is empty.
    pub fn peek(&self) -> VmResult<ObjectRef> {
        self.stack.peek()
    }

    // ========================================================================
    // Graph Mutation
    // ========================================================================

    /// Point the first link of `pair` at `target`
    ///
    /// # Errors
    ///
    /// `InvalidReference` if either handle is stale, `NotAPair` if `pair`
    /// is a scalar.
    pub fn set_first(&mut self, pair: ObjectRef, target: ObjectRef) -> VmResult<()> {
        self.set_link(pair, target, Link::First)
    }

    /// Point the second link of `pair` at `target`
    ///
    /// # Errors
    ///
    /// `InvalidReference` if either handle is stale, `NotAPair` if `pair`
    /// is a scalar.
    pub fn set_second(&mut self, pair: ObjectRef, target: ObjectRef) -> VmResult<()> {
        self.set_link(pair, target, Link::Second)
    }

    fn set_link(&mut self, pair: ObjectRef, target: ObjectRef, link: Link) -> VmResult<()> {
        let heap = self.gc.heap_mut();
        if !heap.contains(target) {
            return Err(VmError::InvalidReference(target));
        }

        let object = heap
            .get_mut(pair)
            .ok_or(VmError::InvalidReference(pair))?;
        let updated = match link {
            Link::First => object.set_first(target),
            Link::Second => object.set_second(target),
        };

        if updated {
            Ok(())
        } else {
            Err(VmError::NotAPair(pair))
        }
    }

    // ========================================================================
    // Collection
    // ========================================================================

    /// Run a full collection cycle
    ///
    /// Returns the number of objects reclaimed.
    pub fn collect(&mut self) -> usize {
        self.gc.collect(self.stack.as_slice())
    }

    /// Tear the VM down
    ///
    /// Empties the root stack and runs a final collection, which frees every
    /// remaining object. Returns the number of objects released.
    pub fn destroy(mut self) -> usize {
        self.stack.clear();
        let released = self
            .gc
            .collect_with_reason(self.stack.as_slice(), CollectReason::Teardown);
        debug_assert_eq!(self.gc.num_allocated(), 0);
        log::trace!(
            "vm destroyed: released {} objects after {} collections",
            released,
            self.gc.stats().collections
        );
        released
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Look up an object; `None` once it has been reclaimed
    pub fn get(&self, handle: ObjectRef) -> Option<&Object> {
        self.gc.heap().get(handle)
    }

    /// Check whether an object is still live
    pub fn contains(&self, handle: ObjectRef) -> bool {
        self.gc.heap().contains(handle)
    }

    /// Number of live objects
    pub fn num_allocated(&self) -> usize {
        self.gc.num_allocated()
    }

    /// Live-object count at which the next allocation collects first
    pub fn threshold(&self) -> usize {
        self.gc.threshold()
    }

    /// Current stack depth
    pub fn stack_depth(&self) -> usize {
        self.stack.depth()
    }

    /// Current roots, bottom of the stack first
    pub fn roots(&self) -> &[ObjectRef] {
        self.stack.as_slice()
    }

    /// Read-only view of the heap
    pub fn heap(&self) -> &Heap {
        self.gc.heap()
    }

    /// Get GC statistics
    pub fn gc_stats(&self) -> &GcStats {
        self.gc.stats()
    }

    /// Get heap statistics
    pub fn heap_stats(&self) -> HeapStats {
        self.gc.heap_stats()
    }

    /// Get stack statistics
    pub fn stack_stats(&self) -> StackStats {
        self.stack.stats()
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}
