//! Root stack
//!
//! The VM's operand stack. Every occupied slot is also a GC root: an object
//! stays alive for as long as some slot refers to it, directly or through a
//! chain of pair links.
//!
//! # Memory Layout
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │ (free)                              │  ← max_size
//! │ ...                                 │
//! ├─────────────────────────────────────┤  ← sp (stack pointer)
//! │ ref₂                                │
//! │ ref₁                                │
//! │ ref₀                                │
//! └─────────────────────────────────────┘
//! ```

use crate::defaults::DEFAULT_STACK_MAX;
use crate::object::ObjectRef;
use crate::{VmError, VmResult};

/// Bounded LIFO of object handles
#[derive(Debug, Clone)]
pub struct RootStack {
    /// Occupied slots, bottom first
    slots: Vec<ObjectRef>,

    /// Maximum stack size (in slots)
    max_size: usize,
}

impl RootStack {
    /// Create a new stack with default size
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_STACK_MAX)
    }

    /// Create a stack with specific capacity
    pub fn with_capacity(max_size: usize) -> Self {
        Self {
            slots: Vec::with_capacity(max_size.min(DEFAULT_STACK_MAX)),
            max_size,
        }
    }

    /// Push a handle onto the stack
    ///
    /// # Errors
    ///
    /// Returns `VmError::StackOverflow` if the stack is full.
    #[inline]
    pub fn push(&mut self, value: ObjectRef) -> VmResult<()> {
        if self.is_full() {
            return Err(VmError::StackOverflow {
                capacity: self.max_size,
            });
        }

        self.slots.push(value);
        Ok(())
    }

    /// Pop a handle from the stack
    ///
    /// # Errors
    ///
    /// Returns `VmError::StackUnderflow` if the stack is empty.
    #[inline]
    pub fn pop(&mut self) -> VmResult<ObjectRef> {
        self.slots.pop().ok_or(VmError::StackUnderflow)
    }

    /// Peek at the top handle without popping
    ///
    /// # Errors
    ///
    /// Returns `VmError::StackUnderflow` if the stack is empty.
    #[inline]
    pub fn peek(&self) -> VmResult<ObjectRef> {
        self.peek_n(0)
    }

    /// Peek at the handle N slots from the top (0 = top)
    ///
    /// # Errors
    ///
    /// Returns `VmError::StackUnderflow` if not enough handles on the stack.
    #[inline]
    pub fn peek_n(&self, n: usize) -> VmResult<ObjectRef> {
        let depth = self.slots.len();
        if depth <= n {
            return Err(VmError::StackUnderflow);
        }

        Ok(self.slots[depth - 1 - n])
    }

    /// Drop every slot, leaving nothing rooted
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Get current stack depth
    #[inline]
    pub fn depth(&self) -> usize {
        self.slots.len()
    }

    /// Check if stack is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Check if another push would overflow
    #[inline]
    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.max_size
    }

    /// Get maximum stack size
    #[inline]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    // ========================================================================
    // GC Root Integration
    // ========================================================================

    /// Get all stack handles as a slice, bottom first (the GC root set)
    pub fn as_slice(&self) -> &[ObjectRef] {
        &self.slots
    }

    /// Get stack statistics
    pub fn stats(&self) -> StackStats {
        StackStats {
            depth: self.slots.len(),
            max_size: self.max_size,
            utilization: if self.max_size > 0 {
                (self.slots.len() as f64 / self.max_size as f64) * 100.0
            } else {
                0.0
            },
        }
    }
}

impl Default for RootStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Stack statistics
#[derive(Debug, Clone)]
pub struct StackStats {
    /// Current stack depth
    pub depth: usize,

    /// Maximum allowed size
    pub max_size: usize,

    /// Stack utilization percentage (0-100)
    pub utilization: f64,
}

// ============================================================================
// Tests
// ============================================================================
