//! pairgc core runtime
//!
//! This crate provides a toy stack VM together with the tracing garbage
//! collector that manages its heap:
//! - Object model (scalars and pairs)
//! - Slot-arena heap registry with generational handles
//! - Root stack (the VM operand stack doubles as the GC root set)
//! - Mark phase with an explicit worklist
//! - Sweep phase and the heap-growth policy that schedules collections
//!
//! # Example
//!
//! ```
//! use pairgc_core::Vm;
//!
//! let mut vm = Vm::new();
//! vm.push_scalar(1)?;
//! vm.push_scalar(2)?;
//! let pair = vm.push_pair()?;
//!
//! assert_eq!(vm.collect(), 0);
//! assert_eq!(vm.num_allocated(), 3);
//! assert_eq!(vm.display(pair).to_string(), "(1, 2)");
//!
//! vm.pop()?;
//! assert_eq!(vm.collect(), 3);
//! # Ok::<(), pairgc_core::VmError>(())
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod defaults;
pub mod gc;
pub mod inspect;
pub mod object;
pub mod stack;
pub mod vm;

pub use gc::{CollectReason, GarbageCollector, GcStats, Heap, HeapStats};
pub use inspect::{DisplayObject, HeapEntry};
pub use object::{Object, ObjectKind, ObjectRef, Payload};
pub use stack::{RootStack, StackStats};
pub use vm::{Vm, VmOptions};

/// VM execution errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VmError {
    /// Push onto a full root stack
    #[error("Stack overflow (capacity {capacity})")]
    StackOverflow {
        /// Configured root stack capacity
        capacity: usize,
    },

    /// Pop or peek on an empty (or too shallow) root stack
    #[error("Stack underflow")]
    StackUnderflow,

    /// Handle to an object that has already been reclaimed
    #[error("Invalid object reference {0}")]
    InvalidReference(ObjectRef),

    /// Link mutation on an object that is not a pair
    #[error("Object {0} is not a pair")]
    NotAPair(ObjectRef),
}

/// VM execution result
pub type VmResult<T> = Result<T, VmError>;
