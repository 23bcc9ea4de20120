//! Human-readable views of the heap and the root stack
//!
//! Scalars render as their value and pairs as `(first, second)`. A link back
//! to an enclosing pair renders as `...`, as does anything nested deeper
//! than [`MAX_DISPLAY_DEPTH`] or past the first [`MAX_DISPLAY_NODES`]
//! objects of one rendering. Handles that no longer resolve render as
//! `<freed>`.

use crate::defaults::{MAX_DISPLAY_DEPTH, MAX_DISPLAY_NODES};
use crate::gc::Heap;
use crate::object::{ObjectKind, ObjectRef, Payload};
use crate::vm::Vm;
use rustc_hash::FxHashSet;
use std::fmt;

/// `Display` adapter for a heap object
pub struct DisplayObject<'a> {
    heap: &'a Heap,
    handle: ObjectRef,
}

impl<'a> DisplayObject<'a> {
    /// Render `handle` as found in `heap`
    pub fn new(heap: &'a Heap, handle: ObjectRef) -> Self {
        Self { heap, handle }
    }
}

impl fmt::Display for DisplayObject<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut render = Render {
            heap: self.heap,
            enclosing: FxHashSet::default(),
            budget: MAX_DISPLAY_NODES,
        };
        render.write(f, self.handle, 0)
    }
}

/// State for one rendering call
struct Render<'a> {
    heap: &'a Heap,

    /// Pairs currently being printed (back-edges to these are cycles)
    enclosing: FxHashSet<ObjectRef>,

    /// Objects left to print before eliding the rest; shared subgraphs
    /// are printed once per path, so depth alone does not bound the work
    budget: usize,
}

impl Render<'_> {
    fn write(&mut self, f: &mut fmt::Formatter<'_>, handle: ObjectRef, depth: usize) -> fmt::Result {
        if self.budget == 0 {
            return f.write_str("...");
        }
        self.budget -= 1;

        let Some(object) = self.heap.get(handle) else {
            return f.write_str("<freed>");
        };

        match *object.payload() {
            Payload::Scalar(value) => write!(f, "{}", value),
            Payload::Pair { first, second } => {
                if depth >= MAX_DISPLAY_DEPTH || !self.enclosing.insert(handle) {
                    return f.write_str("...");
                }
                f.write_str("(")?;
                self.write(f, first, depth + 1)?;
                f.write_str(", ")?;
                self.write(f, second, depth + 1)?;
                f.write_str(")")?;
                self.enclosing.remove(&handle);
                Ok(())
            }
        }
    }
}

/// One line of a heap listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapEntry {
    /// Object handle
    pub handle: ObjectRef,
    /// Object kind
    pub kind: ObjectKind,
    /// Mark bit at the time of the dump
    pub marked: bool,
    /// Rendered object
    pub rendered: String,
}

impl fmt::Display for HeapEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<10} {:<6} marked={} {}",
            self.handle.to_string(),
            self.kind,
            self.marked,
            self.rendered
        )
    }
}

impl Vm {
    /// Render an object
    pub fn display(&self, handle: ObjectRef) -> DisplayObject<'_> {
        DisplayObject::new(self.heap(), handle)
    }

    /// List every live object in slot order
    pub fn heap_dump(&self) -> Vec<HeapEntry> {
        self.heap()
            .iter()
            .map(|(handle, object)| HeapEntry {
                handle,
                kind: object.kind(),
                marked: object.is_marked(),
                rendered: self.display(handle).to_string(),
            })
            .collect()
    }

    /// Render every root, bottom of the stack first
    pub fn stack_dump(&self) -> Vec<String> {
        self.roots()
            .iter()
            .map(|&root| self.display(root).to_string())
            .collect()
    }
}
