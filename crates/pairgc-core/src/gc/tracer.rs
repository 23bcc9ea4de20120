//! Mark phase
//!
//! The tracer walks the object graph from the roots using an explicit gray
//! stack rather than recursion, so the depth of the live graph is bounded by
//! heap memory instead of the host call stack. An object is pushed at most
//! once per cycle after it is marked; the mark bit doubles as the visited set
//! and terminates traversal of cycles.

use super::heap::Heap;
use crate::object::ObjectRef;

/// Worklist-driven marker
#[derive(Debug, Default)]
pub struct Tracer {
    /// Marked objects whose links have not been scanned yet
    gray: Vec<ObjectRef>,
}

impl Tracer {
    /// Create a tracer with an empty worklist
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark everything reachable from `roots`
    ///
    /// Returns the number of objects newly marked.
    pub fn mark_all(&mut self, heap: &mut Heap, roots: &[ObjectRef]) -> usize {
        roots.iter().map(|&root| self.mark(heap, root)).sum()
    }

    /// Mark everything reachable from a single object
    ///
    /// Returns the number of objects newly marked. Objects that are already
    /// marked, and handles that no longer resolve, are skipped.
    pub fn mark(&mut self, heap: &mut Heap, root: ObjectRef) -> usize {
        let mut marked = 0;

        if Self::shade(heap, root) {
            marked += 1;
            self.gray.push(root);
        }

        while let Some(handle) = self.gray.pop() {
            let Some((first, second)) = heap.get(handle).and_then(|object| object.as_pair()) else {
                continue;
            };

            for child in [second, first] {
                if Self::shade(heap, child) {
                    marked += 1;
                    self.gray.push(child);
                }
            }
        }

        marked
    }

    /// Set the mark bit; true if the object was live and not yet marked
    #[inline]
    fn shade(heap: &mut Heap, handle: ObjectRef) -> bool {
        heap.get_mut(handle).is_some_and(|object| object.mark())
    }

    /// Capacity retained by the worklist between cycles
    pub fn worklist_capacity(&self) -> usize {
        self.gray.capacity()
    }
}
