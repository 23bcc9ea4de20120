//! Sweep phase
//!
//! One linear pass over the heap arena: unmarked objects are freed and their
//! slots returned to the free list, marked objects have their mark bit
//! cleared for the next cycle. The pass allocates nothing.

use super::heap::Heap;

/// Free every unmarked object and unmark the survivors
///
/// Returns the number of objects freed.
pub fn sweep(heap: &mut Heap) -> usize {
    let mut freed = 0;

    for index in 0..heap.slot_count() {
        let Some(object) = heap.object_at_mut(index) else {
            continue;
        };

        if object.is_marked() {
            object.unmark();
        } else {
            heap.release_at(index);
            freed += 1;
        }
    }

    freed
}
