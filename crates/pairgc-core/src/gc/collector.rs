//! Mark-sweep garbage collector
//!
//! This module ties the heap, the tracer and the sweep pass together and owns
//! the growth policy: an allocation that finds the live count at or above the
//! threshold runs a full cycle first, and every cycle resets the threshold to
//! twice the number of survivors.

use super::heap::Heap;
use super::reclaimer;
use super::tracer::Tracer;
use crate::defaults::{DEFAULT_GC_THRESHOLD, GC_GROWTH_FACTOR};
use crate::object::{Object, ObjectRef};
use std::fmt;
use std::time::{Duration, Instant};

/// Garbage collector statistics
#[derive(Debug, Clone, Default)]
pub struct GcStats {
    /// Total number of collections
    pub collections: usize,

    /// Collections triggered by the growth threshold
    pub threshold_collections: usize,

    /// Total objects freed
    pub objects_freed: usize,

    /// Total objects allocated
    pub objects_allocated: usize,

    /// Total pause time across all collections
    pub total_pause_time: Duration,

    /// Last collection duration
    pub last_pause_time: Duration,

    /// Average pause time
    pub avg_pause_time: Duration,

    /// Maximum pause time
    pub max_pause_time: Duration,

    /// Objects marked in last collection
    pub last_marked_count: usize,

    /// Objects freed in last collection
    pub last_freed_count: usize,

    /// Live objects after last collection
    pub live_objects: usize,

    /// Highest live object count observed
    pub peak_live_objects: usize,
}

impl GcStats {
    /// Update statistics after a collection
    fn update(
        &mut self,
        reason: CollectReason,
        pause_time: Duration,
        marked: usize,
        freed: usize,
        live_objects: usize,
    ) {
        self.collections += 1;
        if reason == CollectReason::Threshold {
            self.threshold_collections += 1;
        }
        self.objects_freed += freed;
        self.total_pause_time += pause_time;
        self.last_pause_time = pause_time;
        self.avg_pause_time = self.total_pause_time.div_f64(self.collections as f64);
        if pause_time > self.max_pause_time {
            self.max_pause_time = pause_time;
        }

        self.last_marked_count = marked;
        self.last_freed_count = freed;
        self.live_objects = live_objects;
    }

    /// Fraction of objects that survived the last collection (0.0 to 1.0)
    pub fn survival_rate(&self) -> f64 {
        let examined = self.live_objects + self.last_freed_count;
        if examined == 0 {
            return 0.0;
        }
        self.live_objects as f64 / examined as f64
    }
}

/// What started a collection cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectReason {
    /// Allocation found the live count at the threshold
    Threshold,
    /// Requested by the caller
    Explicit,
    /// Final cycle when the VM is torn down
    Teardown,
}

impl fmt::Display for CollectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectReason::Threshold => f.write_str("threshold"),
            CollectReason::Explicit => f.write_str("explicit"),
            CollectReason::Teardown => f.write_str("teardown"),
        }
    }
}

/// Mark-sweep garbage collector
#[derive(Debug)]
pub struct GarbageCollector {
    /// Heap registry
    heap: Heap,

    /// Mark phase worklist
    tracer: Tracer,

    /// Live object count at which the next allocation collects first
    threshold: usize,

    /// Statistics
    stats: GcStats,
}

impl GarbageCollector {
    /// Create a new garbage collector with the default threshold
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_GC_THRESHOLD)
    }

    /// Create a new garbage collector with a specific initial threshold
    pub fn with_threshold(threshold: usize) -> Self {
        Self {
            heap: Heap::new(),
            tracer: Tracer::new(),
            threshold,
            stats: GcStats::default(),
        }
    }

    /// Set GC threshold
    pub fn set_threshold(&mut self, objects: usize) {
        self.threshold = objects;
    }

    /// Current GC threshold
    #[inline]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Number of live objects in the heap
    #[inline]
    pub fn num_allocated(&self) -> usize {
        self.heap.len()
    }

    /// Allocate an object, collecting first if the heap reached the threshold
    ///
    /// `roots` must hold every handle the caller still needs; anything not
    /// reachable from it may be freed before the new object is registered.
    pub fn allocate(&mut self, object: Object, roots: &[ObjectRef]) -> ObjectRef {
        if self.should_collect() {
            self.collect_with_reason(roots, CollectReason::Threshold);
        }

        let kind = object.kind();
        let handle = self.heap.insert(object);
        self.stats.objects_allocated += 1;
        self.stats.peak_live_objects = self.stats.peak_live_objects.max(self.heap.len());
        log::trace!("allocated {} {} ({} live)", kind, handle, self.heap.len());
        handle
    }

    /// Check if we should collect
    #[inline]
    fn should_collect(&self) -> bool {
        self.heap.len() >= self.threshold
    }

    /// Run garbage collection
    ///
    /// Returns the number of objects reclaimed.
    pub fn collect(&mut self, roots: &[ObjectRef]) -> usize {
        self.collect_with_reason(roots, CollectReason::Explicit)
    }

    /// Run a full mark-sweep cycle and reset the threshold
    pub fn collect_with_reason(&mut self, roots: &[ObjectRef], reason: CollectReason) -> usize {
        let start = Instant::now();
        let before = self.heap.len();

        // Mark phase
        let marked = self.tracer.mark_all(&mut self.heap, roots);

        // Sweep phase
        let freed = reclaimer::sweep(&mut self.heap);

        let live = self.heap.len();
        debug_assert_eq!(before - freed, live);
        debug_assert_eq!(marked, live);

        self.threshold = live * GC_GROWTH_FACTOR;

        let duration = start.elapsed();
        self.stats.update(reason, duration, marked, freed, live);

        log::debug!(
            "gc #{} ({}): marked {}, freed {}, {} live, next threshold {}, pause {:?}",
            self.stats.collections,
            reason,
            marked,
            freed,
            live,
            self.threshold,
            duration
        );

        freed
    }

    /// Get GC statistics
    pub fn stats(&self) -> &GcStats {
        &self.stats
    }

    /// Get heap statistics
    pub fn heap_stats(&self) -> HeapStats {
        HeapStats {
            allocation_count: self.heap.len(),
            slot_count: self.heap.slot_count(),
            free_slots: self.heap.free_slots(),
            threshold: self.threshold,
        }
    }

    /// Get read-only access to the heap
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// Get mutable access to the heap
    pub(crate) fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }
}

impl Default for GarbageCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Heap statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapStats {
    /// Number of live objects
    pub allocation_count: usize,

    /// Arena slots, occupied or not
    pub slot_count: usize,

    /// Vacant slots awaiting reuse
    pub free_slots: usize,

    /// GC threshold
    pub threshold: usize,
}
