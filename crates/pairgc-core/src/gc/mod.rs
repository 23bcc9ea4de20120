//! Garbage collection system
//!
//! This module provides a stop-the-world, non-moving mark-sweep collector.
//!
//! # Architecture
//!
//! - **Heap**: slot arena that owns every object; handles are
//!   `(index, generation)` pairs
//! - **Tracer**: mark phase, driven by an explicit gray stack
//! - **Reclaimer**: sweep phase, one linear pass over the arena
//! - **GarbageCollector**: allocation entry point and growth policy
//!
//! # Cycle
//!
//! ```text
//! allocate ──(live >= threshold)──► mark_all(roots) ──► sweep ──► threshold = 2 × live
//! ```

mod collector;
mod heap;
pub mod reclaimer;
mod tracer;

pub use collector::{CollectReason, GarbageCollector, GcStats, HeapStats};
pub use heap::Heap;
pub use tracer::Tracer;
