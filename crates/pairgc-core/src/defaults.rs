//! Default constants for VM configuration.

/// Default root stack capacity (in slots).
pub const DEFAULT_STACK_MAX: usize = 256;

/// Default live-object count at which the first allocation-triggered
/// collection runs.
pub const DEFAULT_GC_THRESHOLD: usize = 8;

/// Growth factor applied to the survivor count after every collection.
pub const GC_GROWTH_FACTOR: usize = 2;

/// Nesting depth after which object rendering elides the remainder as `...`.
pub const MAX_DISPLAY_DEPTH: usize = 64;

/// Objects printed by one rendering before the remainder is elided as `...`.
pub const MAX_DISPLAY_NODES: usize = 1024;
