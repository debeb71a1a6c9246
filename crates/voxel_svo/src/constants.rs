//! Octree and ray casting constants.

/// Number of children of a branch node.
pub const OCTANT_COUNT: usize = 8;

/// Largest valid octant selector in a block index.
pub const MAX_OCTANT: u8 = 7;

/// Block index depth stored inline before spilling to the heap.
pub const INLINE_INDEX_DEPTH: usize = 16;

/// Default upper bound on the ray parameter.
pub const DEFAULT_MAX_RAY_DISTANCE: f32 = 100_000.0;

/// Direction components below this magnitude are treated as parallel to the
/// corresponding axis planes.
pub const DEFAULT_PARALLEL_EPSILON: f32 = 1e-7;

/// Height-map levels at or above this depth are built in parallel.
pub const PARALLEL_BUILD_DEPTH: usize = 4;

/// Library version packed as 0xMMmmpp (major.minor.patch).
pub const VERSION_PACKED: u32 = 0x000100;

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
