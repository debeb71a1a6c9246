//! Octree module: recursive node storage, block addressing and traversal.
//!
//! The tree always covers the unit cube `[0,1)^3`. Node extents are never
//! stored; they follow from the path taken from the root.
//!
//! # Octant Convention
//!
//! ```text
//! octant = (+x half) | (+y half) << 1 | (+z half) << 2
//! side   = 2^-depth
//! ```
//!
//! # Module Structure
//!
//! - [`address`]: `BlockIndex` - validated root-to-node octant path
//! - [`bounds`]: `Cube` - cubic extent with slab ray intersection
//! - [`node`]: `Node` - leaf / branch storage owning its children
//! - [`config`]: `SvoConfig` - default voxel, depth limit, ray tuning
//! - [`set_block`]: addressing with on-demand subdivision
//! - [`cast_ray`]: nearest-first ray traversal
//! - [`leaves`]: leaf enumeration and point queries

pub mod address;
pub mod bounds;
pub mod cast_ray;
pub mod config;
pub mod leaves;
pub mod node;
pub mod set_block;

// Re-exports
pub use address::{octant_of, octant_offset, side_length, BlockIndex};
pub use bounds::Cube;
pub use cast_ray::{Ray, RayHit};
pub use config::{RayConfig, SvoConfig};
pub use node::Node;
pub use set_block::{LeafChanges, PendingLeaf};

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;
