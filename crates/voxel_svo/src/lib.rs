//! voxel_svo - Framework/engine independent sparse voxel octree
//!
//! This crate provides a sparse voxel octree over the unit cube `[0,1)^3`.
//! Every leaf stores a [`VoxelType`]; type `0` is air. Hosts address blocks
//! by octant paths, cast rays against the solid leaves, and observe leaf
//! creation/removal to materialize render proxies.
//!
//! # Features
//!
//! - **Block addressing**: octant paths with on-demand subdivision that keeps
//!   the content of split leaves intact
//! - **Ray casting**: nearest-first traversal returning the entry point into
//!   the first solid leaf
//! - **Leaf lifecycle**: synchronous `on_leaf_created` / `on_leaf_removed`
//!   notifications with host-assigned ids
//! - **Handles**: [`SvoRegistry`] for hosts that can only hold integer handles
//! - **Height maps**: build a tree from a square grayscale image
//!
//! # Example
//!
//! ```ignore
//! use voxel_svo::{lifecycle_fns, ExternalId, Svo, VoxelType};
//!
//! let mut svo = Svo::new(VoxelType::AIR);
//! let mut next = 0;
//! svo.register_lifecycle(lifecycle_fns(
//!     move |origin, depth, voxel| {
//!         next += 1;
//!         println!("spawn {voxel:?} at {origin} (depth {depth})");
//!         ExternalId(next)
//!     },
//!     |id| println!("despawn {id:?}"),
//! ))?;
//!
//! svo.set_block(&[7, 0], 3)?;
//! let hit = svo.cast_ray(glam::Vec3::new(0.6, 0.6, 2.0), glam::Vec3::NEG_Z)?;
//! svo.destroy()?;
//! ```

pub mod constants;
pub mod error;
pub mod types;

// Re-export commonly used items
pub use error::{Result, SvoError};
pub use types::{ExternalId, LeafInfo, VoxelType};

// Octree storage, addressing and traversal
pub mod octree;
pub use octree::{BlockIndex, Cube, LeafChanges, Node, Ray, RayConfig, RayHit, SvoConfig};

// Leaf lifecycle observers
pub mod observer;
pub use observer::{lifecycle_fns, LeafObserver, LifecycleCallbacks, NullObserver, ObserverError};

// Tree type tying storage and observers together
pub mod svo;
pub use svo::Svo;

// Handle table for multi-tree hosts
pub mod world;
pub use world::{SvoRegistry, TreeHandle};

// Procedural tree construction
pub mod generator;
pub use generator::HeightMap;

// Engine-agnostic metrics
pub mod metrics;
