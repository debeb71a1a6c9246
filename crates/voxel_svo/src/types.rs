//! Core value types for the sparse voxel octree.

use glam::Vec3;

use crate::octree::{BlockIndex, Cube};

/// Voxel tag stored at every leaf.
///
/// `0` is reserved for air: air leaves take part in the tree structure and
/// in ray traversal as empty space, but are never reported to observers.
/// Every other value is opaque to the octree.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, PartialOrd, Ord)]
pub struct VoxelType(pub i32);

impl VoxelType {
  /// Empty space.
  pub const AIR: Self = Self(0);

  #[inline]
  pub const fn new(raw: i32) -> Self {
    Self(raw)
  }

  #[inline]
  pub const fn raw(self) -> i32 {
    self.0
  }

  #[inline]
  pub const fn is_air(self) -> bool {
    self.0 == 0
  }

  /// Non-air voxels are drawable and get reported to observers.
  #[inline]
  pub const fn is_solid(self) -> bool {
    self.0 != 0
  }
}

impl From<i32> for VoxelType {
  fn from(raw: i32) -> Self {
    Self(raw)
  }
}

/// Host-assigned token returned from `on_leaf_created`.
///
/// The octree never interprets it; it is stored on the leaf and handed back
/// verbatim to `on_leaf_removed`.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ExternalId(pub u64);

/// A leaf as seen by enumeration visitors and point queries.
#[derive(Clone, Debug, PartialEq)]
pub struct LeafInfo {
  /// Path from the root to this leaf.
  pub index: BlockIndex,
  /// Minimum corner of the leaf.
  pub origin: Vec3,
  /// Depth in the tree (side length `2^-depth`).
  pub depth: usize,
  /// Stored voxel type.
  pub voxel: VoxelType,
}

impl LeafInfo {
  pub(crate) fn new(index: BlockIndex, voxel: VoxelType) -> Self {
    Self {
      origin: index.origin(),
      depth: index.depth(),
      index,
      voxel,
    }
  }

  /// Side length of the leaf cube.
  #[inline]
  pub fn side(&self) -> f32 {
    crate::octree::side_length(self.depth)
  }

  /// Spatial extent of the leaf.
  #[inline]
  pub fn bounds(&self) -> Cube {
    Cube::new(self.origin, self.side())
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
