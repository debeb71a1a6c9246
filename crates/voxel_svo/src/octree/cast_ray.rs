//! Nearest-first ray traversal.
//!
//! The traversal descends from the root, intersecting each child cube with
//! the ray and visiting children in increasing entry distance. Children of
//! a cube are disjoint, so the first solid leaf reached in that order holds
//! the nearest hit.
//!
//! Cubes are half-open for rays too: a ray running in a plane shared by two
//! children belongs to the child whose min face lies in that plane, and a
//! ray that only touches an edge or corner passes no cube at all. Children
//! entered at the same distance are visited in octant order.
//!
//! ```text
//!   origin ──► t_near ──[ air ]──[ air ]──[ SOLID ]  → hit at its t_enter
//! ```

use glam::Vec3;
use smallvec::SmallVec;

use super::{BlockIndex, Cube, Node, RayConfig};
use crate::constants::OCTANT_COUNT;
use crate::error::{Result, SvoError};
use crate::types::VoxelType;

/// A validated ray with a unit direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
  pub origin: Vec3,
  /// Unit direction. Components below the parallel epsilon are exactly 0.
  pub direction: Vec3,
  /// Per-axis reciprocal of `direction` (infinite on parallel axes).
  pub inv_direction: Vec3,
}

impl Ray {
  /// Validate and normalize a ray.
  ///
  /// Fails with `InvalidRay` for a zero-length or non-finite direction, or a
  /// non-finite origin.
  pub fn new(origin: Vec3, direction: Vec3, config: &RayConfig) -> Result<Self> {
    if !origin.is_finite() || !direction.is_finite() {
      return Err(SvoError::InvalidRay);
    }
    let direction = direction.try_normalize().ok_or(SvoError::InvalidRay)?;
    let epsilon = config.parallel_epsilon;
    let direction = Vec3::select(direction.abs().cmplt(Vec3::splat(epsilon)), Vec3::ZERO, direction);
    if direction == Vec3::ZERO {
      return Err(SvoError::InvalidRay);
    }
    Ok(Self {
      origin,
      direction,
      inv_direction: direction.recip(),
    })
  }

  /// Point at parameter `t`.
  #[inline]
  pub fn at(&self, t: f32) -> Vec3 {
    self.origin + self.direction * t
  }
}

/// First solid leaf along a ray.
#[derive(Clone, Debug, PartialEq)]
pub struct RayHit {
  /// Point where the ray enters the leaf (the origin if it starts inside).
  pub position: Vec3,
  /// Distance from the origin to `position`.
  pub distance: f32,
  /// Address of the hit leaf.
  pub index: BlockIndex,
  /// Type of the hit leaf.
  pub voxel: VoxelType,
}

impl RayHit {
  /// Depth of the hit leaf.
  #[inline]
  pub fn depth(&self) -> usize {
    self.index.depth()
  }
}

/// Cast a ray through the subtree rooted at `root`, which covers the unit
/// cube.
///
/// Depth-first with an explicit stack, so deep trees cannot exhaust the
/// call stack.
pub fn cast(root: &Node, ray: &Ray, max_distance: f32) -> Option<RayHit> {
  let (near, far) = Cube::UNIT.ray_interval(ray)?;
  let enter = near.max(0.0);
  if enter >= far || enter > max_distance {
    return None;
  }

  let mut path = BlockIndex::root();
  let mut stack = vec![Visit {
    node: root,
    cube: Cube::UNIT,
    enter,
    depth: 0,
    octant: 0,
  }];
  while let Some(visit) = stack.pop() {
    if visit.depth > 0 {
      path.truncate(visit.depth - 1);
      path.push(visit.octant);
    }
    match visit.node {
      Node::Leaf { voxel, .. } => {
        if voxel.is_solid() {
          return Some(RayHit {
            position: ray.at(visit.enter),
            distance: visit.enter,
            index: path,
            voxel: *voxel,
          });
        }
      }
      Node::Branch(children) => {
        // (entry distance, octant) of every child the ray passes through
        let mut order: SmallVec<[(f32, u8); OCTANT_COUNT]> = SmallVec::new();
        for octant in 0..OCTANT_COUNT as u8 {
          let Some((near, far)) = visit.cube.child(octant).ray_interval(ray) else {
            continue;
          };
          let child_enter = near.max(0.0);
          if child_enter < far && child_enter <= max_distance {
            order.push((child_enter, octant));
          }
        }
        order.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        // Farthest pushed first, nearest explored next
        for &(child_enter, octant) in order.iter().rev() {
          stack.push(Visit {
            node: &children[octant as usize],
            cube: visit.cube.child(octant),
            enter: child_enter,
            depth: visit.depth + 1,
            octant,
          });
        }
      }
    }
  }
  None
}

/// Pending subtree on the traversal stack.
struct Visit<'a> {
  node: &'a Node,
  cube: Cube,
  enter: f32,
  depth: usize,
  /// Octant within the parent, unused at the root.
  octant: u8,
}

#[cfg(test)]
#[path = "cast_ray_test.rs"]
mod cast_ray_test;
