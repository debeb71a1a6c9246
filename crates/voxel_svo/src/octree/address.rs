//! BlockIndex - validated path of octant selectors from the root.
//!
//! The index doubles as the depth of the addressed node: a path of length
//! `d` names a cube of side `2^-d`.

use std::fmt;

use glam::Vec3;
use smallvec::SmallVec;

use super::Cube;
use crate::constants::{INLINE_INDEX_DEPTH, MAX_OCTANT};
use crate::error::{Result, SvoError};

/// Root-to-node path of octant selectors, each in `0..=7`.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct BlockIndex {
  path: SmallVec<[u8; INLINE_INDEX_DEPTH]>,
}

impl BlockIndex {
  /// The empty path, naming the whole tree.
  pub fn root() -> Self {
    Self::default()
  }

  /// Validate a raw selector sequence.
  pub fn new(selectors: &[u8]) -> Result<Self> {
    if let Some((position, &selector)) = selectors
      .iter()
      .enumerate()
      .find(|(_, &s)| s > MAX_OCTANT)
    {
      return Err(SvoError::InvalidIndex { position, selector });
    }
    Ok(Self {
      path: SmallVec::from_slice(selectors),
    })
  }

  /// Index of the depth-`depth` cell containing `point`.
  ///
  /// Returns None when the point lies outside `[0,1)^3`.
  pub fn containing(point: Vec3, depth: usize) -> Option<Self> {
    let mut cube = Cube::UNIT;
    if !cube.contains_point(point) {
      return None;
    }
    let mut index = Self::root();
    for _ in 0..depth {
      let octant = cube.octant_of(point);
      index.push(octant);
      cube = cube.child(octant);
    }
    Some(index)
  }

  #[inline]
  pub fn depth(&self) -> usize {
    self.path.len()
  }

  #[inline]
  pub fn is_root(&self) -> bool {
    self.path.is_empty()
  }

  #[inline]
  pub fn as_slice(&self) -> &[u8] {
    &self.path
  }

  /// Index of one of this node's children.
  pub fn child(&self, octant: u8) -> Self {
    debug_assert!(octant <= MAX_OCTANT, "octant {} out of range", octant);
    let mut child = self.clone();
    child.path.push(octant);
    child
  }

  /// Index of the enclosing node, None at the root.
  pub fn parent(&self) -> Option<Self> {
    let (_, rest) = self.path.split_last()?;
    Some(Self {
      path: SmallVec::from_slice(rest),
    })
  }

  /// Leading `depth` selectors.
  pub fn prefix(&self, depth: usize) -> Self {
    Self {
      path: SmallVec::from_slice(&self.path[..depth.min(self.path.len())]),
    }
  }

  /// Whether `self` names `other` or one of its ancestors.
  pub fn is_ancestor_of(&self, other: &BlockIndex) -> bool {
    other.path.starts_with(&self.path)
  }

  pub(crate) fn push(&mut self, octant: u8) {
    debug_assert!(octant <= MAX_OCTANT, "octant {} out of range", octant);
    self.path.push(octant);
  }

  /// Keep only the leading `depth` selectors.
  pub(crate) fn truncate(&mut self, depth: usize) {
    self.path.truncate(depth);
  }

  /// Minimum corner of the addressed cube.
  pub fn origin(&self) -> Vec3 {
    self
      .path
      .iter()
      .enumerate()
      .fold(Vec3::ZERO, |origin, (level, &octant)| {
        origin + octant_offset(octant) * side_length(level + 1)
      })
  }

  /// Side length of the addressed cube.
  #[inline]
  pub fn side(&self) -> f32 {
    side_length(self.depth())
  }

  /// Spatial extent of the addressed cube.
  pub fn bounds(&self) -> Cube {
    Cube::new(self.origin(), self.side())
  }
}

impl TryFrom<&[u8]> for BlockIndex {
  type Error = SvoError;

  fn try_from(selectors: &[u8]) -> Result<Self> {
    Self::new(selectors)
  }
}

impl fmt::Debug for BlockIndex {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "BlockIndex{:?}", self.path.as_slice())
  }
}

impl fmt::Display for BlockIndex {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:?}", self.path.as_slice())
  }
}

/// Per-axis offset of an octant inside its parent, each component 0 or 1.
///
/// Octant bits: X (bit 0), Y (bit 1), Z (bit 2).
#[inline]
pub fn octant_offset(octant: u8) -> Vec3 {
  Vec3::new(
    (octant & 1) as f32,
    ((octant >> 1) & 1) as f32,
    ((octant >> 2) & 1) as f32,
  )
}

/// Octant of a point in parent-local coordinates (`[0,1)` per axis).
#[inline]
pub fn octant_of(local: Vec3) -> u8 {
  (local.x >= 0.5) as u8 | ((local.y >= 0.5) as u8) << 1 | ((local.z >= 0.5) as u8) << 2
}

/// Side length of a cube at `depth`.
#[inline]
pub fn side_length(depth: usize) -> f32 {
  0.5f32.powi(depth as i32)
}

#[cfg(test)]
#[path = "address_test.rs"]
mod address_test;
