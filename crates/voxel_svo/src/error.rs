//! Error type shared by every fallible octree operation.

use thiserror::Error;

use crate::observer::ObserverError;
use crate::world::TreeHandle;

/// Convenience alias used throughout the crate.
pub type Result<T, E = SvoError> = std::result::Result<T, E>;

/// Errors produced by the octree and its handle registry.
///
/// `InvalidIndex`, `IndexTooDeep` and `InvalidRay` are input validation
/// failures raised before any mutation or traversal starts, so the tree is
/// left untouched.
#[derive(Debug, Error)]
pub enum SvoError {
  /// An octant selector outside `0..=7`.
  #[error("invalid octant selector {selector} at position {position} of block index")]
  InvalidIndex {
    /// Position of the offending selector within the index.
    position: usize,
    /// The selector value.
    selector: u8,
  },

  /// The index is deeper than the configured maximum depth.
  #[error("block index depth {depth} exceeds configured maximum {max_depth}")]
  IndexTooDeep { depth: usize, max_depth: usize },

  /// Zero-length or non-finite ray.
  #[error("invalid ray: direction must be finite and non-zero, origin must be finite")]
  InvalidRay,

  /// Operation on a handle that was destroyed or never created.
  #[error("tree handle {0:?} was destroyed or never created")]
  UseAfterDestroy(TreeHandle),

  /// Failure raised by a lifecycle observer, passed through unchanged.
  #[error(transparent)]
  Observer(#[from] ObserverError),

  #[error("invalid configuration: {0}")]
  InvalidConfig(String),

  #[error("height map has {actual} samples, expected {width}x{height}")]
  InvalidHeightMap {
    width: u32,
    height: u32,
    actual: usize,
  },
}

impl SvoError {
  /// True for errors that leave the tree untouched.
  pub fn is_validation(&self) -> bool {
    matches!(
      self,
      SvoError::InvalidIndex { .. } | SvoError::IndexTooDeep { .. } | SvoError::InvalidRay
    )
  }
}
