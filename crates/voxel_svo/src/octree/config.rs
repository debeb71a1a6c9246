//! Tree configuration.

use crate::constants::{DEFAULT_MAX_RAY_DISTANCE, DEFAULT_PARALLEL_EPSILON};
use crate::error::{Result, SvoError};
use crate::types::VoxelType;

/// Ray traversal tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayConfig {
  /// Hits farther than this from the ray origin are ignored.
  pub max_distance: f32,
  /// Direction components with a smaller magnitude are treated as zero.
  pub parallel_epsilon: f32,
}

impl Default for RayConfig {
  fn default() -> Self {
    Self {
      max_distance: DEFAULT_MAX_RAY_DISTANCE,
      parallel_epsilon: DEFAULT_PARALLEL_EPSILON,
    }
  }
}

/// Configuration for a single tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SvoConfig {
  /// Type of the root leaf at creation.
  pub default_voxel: VoxelType,
  /// Deepest index `set_block` accepts. None means unbounded.
  ///
  /// Storage and traversal handle any depth, but positions are `f32`: past
  /// depth 24 neighbouring leaves share origins, and past depth 149 the
  /// side length is 0. Hosts that report positions should stay shallower.
  pub max_depth: Option<usize>,
  pub ray: RayConfig,
}

impl Default for SvoConfig {
  fn default() -> Self {
    Self {
      default_voxel: VoxelType::AIR,
      max_depth: None,
      ray: RayConfig::default(),
    }
  }
}

impl SvoConfig {
  pub fn new(default_voxel: impl Into<VoxelType>) -> Self {
    Self {
      default_voxel: default_voxel.into(),
      ..Self::default()
    }
  }

  pub fn with_max_depth(mut self, max_depth: usize) -> Self {
    self.max_depth = Some(max_depth);
    self
  }

  pub fn with_ray(mut self, ray: RayConfig) -> Self {
    self.ray = ray;
    self
  }

  /// Reject configurations no tree can run with.
  pub fn validate(&self) -> Result<()> {
    let ray = &self.ray;
    if ray.max_distance.is_nan() || ray.max_distance <= 0.0 {
      return Err(SvoError::InvalidConfig(format!(
        "ray.max_distance must be positive, got {}",
        ray.max_distance
      )));
    }
    if !ray.parallel_epsilon.is_finite() || ray.parallel_epsilon < 0.0 {
      return Err(SvoError::InvalidConfig(format!(
        "ray.parallel_epsilon must be finite and non-negative, got {}",
        ray.parallel_epsilon
      )));
    }
    Ok(())
  }

  /// Fail with `IndexTooDeep` when `depth` exceeds the configured limit.
  pub fn check_depth(&self, depth: usize) -> Result<()> {
    match self.max_depth {
      Some(max_depth) if depth > max_depth => Err(SvoError::IndexTooDeep { depth, max_depth }),
      _ => Ok(()),
    }
  }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
