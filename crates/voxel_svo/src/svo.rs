//! Svo - a sparse voxel octree with an optional lifecycle observer.
//!
//! # Notification protocol
//!
//! Every mutation first finishes its structural work, then delivers the
//! resulting [`LeafChanges`]: all removals, then all creations. The id a
//! create callback returns is stored on its leaf straight away, so a failing
//! callback never leaves the tree holding an id the host did not hand out.
//! Leaves whose create callback never ran simply carry no id and will never
//! be reported removed.

use glam::Vec3;
use tracing::{debug, trace, warn};
use web_time::Instant;

use crate::error::{Result, SvoError};
use crate::generator::{height_map, HeightMap};
use crate::metrics::{self, TreeMetrics};
use crate::observer::{LeafObserver, ObserverError};
use crate::octree::cast_ray::{self, Ray};
use crate::octree::leaves;
use crate::octree::set_block::{write_block, LeafChanges, PendingLeaf};
use crate::octree::{BlockIndex, Node, RayHit, SvoConfig};
use crate::types::{LeafInfo, VoxelType};

/// Sparse voxel octree over the unit cube.
pub struct Svo {
  config: SvoConfig,
  root: Node,
  observer: Option<Box<dyn LeafObserver>>,
  metrics: TreeMetrics,
}

impl Svo {
  /// Tree whose root is a single leaf of `default_voxel`.
  pub fn new(default_voxel: impl Into<VoxelType>) -> Self {
    Self::from_parts(SvoConfig::new(default_voxel))
  }

  pub fn with_config(config: SvoConfig) -> Result<Self> {
    config.validate()?;
    Ok(Self::from_parts(config))
  }

  fn from_parts(config: SvoConfig) -> Self {
    debug!(default_voxel = config.default_voxel.raw(), max_depth = ?config.max_depth, "Creating tree");
    Self {
      root: Node::leaf(config.default_voxel),
      config,
      observer: None,
      metrics: TreeMetrics::new(),
    }
  }

  /// Build a tree from a height map, at most `depth` levels deep.
  ///
  /// No observer is attached; registering one replays the solid leaves.
  #[cfg_attr(feature = "instrument", tracing::instrument(skip_all, name = "svo::from_height_map"))]
  pub fn from_height_map(config: SvoConfig, map: &HeightMap, depth: usize) -> Result<Self> {
    config.validate()?;
    config.check_depth(depth)?;
    let root = height_map::generate(map, depth);
    debug!(
      width = map.width(),
      height = map.height(),
      depth,
      leaves = root.leaf_count(),
      "Generated tree from height map"
    );
    Ok(Self {
      root,
      config,
      observer: None,
      metrics: TreeMetrics::new(),
    })
  }

  #[inline]
  pub fn config(&self) -> &SvoConfig {
    &self.config
  }

  #[inline]
  pub fn root(&self) -> &Node {
    &self.root
  }

  #[inline]
  pub fn metrics(&self) -> &TreeMetrics {
    &self.metrics
  }

  #[inline]
  pub fn has_observer(&self) -> bool {
    self.observer.is_some()
  }

  // ===========================================================================
  // Mutation
  // ===========================================================================

  /// Write `voxel` at the block addressed by `selectors`.
  ///
  /// Leaves on the path are subdivided, keeping their type in the new
  /// children. The addressed node is replaced with a single leaf even when it
  /// already has that type. Invalid selectors fail before anything changes.
  pub fn set_block(&mut self, selectors: &[u8], voxel: impl Into<VoxelType>) -> Result<()> {
    let index = BlockIndex::new(selectors)?;
    self.set_block_at(&index, voxel.into())
  }

  #[cfg_attr(feature = "instrument", tracing::instrument(skip_all, name = "svo::set_block"))]
  pub fn set_block_at(&mut self, index: &BlockIndex, voxel: VoxelType) -> Result<()> {
    self.config.check_depth(index.depth())?;

    let started = metrics::is_enabled().then(Instant::now);
    let changes = write_block(&mut self.root, index, voxel);
    if let Some(started) = started {
      self
        .metrics
        .record_set_block(&changes, started.elapsed().as_micros() as u64);
    }

    trace!(
      %index,
      voxel = voxel.raw(),
      subdivisions = changes.subdivisions,
      removed = changes.removed.len(),
      created = changes.created.len(),
      "set_block"
    );
    self.deliver(changes)
  }

  // ===========================================================================
  // Queries
  // ===========================================================================

  /// First point where the ray enters a solid leaf.
  pub fn cast_ray(&self, origin: Vec3, direction: Vec3) -> Result<Option<Vec3>> {
    Ok(self.cast_ray_hit(origin, direction)?.map(|hit| hit.position))
  }

  /// Like [`Svo::cast_ray`], with the hit leaf's address and type.
  #[cfg_attr(feature = "instrument", tracing::instrument(skip_all, name = "svo::cast_ray"))]
  pub fn cast_ray_hit(&self, origin: Vec3, direction: Vec3) -> Result<Option<RayHit>> {
    let ray = Ray::new(origin, direction, &self.config.ray)?;
    let hit = cast_ray::cast(&self.root, &ray, self.config.ray.max_distance);
    self.metrics.record_ray_cast(hit.is_some());
    Ok(hit)
  }

  /// Replay the current solid leaves, in octant order.
  pub fn for_each_leaf(&self, visit: impl FnMut(LeafInfo)) {
    leaves::visit_solid_leaves(&self.root, visit);
  }

  /// Visit every leaf, air included.
  pub fn for_each_node_leaf(&self, visit: impl FnMut(LeafInfo)) {
    leaves::visit_leaves(&self.root, visit);
  }

  /// Every leaf, air included.
  pub fn leaves(&self) -> Vec<LeafInfo> {
    leaves::collect_leaves(&self.root)
  }

  pub fn leaf_count(&self) -> usize {
    self.root.leaf_count()
  }

  pub fn solid_leaf_count(&self) -> usize {
    self.root.solid_leaf_count()
  }

  /// Depth of the deepest leaf.
  pub fn depth(&self) -> usize {
    self.root.max_depth()
  }

  /// Leaf containing `point`, None outside `[0,1)^3`.
  pub fn voxel_at(&self, point: Vec3) -> Option<LeafInfo> {
    leaves::leaf_containing(&self.root, point)
  }

  /// Leaf at or above the addressed block, None if the block is split.
  pub fn leaf_at(&self, selectors: &[u8]) -> Result<Option<LeafInfo>> {
    let index = BlockIndex::new(selectors)?;
    Ok(leaves::leaf_covering(&self.root, &index))
  }

  // ===========================================================================
  // Observers
  // ===========================================================================

  /// Attach `observer`, replacing any current one.
  ///
  /// The current observer is first told about the removal of every leaf it
  /// created. The new observer then receives a create for every existing
  /// solid leaf. If the old observer fails it stays attached, though its ids
  /// have been dropped from the tree.
  pub fn register_lifecycle(&mut self, observer: impl LeafObserver + 'static) -> Result<()> {
    self.register_boxed(Box::new(observer))
  }

  pub fn register_boxed(&mut self, observer: Box<dyn LeafObserver>) -> Result<()> {
    if self.observer.is_some() {
      debug!("Replacing lifecycle observer");
      self.release()?;
    }
    self.observer = Some(observer);

    let mut replay = LeafChanges::default();
    leaves::visit_solid_leaves(&self.root, |leaf| {
      replay.created.push(PendingLeaf {
        index: leaf.index,
        voxel: leaf.voxel,
      });
    });
    debug!(leaves = replay.created.len(), "Replaying leaves to new observer");
    self.deliver(replay)
  }

  /// Report every registered leaf as removed, then detach the observer.
  pub fn unregister_lifecycle(&mut self) -> Result<Option<Box<dyn LeafObserver>>> {
    self.release()?;
    Ok(self.observer.take())
  }

  /// Tear the tree down, reporting every registered leaf as removed.
  pub fn destroy(mut self) -> Result<()> {
    debug!(leaves = self.root.leaf_count(), "Destroying tree");
    self.release()
  }

  /// Remove every external id from the tree and report it to the observer.
  fn release(&mut self) -> Result<()> {
    let mut changes = LeafChanges::default();
    self.root.take_external_ids(&mut changes.removed);
    self.deliver(changes)
  }

  fn deliver(&mut self, changes: LeafChanges) -> Result<()> {
    let Some(observer) = self.observer.as_mut() else {
      debug_assert!(changes.removed.is_empty(), "ids stored without an observer");
      return Ok(());
    };
    if changes.is_empty() {
      return Ok(());
    }

    let mut delivered = Delivered::default();
    let result = notify(&mut **observer, &mut self.root, changes, &mut delivered);
    self
      .metrics
      .record_notifications(delivered.created, delivered.removed);
    result.map_err(|err| {
      self.metrics.record_observer_failure();
      debug!(
        error = %err,
        created = delivered.created,
        removed = delivered.removed,
        "Observer failed, notification sequence interrupted"
      );
      SvoError::Observer(err)
    })
  }
}

#[derive(Default)]
struct Delivered {
  created: usize,
  removed: usize,
}

fn notify(
  observer: &mut dyn LeafObserver,
  root: &mut Node,
  changes: LeafChanges,
  delivered: &mut Delivered,
) -> std::result::Result<(), ObserverError> {
  for id in changes.removed {
    observer.on_leaf_removed(id)?;
    delivered.removed += 1;
  }
  for leaf in changes.created {
    let id = observer.on_leaf_created(leaf.index.origin(), leaf.index.depth(), leaf.voxel)?;
    let attached = root.attach_external_id(&leaf.index, id);
    debug_assert!(attached, "created leaf {} missing from tree", leaf.index);
    delivered.created += 1;
  }
  Ok(())
}

impl Drop for Svo {
  fn drop(&mut self) {
    if self.observer.is_none() {
      return;
    }
    if let Err(err) = self.release() {
      warn!(error = %err, "Observer failed while dropping tree");
    }
  }
}

impl std::fmt::Debug for Svo {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Svo")
      .field("config", &self.config)
      .field("leaves", &self.root.leaf_count())
      .field("depth", &self.root.max_depth())
      .field("has_observer", &self.observer.is_some())
      .finish()
  }
}

#[cfg(test)]
#[path = "svo_test.rs"]
mod svo_test;
