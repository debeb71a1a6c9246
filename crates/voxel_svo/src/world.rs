//! SvoRegistry - handle table for hosts that only hold integer handles.
//!
//! Rust callers can own [`Svo`] values directly. Hosts across a language
//! boundary instead get a [`TreeHandle`], and every operation looks the tree
//! up again. A destroyed handle is never reused, so a stale handle is
//! reported as [`SvoError::UseAfterDestroy`] instead of reaching another
//! tree.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec3;
use tracing::debug;

use crate::error::{Result, SvoError};
use crate::observer::LeafObserver;
use crate::octree::SvoConfig;
use crate::svo::Svo;
use crate::types::{LeafInfo, VoxelType};

// =============================================================================
// TreeHandle - unique identifier
// =============================================================================

/// Atomic counter for generating unique TreeHandles.
static TREE_HANDLE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque tree identifier.
///
/// Generated atomically - guaranteed unique within process lifetime.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TreeHandle(u64);

impl TreeHandle {
    fn next() -> Self {
        Self(TREE_HANDLE_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw handle value.
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Rebuild a handle received from a host. Lookups fail unless the value
    /// came from [`TreeHandle::raw`] on a live handle.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

// =============================================================================
// SvoRegistry - handle to tree mapping
// =============================================================================

/// Trees addressed by handle.
#[derive(Default)]
pub struct SvoRegistry {
    trees: HashMap<TreeHandle, Svo>,
}

impl SvoRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tree whose root is a leaf of `default_voxel`.
    pub fn create(&mut self, default_voxel: impl Into<VoxelType>) -> TreeHandle {
        self.insert(Svo::new(default_voxel))
    }

    pub fn create_with_config(&mut self, config: SvoConfig) -> Result<TreeHandle> {
        Ok(self.insert(Svo::with_config(config)?))
    }

    /// Take ownership of an existing tree.
    pub fn insert(&mut self, svo: Svo) -> TreeHandle {
        let handle = TreeHandle::next();
        debug!(handle = handle.raw(), "Registered tree");
        self.trees.insert(handle, svo);
        handle
    }

    /// Destroy the tree, reporting its registered leaves as removed.
    ///
    /// A second destroy of the same handle fails with `UseAfterDestroy`.
    pub fn destroy(&mut self, handle: TreeHandle) -> Result<()> {
        let svo = self
            .trees
            .remove(&handle)
            .ok_or(SvoError::UseAfterDestroy(handle))?;
        debug!(handle = handle.raw(), "Destroying tree");
        svo.destroy()
    }

    /// Remove the tree from the registry without destroying it.
    pub fn take(&mut self, handle: TreeHandle) -> Result<Svo> {
        self.trees
            .remove(&handle)
            .ok_or(SvoError::UseAfterDestroy(handle))
    }

    pub fn get(&self, handle: TreeHandle) -> Result<&Svo> {
        self.trees
            .get(&handle)
            .ok_or(SvoError::UseAfterDestroy(handle))
    }

    pub fn get_mut(&mut self, handle: TreeHandle) -> Result<&mut Svo> {
        self.trees
            .get_mut(&handle)
            .ok_or(SvoError::UseAfterDestroy(handle))
    }

    pub fn contains(&self, handle: TreeHandle) -> bool {
        self.trees.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    // =========================================================================
    // Per-tree operations
    // =========================================================================

    pub fn set_block(
        &mut self,
        handle: TreeHandle,
        selectors: &[u8],
        voxel: impl Into<VoxelType>,
    ) -> Result<()> {
        self.get_mut(handle)?.set_block(selectors, voxel)
    }

    pub fn cast_ray(&self, handle: TreeHandle, origin: Vec3, direction: Vec3) -> Result<Option<Vec3>> {
        self.get(handle)?.cast_ray(origin, direction)
    }

    pub fn register_lifecycle(
        &mut self,
        handle: TreeHandle,
        observer: impl LeafObserver + 'static,
    ) -> Result<()> {
        self.get_mut(handle)?.register_lifecycle(observer)
    }

    pub fn unregister_lifecycle(&mut self, handle: TreeHandle) -> Result<Option<Box<dyn LeafObserver>>> {
        self.get_mut(handle)?.unregister_lifecycle()
    }

    pub fn for_each_leaf(&self, handle: TreeHandle, visit: impl FnMut(LeafInfo)) -> Result<()> {
        self.get(handle)?.for_each_leaf(visit);
        Ok(())
    }
}
