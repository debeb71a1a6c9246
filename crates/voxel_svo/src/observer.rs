//! LeafObserver - lifecycle callbacks for hosts that mirror the leaf set.
//!
//! A renderer typically spawns one proxy object per solid leaf. The tree
//! tells it when a leaf appears (`on_leaf_created`, which returns the
//! host's id for the proxy) and hands that id back exactly once when the
//! leaf goes away (`on_leaf_removed`).
//!
//! Callbacks run synchronously inside the mutating call. For one mutation,
//! every removal is delivered before any creation.

use std::error::Error;

use glam::Vec3;

use crate::types::{ExternalId, VoxelType};

/// Error raised by a host callback. Passed through to the caller unchanged.
pub type ObserverError = Box<dyn Error + Send + Sync + 'static>;

/// Callback interface for leaf lifecycle events.
///
/// # Example
///
/// ```ignore
/// struct Proxies { scene: Scene }
///
/// impl LeafObserver for Proxies {
///     fn on_leaf_created(&mut self, origin: Vec3, depth: usize, voxel: VoxelType)
///         -> Result<ExternalId, ObserverError> {
///         Ok(ExternalId(self.scene.spawn_cube(origin, 0.5f32.powi(depth as i32), voxel)?))
///     }
///
///     fn on_leaf_removed(&mut self, id: ExternalId) -> Result<(), ObserverError> {
///         self.scene.despawn(id.0)?;
///         Ok(())
///     }
/// }
/// ```
pub trait LeafObserver: Send {
  /// A solid leaf now exists.
  ///
  /// # Arguments
  /// - `origin`: minimum corner of the leaf
  /// - `depth`: tree depth, the side length is `2^-depth`
  /// - `voxel`: stored type, never air
  fn on_leaf_created(
    &mut self,
    origin: Vec3,
    depth: usize,
    voxel: VoxelType,
  ) -> Result<ExternalId, ObserverError>;

  /// The leaf that was assigned `id` no longer exists.
  fn on_leaf_removed(&mut self, id: ExternalId) -> Result<(), ObserverError>;
}

impl<T: LeafObserver + ?Sized> LeafObserver for Box<T> {
  fn on_leaf_created(
    &mut self,
    origin: Vec3,
    depth: usize,
    voxel: VoxelType,
  ) -> Result<ExternalId, ObserverError> {
    (**self).on_leaf_created(origin, depth, voxel)
  }

  fn on_leaf_removed(&mut self, id: ExternalId) -> Result<(), ObserverError> {
    (**self).on_leaf_removed(id)
  }
}

/// No-op observer for headless operation. Every leaf gets id 0.
pub struct NullObserver;

impl LeafObserver for NullObserver {
  fn on_leaf_created(&mut self, _: Vec3, _: usize, _: VoxelType) -> Result<ExternalId, ObserverError> {
    Ok(ExternalId(0))
  }

  fn on_leaf_removed(&mut self, _: ExternalId) -> Result<(), ObserverError> {
    Ok(())
  }
}

/// Observer built from a pair of fallible closures.
pub struct LifecycleCallbacks<C, R> {
  on_create: C,
  on_remove: R,
}

impl<C, R> LifecycleCallbacks<C, R>
where
  C: FnMut(Vec3, usize, VoxelType) -> Result<ExternalId, ObserverError> + Send,
  R: FnMut(ExternalId) -> Result<(), ObserverError> + Send,
{
  pub fn new(on_create: C, on_remove: R) -> Self {
    Self { on_create, on_remove }
  }
}

impl<C, R> LeafObserver for LifecycleCallbacks<C, R>
where
  C: FnMut(Vec3, usize, VoxelType) -> Result<ExternalId, ObserverError> + Send,
  R: FnMut(ExternalId) -> Result<(), ObserverError> + Send,
{
  fn on_leaf_created(
    &mut self,
    origin: Vec3,
    depth: usize,
    voxel: VoxelType,
  ) -> Result<ExternalId, ObserverError> {
    (self.on_create)(origin, depth, voxel)
  }

  fn on_leaf_removed(&mut self, id: ExternalId) -> Result<(), ObserverError> {
    (self.on_remove)(id)
  }
}

/// Observer from a pair of closures that cannot fail.
pub fn lifecycle_fns(
  mut on_create: impl FnMut(Vec3, usize, VoxelType) -> ExternalId + Send,
  mut on_remove: impl FnMut(ExternalId) + Send,
) -> impl LeafObserver {
  LifecycleCallbacks::new(
    move |origin, depth, voxel| Ok(on_create(origin, depth, voxel)),
    move |id| {
      on_remove(id);
      Ok(())
    },
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_null_observer_accepts_everything() {
    let mut observer = NullObserver;
    assert_eq!(
      observer.on_leaf_created(Vec3::ZERO, 0, VoxelType(1)).unwrap(),
      ExternalId(0)
    );
    assert!(observer.on_leaf_removed(ExternalId(0)).is_ok());
  }

  #[test]
  fn test_lifecycle_fns_forward_arguments() {
    let mut created = Vec::new();
    let mut removed = Vec::new();
    {
      let mut observer = lifecycle_fns(
        |origin, depth, voxel| {
          created.push((origin, depth, voxel));
          ExternalId(created.len() as u64)
        },
        |id| removed.push(id),
      );
      let id = observer
        .on_leaf_created(Vec3::new(0.5, 0.0, 0.0), 1, VoxelType(3))
        .unwrap();
      observer.on_leaf_removed(id).unwrap();
    }
    assert_eq!(created, vec![(Vec3::new(0.5, 0.0, 0.0), 1, VoxelType(3))]);
    assert_eq!(removed, vec![ExternalId(1)]);
  }

  #[test]
  fn test_callback_errors_pass_through() {
    let mut observer = LifecycleCallbacks::new(
      |_, _, _| Err("proxy pool exhausted".into()),
      |_| Ok(()),
    );
    let err = observer.on_leaf_created(Vec3::ZERO, 0, VoxelType(1)).unwrap_err();
    assert_eq!(err.to_string(), "proxy pool exhausted");
  }

  #[test]
  fn test_boxed_observer() {
    let mut observer: Box<dyn LeafObserver> = Box::new(NullObserver);
    assert!(observer.on_leaf_created(Vec3::ONE, 2, VoxelType(9)).is_ok());
  }
}
