//! Unity FFI bridge for voxel_svo.
//!
//! C# holds integer tree handles and receives leaf lifecycle events through
//! plain function pointers. All trees live in one process-wide registry
//! guarded by a mutex.
//!
//! # Architecture
//!
//! ```text
//! C# (Unity)                           Rust (svo_unity)
//! ┌───────────────────┐                ┌──────────────────────────┐
//! │ NativeSvo         │  svo_set_block │ TREES: SvoRegistry       │
//! │   SetBlock() ─────┼──────────────► │  handle -> Svo           │
//! │                   │                │                          │
//! │ OnLeafCreated ◄───┼── on_create ───│ ExternObserver           │
//! │ OnLeafRemoved ◄───┼── on_remove ───│  (fn ptrs + user_data)   │
//! └───────────────────┘                └──────────────────────────┘
//! ```
//!
//! # Callbacks
//!
//! Callbacks run synchronously on the calling thread while the registry
//! lock is held. They must not call back into this library.
//!
//! # Status codes
//!
//! Functions return `>= 0` on success and one of the negative `SVO_ERR_*`
//! codes on failure.

use std::ffi::c_void;
use std::sync::Mutex;

use glam::Vec3;
use tracing::{debug, warn};

use voxel_svo::{
    constants::VERSION_PACKED, ExternalId, HeightMap, LeafObserver, ObserverError, Svo, SvoConfig,
    SvoError, SvoRegistry, TreeHandle, VoxelType,
};

// =============================================================================
// Status codes
// =============================================================================

pub const SVO_OK: i32 = 0;
/// A required pointer or callback was null.
pub const SVO_ERR_NULL: i32 = -1;
/// The registry lock was poisoned.
pub const SVO_ERR_LOCK: i32 = -2;
/// The handle was destroyed or never created.
pub const SVO_ERR_UNKNOWN_HANDLE: i32 = -3;
pub const SVO_ERR_INVALID_INDEX: i32 = -4;
pub const SVO_ERR_INVALID_RAY: i32 = -5;
/// A lifecycle callback reported failure. The tree is structurally complete.
pub const SVO_ERR_OBSERVER: i32 = -6;
pub const SVO_ERR_INDEX_TOO_DEEP: i32 = -7;
/// Invalid configuration or height map.
pub const SVO_ERR_INVALID_INPUT: i32 = -8;

fn status_of(err: &SvoError) -> i32 {
    match err {
        SvoError::InvalidIndex { .. } => SVO_ERR_INVALID_INDEX,
        SvoError::IndexTooDeep { .. } => SVO_ERR_INDEX_TOO_DEEP,
        SvoError::InvalidRay => SVO_ERR_INVALID_RAY,
        SvoError::UseAfterDestroy(_) => SVO_ERR_UNKNOWN_HANDLE,
        SvoError::Observer(_) => SVO_ERR_OBSERVER,
        SvoError::InvalidConfig(_) | SvoError::InvalidHeightMap { .. } => SVO_ERR_INVALID_INPUT,
    }
}

fn status(result: voxel_svo::Result<()>) -> i32 {
    match result {
        Ok(()) => SVO_OK,
        Err(err) => status_of(&err),
    }
}

// =============================================================================
// FFI Types
// =============================================================================

/// Matches C# FfiVec3 exactly.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct FfiVec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Vec3> for FfiVec3 {
    fn from(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl From<FfiVec3> for Vec3 {
    fn from(v: FfiVec3) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

/// Tree configuration passed from Unity.
#[repr(C)]
pub struct FfiSvoConfig {
    /// Type of the root leaf
    pub default_voxel: i32,
    /// Deepest accepted block index, 0 = unbounded
    pub max_depth: u32,
    /// Ray hits beyond this distance are ignored (<= 0 = default)
    pub max_ray_distance: f32,
}

impl FfiSvoConfig {
    fn to_config(&self) -> SvoConfig {
        let mut config = SvoConfig::new(self.default_voxel);
        if self.max_depth > 0 {
            config = config.with_max_depth(self.max_depth as usize);
        }
        if self.max_ray_distance > 0.0 {
            config.ray.max_distance = self.max_ray_distance;
        }
        config
    }
}

/// Ray cast result.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct FfiRayHit {
    /// Entry point into the hit leaf
    pub position: FfiVec3,
    /// Distance from the ray origin
    pub distance: f32,
    /// Depth of the hit leaf
    pub depth: i32,
    /// Type of the hit leaf
    pub voxel: i32,
}

/// Per-tree counters.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct FfiMetricsSnapshot {
    pub blocks_set: u64,
    pub subdivisions: u64,
    pub leaves_created: u64,
    pub leaves_removed: u64,
    pub observer_failures: u64,
    pub ray_casts: u64,
    pub ray_hits: u64,
    pub avg_set_block_us: f64,
    pub last_set_block_us: u64,
}

/// Called for each new solid leaf. Writes the host id to `out_id` and
/// returns 0, or returns non-zero to abort the notification sequence.
pub type FfiCreateFn = extern "C" fn(
    user_data: *mut c_void,
    origin: FfiVec3,
    depth: i32,
    voxel: i32,
    out_id: *mut u64,
) -> i32;

/// Called once per id returned from the create callback. Non-zero aborts.
pub type FfiRemoveFn = extern "C" fn(user_data: *mut c_void, id: u64) -> i32;

/// One-shot leaf visitor.
pub type FfiVisitFn = extern "C" fn(user_data: *mut c_void, origin: FfiVec3, depth: i32, voxel: i32);

/// Host callback failure.
#[derive(Debug)]
struct CallbackFailed {
    callback: &'static str,
    code: i32,
}

impl std::fmt::Display for CallbackFailed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} callback returned {}", self.callback, self.code)
    }
}

impl std::error::Error for CallbackFailed {}

/// Observer forwarding to host function pointers.
struct ExternObserver {
    on_create: FfiCreateFn,
    on_remove: FfiRemoveFn,
    user_data: *mut c_void,
}

// SAFETY: `user_data` is only dereferenced by the host's callbacks, which are
// always invoked while the registry mutex is held. The host guarantees the
// pointer stays valid until the observer is unregistered or the tree is
// destroyed.
unsafe impl Send for ExternObserver {}

impl LeafObserver for ExternObserver {
    fn on_leaf_created(
        &mut self,
        origin: Vec3,
        depth: usize,
        voxel: VoxelType,
    ) -> Result<ExternalId, ObserverError> {
        let mut id = 0u64;
        let code = (self.on_create)(self.user_data, origin.into(), depth as i32, voxel.raw(), &mut id);
        if code != 0 {
            return Err(Box::new(CallbackFailed {
                callback: "on_create",
                code,
            }));
        }
        Ok(ExternalId(id))
    }

    fn on_leaf_removed(&mut self, id: ExternalId) -> Result<(), ObserverError> {
        match (self.on_remove)(self.user_data, id.0) {
            0 => Ok(()),
            code => Err(Box::new(CallbackFailed {
                callback: "on_remove",
                code,
            })),
        }
    }
}

// =============================================================================
// Global Tree Storage
// =============================================================================

/// Global tree storage with thread-safe access.
static TREES: Mutex<Option<SvoRegistry>> = Mutex::new(None);

/// Run `f` against the registry, creating it on first use.
fn with_registry<R>(f: impl FnOnce(&mut SvoRegistry) -> R) -> Result<R, i32> {
    let Ok(mut guard) = TREES.lock() else {
        return Err(SVO_ERR_LOCK);
    };
    Ok(f(guard.get_or_insert_with(SvoRegistry::new)))
}

/// Handles are positive; anything else cannot name a tree.
fn handle_of(raw: i64) -> Option<TreeHandle> {
    u64::try_from(raw).ok().map(TreeHandle::from_raw)
}

fn insert_tree(svo: voxel_svo::Result<Svo>) -> i64 {
    let svo = match svo {
        Ok(svo) => svo,
        Err(err) => return status_of(&err) as i64,
    };
    match with_registry(|trees| trees.insert(svo)) {
        Ok(handle) => handle.raw() as i64,
        Err(code) => code as i64,
    }
}

/// Run `f` on the tree behind `handle`, mapping errors to status codes.
fn with_tree<R>(handle: i64, f: impl FnOnce(&mut Svo) -> voxel_svo::Result<R>) -> Result<R, i32> {
    let Some(handle) = handle_of(handle) else {
        return Err(SVO_ERR_UNKNOWN_HANDLE);
    };
    with_registry(|trees| trees.get_mut(handle).and_then(f))?.map_err(|err| status_of(&err))
}

// =============================================================================
// FFI Functions
// =============================================================================

/// Returns the library version as a packed u32: 0xMMmmpp (major.minor.patch).
#[no_mangle]
pub extern "C" fn svo_version() -> u32 {
    VERSION_PACKED
}

/// Create a tree whose root is a single leaf of `default_voxel`.
///
/// # Returns
/// - Positive handle on success
/// - -2 if failed to acquire lock
#[no_mangle]
pub extern "C" fn svo_create(default_voxel: i32) -> i64 {
    let handle = insert_tree(Ok(Svo::new(default_voxel)));
    debug!(handle, default_voxel, "svo_create");
    handle
}

/// Create a tree from a configuration struct.
///
/// # Safety
/// - `config` must point to a valid FfiSvoConfig struct.
///
/// # Returns
/// - Positive handle on success
/// - -1 if config is null
/// - -2 if failed to acquire lock
/// - -8 if the configuration is invalid
#[no_mangle]
pub unsafe extern "C" fn svo_create_with_config(config: *const FfiSvoConfig) -> i64 {
    if config.is_null() {
        return SVO_ERR_NULL as i64;
    }
    insert_tree(Svo::with_config((*config).to_config()))
}

/// Create a tree from a row-major grayscale height map.
///
/// # Safety
/// - `samples` must point to `width * height` readable bytes.
///
/// # Returns
/// - Positive handle on success
/// - -1 if samples is null
/// - -2 if failed to acquire lock
/// - -8 if the image dimensions are invalid
#[no_mangle]
pub unsafe extern "C" fn svo_create_from_height_map(
    samples: *const u8,
    width: u32,
    height: u32,
    depth: u32,
    fill: i32,
) -> i64 {
    if samples.is_null() {
        return SVO_ERR_NULL as i64;
    }
    let len = width as usize * height as usize;
    let samples = std::slice::from_raw_parts(samples, len).to_vec();
    let svo = HeightMap::new(width, height, samples).and_then(|map| {
        Svo::from_height_map(SvoConfig::default(), &map.with_fill(fill), depth as usize)
    });
    insert_tree(svo)
}

/// Destroy a tree, firing `on_remove` for every registered leaf.
///
/// # Returns
/// - 0 on success
/// - -2 if failed to acquire lock
/// - -3 if the handle was already destroyed or never created
/// - -6 if a remove callback failed (the tree is gone regardless)
#[no_mangle]
pub extern "C" fn svo_destroy(handle: i64) -> i32 {
    let Some(tree) = handle_of(handle) else {
        return SVO_ERR_UNKNOWN_HANDLE;
    };
    let result = with_registry(|trees| trees.destroy(tree));
    debug!(handle, "svo_destroy");
    match result {
        Ok(result) => status(result),
        Err(code) => code,
    }
}

/// Write `voxel` at the block addressed by `index_len` octant selectors.
///
/// # Safety
/// - `index_ptr` must point to `index_len` readable bytes (may be null when
///   `index_len` is 0).
///
/// # Returns
/// - 0 on success
/// - -1 if index_ptr is null with a non-zero length
/// - -2 / -3 as usual
/// - -4 if a selector is outside 0..=7 (tree unchanged)
/// - -6 if a lifecycle callback failed
/// - -7 if the index is deeper than the configured maximum
#[no_mangle]
pub unsafe extern "C" fn svo_set_block(
    handle: i64,
    index_ptr: *const u8,
    index_len: usize,
    voxel: i32,
) -> i32 {
    let selectors: &[u8] = if index_len == 0 {
        &[]
    } else if index_ptr.is_null() {
        return SVO_ERR_NULL;
    } else {
        std::slice::from_raw_parts(index_ptr, index_len)
    };
    match with_tree(handle, |svo| svo.set_block(selectors, voxel)) {
        Ok(()) => SVO_OK,
        Err(code) => code,
    }
}

/// Cast a ray against the solid leaves.
///
/// # Safety
/// - `out` must point to a valid FfiRayHit struct.
///
/// # Returns
/// - 1 on hit (`out` filled)
/// - 0 on miss (`out` zeroed)
/// - -1 if out is null
/// - -2 / -3 as usual
/// - -5 if the direction is zero or either vector is not finite
#[no_mangle]
pub unsafe extern "C" fn svo_cast_ray(
    handle: i64,
    origin: FfiVec3,
    direction: FfiVec3,
    out: *mut FfiRayHit,
) -> i32 {
    if out.is_null() {
        return SVO_ERR_NULL;
    }
    match with_tree(handle, |svo| svo.cast_ray_hit(origin.into(), direction.into())) {
        Ok(Some(hit)) => {
            *out = FfiRayHit {
                position: hit.position.into(),
                distance: hit.distance,
                depth: hit.depth() as i32,
                voxel: hit.voxel.raw(),
            };
            1
        }
        Ok(None) => {
            *out = FfiRayHit::default();
            0
        }
        Err(code) => code,
    }
}

/// Attach lifecycle callbacks, replacing any current ones.
///
/// Previously registered leaves are first removed through the old
/// callbacks; then `on_create` fires for every existing solid leaf.
///
/// # Safety
/// - `user_data` is passed verbatim to the callbacks and must stay valid
///   until the callbacks are unregistered or the tree is destroyed.
///
/// # Returns
/// - 0 on success
/// - -1 if a callback is null
/// - -2 / -3 as usual
/// - -6 if a callback failed
#[no_mangle]
pub unsafe extern "C" fn svo_register_lifecycle(
    handle: i64,
    on_create: Option<FfiCreateFn>,
    on_remove: Option<FfiRemoveFn>,
    user_data: *mut c_void,
) -> i32 {
    let (Some(on_create), Some(on_remove)) = (on_create, on_remove) else {
        return SVO_ERR_NULL;
    };
    let observer = ExternObserver {
        on_create,
        on_remove,
        user_data,
    };
    match with_tree(handle, |svo| svo.register_lifecycle(observer)) {
        Ok(()) => SVO_OK,
        Err(code) => code,
    }
}

/// Remove every registered leaf through the current callbacks, then detach
/// them.
///
/// # Returns
/// - 0 on success (also when no callbacks were attached)
/// - -2 / -3 as usual
/// - -6 if a remove callback failed
#[no_mangle]
pub extern "C" fn svo_unregister_lifecycle(handle: i64) -> i32 {
    match with_tree(handle, |svo| svo.unregister_lifecycle().map(drop)) {
        Ok(()) => SVO_OK,
        Err(code) => code,
    }
}

/// Replay the current solid leaves through `visit`, in octant order.
///
/// # Safety
/// - `user_data` is passed verbatim to `visit`.
///
/// # Returns
/// - Number of leaves visited
/// - -1 if visit is null
/// - -2 / -3 as usual
#[no_mangle]
pub unsafe extern "C" fn svo_for_each_leaf(
    handle: i64,
    visit: Option<FfiVisitFn>,
    user_data: *mut c_void,
) -> i64 {
    let Some(visit) = visit else {
        return SVO_ERR_NULL as i64;
    };
    let visited = with_tree(handle, |svo| {
        let mut count = 0i64;
        svo.for_each_leaf(|leaf| {
            visit(user_data, leaf.origin.into(), leaf.depth as i32, leaf.voxel.raw());
            count += 1;
        });
        Ok(count)
    });
    visited.unwrap_or_else(|code| code as i64)
}

/// Total number of leaves, air included.
///
/// # Returns
/// - Leaf count
/// - -2 / -3 as usual
#[no_mangle]
pub extern "C" fn svo_leaf_count(handle: i64) -> i64 {
    with_tree(handle, |svo| Ok(svo.leaf_count() as i64)).unwrap_or_else(|code| code as i64)
}

/// Get current metrics snapshot for a tree.
///
/// All counters stay zero unless built with the `metrics` feature.
///
/// # Safety
/// - `out` must point to a valid FfiMetricsSnapshot struct.
///
/// # Returns
/// - 0 on success
/// - -1 if out is null
/// - -2 / -3 as usual
#[no_mangle]
pub unsafe extern "C" fn svo_get_metrics(handle: i64, out: *mut FfiMetricsSnapshot) -> i32 {
    if out.is_null() {
        return SVO_ERR_NULL;
    }
    match with_tree(handle, |svo| Ok(svo.metrics().snapshot())) {
        Ok(snapshot) => {
            *out = FfiMetricsSnapshot {
                blocks_set: snapshot.blocks_set,
                subdivisions: snapshot.subdivisions,
                leaves_created: snapshot.leaves_created,
                leaves_removed: snapshot.leaves_removed,
                observer_failures: snapshot.observer_failures,
                ray_casts: snapshot.ray_casts,
                ray_hits: snapshot.ray_hits,
                avg_set_block_us: snapshot.avg_set_block_us,
                last_set_block_us: snapshot.last_set_block_us,
            };
            SVO_OK
        }
        Err(code) => {
            if code == SVO_ERR_LOCK {
                warn!(handle, "Registry lock poisoned");
            }
            code
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
