//! Per-tree statistics for mutation and query activity.
//!
//! Feature-gated and runtime-toggled to ensure zero overhead when disabled.
//!
//! # Usage
//!
//! ```ignore
//! use voxel_svo::metrics::COLLECT_METRICS;
//!
//! // Compile with --features metrics
//! // Runtime toggle:
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! let snapshot = svo.metrics().snapshot();
//! println!("{} blocks, {:.1}us avg", snapshot.blocks_set, snapshot.avg_set_block_us);
//! ```

use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::octree::LeafChanges;

/// Runtime toggle for metrics collection.
/// Set to false to disable metrics gathering at runtime.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Check if metrics collection is enabled (both compile-time and runtime).
#[inline]
pub fn is_enabled() -> bool {
    #[cfg(feature = "metrics")]
    {
        COLLECT_METRICS.load(Ordering::Relaxed)
    }
    #[cfg(not(feature = "metrics"))]
    {
        false
    }
}

/// Rolling window for storing recent values (e.g., timing history).
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    buffer: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a new value, evicting the oldest if at capacity.
    pub fn push(&mut self, value: T) {
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Most recent value.
    pub fn last(&self) -> Option<&T> {
        self.buffer.back()
    }
}

impl RollingWindow<u64> {
    pub fn average(&self) -> f64 {
        if self.buffer.is_empty() {
            0.0
        } else {
            self.buffer.iter().sum::<u64>() as f64 / self.buffer.len() as f64
        }
    }

    pub fn max(&self) -> Option<u64> {
        self.buffer.iter().copied().max()
    }
}

impl Default for RollingWindow<u64> {
    fn default() -> Self {
        Self::new(128)
    }
}

/// Counters for one tree.
///
/// Ray casts take `&self`, so their counters are atomics; everything else
/// is updated through `&mut self` by the mutating operation.
#[derive(Debug, Default)]
pub struct TreeMetrics {
    // Mutation
    pub blocks_set: u64,
    pub subdivisions: u64,
    /// Rolling window of `set_block` times in microseconds.
    pub set_block_timings: RollingWindow<u64>,

    // Observer traffic
    pub leaves_created: u64,
    pub leaves_removed: u64,
    pub observer_failures: u64,

    // Queries
    ray_casts: AtomicU64,
    ray_hits: AtomicU64,
}

/// Point-in-time copy of [`TreeMetrics`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MetricsSnapshot {
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

impl TreeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the structural part of a `set_block`.
    pub fn record_set_block(&mut self, changes: &LeafChanges, timing_us: u64) {
        if !is_enabled() {
            return;
        }
        self.blocks_set += 1;
        self.subdivisions += changes.subdivisions as u64;
        self.set_block_timings.push(timing_us);
    }

    /// Record delivered observer notifications.
    pub fn record_notifications(&mut self, created: usize, removed: usize) {
        if is_enabled() {
            self.leaves_created += created as u64;
            self.leaves_removed += removed as u64;
        }
    }

    pub fn record_observer_failure(&mut self) {
        if is_enabled() {
            self.observer_failures += 1;
        }
    }

    pub fn record_ray_cast(&self, hit: bool) {
        if !is_enabled() {
            return;
        }
        self.ray_casts.fetch_add(1, Ordering::Relaxed);
        if hit {
            self.ray_hits.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Reset everything except the cumulative counters.
    pub fn reset_timings(&mut self) {
        self.set_block_timings.clear();
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            blocks_set: self.blocks_set,
            subdivisions: self.subdivisions,
            leaves_created: self.leaves_created,
            leaves_removed: self.leaves_removed,
            observer_failures: self.observer_failures,
            ray_casts: self.ray_casts.load(Ordering::Relaxed),
            ray_hits: self.ray_hits.load(Ordering::Relaxed),
            avg_set_block_us: self.set_block_timings.average(),
            last_set_block_us: self.set_block_timings.last().copied().unwrap_or(0),
        }
    }
}

#[cfg(all(test, feature = "metrics"))]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_window() {
        let mut window = RollingWindow::new(3);
        assert!(window.is_empty());

        window.push(10u64);
        window.push(20);
        window.push(30);
        assert_eq!(window.len(), 3);
        assert_eq!(window.average(), 20.0);

        // Push one more, oldest should be evicted
        window.push(40);
        assert_eq!(window.len(), 3);
        assert_eq!(window.average(), 30.0);
        assert_eq!(window.max(), Some(40));
        assert_eq!(window.last(), Some(&40));
    }

    #[test]
    fn test_set_block_recording() {
        let mut metrics = TreeMetrics::new();
        let changes = LeafChanges {
            subdivisions: 3,
            ..LeafChanges::default()
        };

        metrics.record_set_block(&changes, 100);
        metrics.record_set_block(&LeafChanges::default(), 300);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.blocks_set, 2);
        assert_eq!(snapshot.subdivisions, 3);
        assert_eq!(snapshot.avg_set_block_us, 200.0);
        assert_eq!(snapshot.last_set_block_us, 300);

        metrics.reset_timings();
        assert_eq!(metrics.snapshot().avg_set_block_us, 0.0);
        assert_eq!(metrics.snapshot().blocks_set, 2);
    }

    #[test]
    fn test_ray_counters_through_shared_ref() {
        let metrics = TreeMetrics::new();
        metrics.record_ray_cast(true);
        metrics.record_ray_cast(false);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.ray_casts, 2);
        assert_eq!(snapshot.ray_hits, 1);
    }

    #[test]
    fn test_notification_counters() {
        let mut metrics = TreeMetrics::new();
        metrics.record_notifications(22, 1);
        metrics.record_observer_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.leaves_created, 22);
        assert_eq!(snapshot.leaves_removed, 1);
        assert_eq!(snapshot.observer_failures, 1);
    }
}
