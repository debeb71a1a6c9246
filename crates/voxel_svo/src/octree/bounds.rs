//! Axis-aligned cubic extent of an octree node.

use glam::Vec3;

use super::address::octant_offset;
use super::cast_ray::Ray;

/// Axis-aligned cube.
///
/// Octree nodes occupy half-open extents `[min, min + side)`, for point
/// containment and ray intersection alike.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cube {
	/// Minimum corner (inclusive).
	pub min: Vec3,
	/// Edge length.
	pub side: f32,
}

impl Cube {
	/// The root extent `[0,1)^3`.
	pub const UNIT: Self = Self {
		min: Vec3::ZERO,
		side: 1.0,
	};

	/// Create a cube from its minimum corner and edge length.
	///
	/// `side` underflows to zero for very deep nodes; such cubes contain no
	/// point.
	///
	/// # Panics
	/// Debug-asserts that `side` is not negative.
	pub fn new(min: Vec3, side: f32) -> Self {
		debug_assert!(side >= 0.0, "Cube side must not be negative");
		Self { min, side }
	}

	/// Maximum corner (exclusive for containment).
	#[inline]
	pub fn max(&self) -> Vec3 {
		self.min + Vec3::splat(self.side)
	}

	#[inline]
	pub fn center(&self) -> Vec3 {
		self.min + Vec3::splat(self.side * 0.5)
	}

	/// Extent of one of the 8 children.
	#[inline]
	pub fn child(&self, octant: u8) -> Cube {
		let half = self.side * 0.5;
		Cube {
			min: self.min + octant_offset(octant) * half,
			side: half,
		}
	}

	/// Octant of the child containing `point`.
	#[inline]
	pub fn octant_of(&self, point: Vec3) -> u8 {
		let center = self.center();
		(point.x >= center.x) as u8
			| ((point.y >= center.y) as u8) << 1
			| ((point.z >= center.z) as u8) << 2
	}

	/// Half-open containment test.
	#[inline]
	pub fn contains_point(&self, point: Vec3) -> bool {
		let max = self.max();
		point.cmpge(self.min).all() && point.cmplt(max).all()
	}

	/// Parametric interval `(t_near, t_far)` over which the ray's line passes
	/// through the cube, or None when it misses.
	///
	/// `t_near` may be negative when the ray starts inside or past the cube.
	/// Axes the ray runs parallel to only constrain the origin, half-open like
	/// containment: a ray in a cube's max plane belongs to the neighbour.
	/// Lines that only touch an edge or corner have no length inside and miss.
	pub fn ray_interval(&self, ray: &Ray) -> Option<(f32, f32)> {
		let max = self.max();
		let mut t_near = f32::NEG_INFINITY;
		let mut t_far = f32::INFINITY;

		for axis in 0..3 {
			let origin = ray.origin[axis];
			if ray.direction[axis] == 0.0 {
				if origin < self.min[axis] || origin >= max[axis] {
					return None;
				}
				continue;
			}
			let inv = ray.inv_direction[axis];
			let t0 = (self.min[axis] - origin) * inv;
			let t1 = (max[axis] - origin) * inv;
			let (lo, hi) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
			t_near = t_near.max(lo);
			t_far = t_far.min(hi);
		}

		if t_near >= t_far {
			None
		} else {
			Some((t_near, t_far))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::octree::RayConfig;

	fn ray(origin: Vec3, direction: Vec3) -> Ray {
		Ray::new(origin, direction, &RayConfig::default()).unwrap()
	}

	#[test]
	fn test_unit() {
		assert_eq!(Cube::UNIT.min, Vec3::ZERO);
		assert_eq!(Cube::UNIT.max(), Vec3::ONE);
		assert_eq!(Cube::UNIT.center(), Vec3::splat(0.5));
	}

	#[test]
	fn test_children_tile_parent() {
		let parent = Cube::new(Vec3::new(0.5, 0.0, 0.25), 0.25);
		for octant in 0u8..8 {
			let child = parent.child(octant);
			assert_eq!(child.side, 0.125);
			assert!(parent.contains_point(child.center()));
			assert_eq!(parent.octant_of(child.center()), octant);
		}
	}

	#[test]
	fn test_contains_point_half_open() {
		let cube = Cube::UNIT;

		// Inside
		assert!(cube.contains_point(Vec3::splat(0.5)));

		// Minimum boundary is inside, maximum is not
		assert!(cube.contains_point(Vec3::ZERO));
		assert!(!cube.contains_point(Vec3::new(1.0, 0.5, 0.5)));

		// Outside
		assert!(!cube.contains_point(Vec3::splat(-0.1)));
	}

	#[test]
	fn test_ray_interval_through() {
		let (near, far) = Cube::UNIT
			.ray_interval(&ray(Vec3::new(-1.0, 0.5, 0.5), Vec3::X))
			.expect("Ray along +X should cross the cube");
		assert_eq!(near, 1.0);
		assert_eq!(far, 2.0);
	}

	#[test]
	fn test_ray_interval_from_inside() {
		let (near, far) = Cube::UNIT
			.ray_interval(&ray(Vec3::splat(0.5), Vec3::NEG_Y))
			.unwrap();
		assert_eq!(near, -0.5);
		assert_eq!(far, 0.5);
	}

	#[test]
	fn test_ray_interval_parallel_outside() {
		// Parallel to the x planes but outside the y slab
		let hit = Cube::UNIT.ray_interval(&ray(Vec3::new(0.5, 2.0, -1.0), Vec3::Z));
		assert!(hit.is_none());
	}

	#[test]
	fn test_ray_interval_miss_diagonal() {
		let hit = Cube::UNIT.ray_interval(&ray(Vec3::new(3.0, 0.0, 0.5), Vec3::new(1.0, 1.0, 0.0)));
		assert!(hit.is_none());
	}

	#[test]
	fn test_ray_interval_grazing_edge_misses() {
		// Touches only the (x = 1, y = 1) edge
		let hit = Cube::UNIT.ray_interval(&ray(Vec3::new(2.0, 0.0, 0.5), Vec3::new(-1.0, 1.0, 0.0)));
		assert!(hit.is_none());

		// Touches only the (x = 0, y = 0) edge
		let hit = Cube::UNIT.ray_interval(&ray(Vec3::new(-1.0, 1.0, 0.5), Vec3::new(1.0, -1.0, 0.0)));
		assert!(hit.is_none());
	}

	#[test]
	fn test_ray_interval_in_face_plane_is_half_open() {
		// Runs inside the x = 0 plane: part of the cube
		let (near, far) = Cube::UNIT
			.ray_interval(&ray(Vec3::new(0.0, 0.25, -1.0), Vec3::Z))
			.expect("Min face plane is inside");
		assert_eq!((near, far), (1.0, 2.0));

		// Runs inside the x = 1 and y = 1 planes: never enters
		assert!(Cube::UNIT
			.ray_interval(&ray(Vec3::new(1.0, 0.25, -1.0), Vec3::Z))
			.is_none());
		assert!(Cube::UNIT
			.ray_interval(&ray(Vec3::new(0.5, 1.0, -1.0), Vec3::Z))
			.is_none());
	}

	#[test]
	fn test_zero_side_cube() {
		let cube = Cube::new(Vec3::ZERO, crate::octree::side_length(200));
		assert_eq!(cube.side, 0.0);
		assert!(!cube.contains_point(Vec3::ZERO));
	}
}
