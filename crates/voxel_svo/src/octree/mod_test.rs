use glam::Vec3;

use super::leaves::{collect_leaves, leaf_containing};
use super::set_block::write_block;
use super::*;
use crate::types::VoxelType;

fn sample_tree() -> Node {
  let mut root = Node::leaf(VoxelType(1));
  for (selectors, voxel) in [
    (&[0u8, 1, 2][..], 5),
    (&[7, 7][..], 0),
    (&[3, 0, 0, 6][..], 2),
    (&[5][..], 0),
  ] {
    write_block(&mut root, &BlockIndex::new(selectors).unwrap(), VoxelType(voxel));
  }
  root
}

// =========================================================================
// Cross-module invariants
// =========================================================================

/// Leaves tile the unit cube: their volumes sum to 1.
#[test]
fn test_leaves_tile_unit_cube() {
  let volume: f64 = collect_leaves(&sample_tree())
    .iter()
    .map(|leaf| (leaf.side() as f64).powi(3))
    .sum();
  assert!((volume - 1.0).abs() < 1e-12, "Leaf volume {} != 1", volume);
}

/// The leaf containing a leaf's center is that leaf.
#[test]
fn test_point_query_agrees_with_enumeration() {
  let root = sample_tree();
  for leaf in collect_leaves(&root) {
    let found = leaf_containing(&root, leaf.bounds().center()).expect("Center is inside the tree");
    assert_eq!(found, leaf);
  }
}

/// A hit position nudged along the ray lies in the reported leaf.
#[test]
fn test_ray_hit_lands_in_reported_leaf() {
  let root = sample_tree();
  let config = RayConfig::default();
  let origins = [
    Vec3::new(-1.0, 0.2, 0.2),
    Vec3::new(0.3, 2.0, 0.7),
    Vec3::new(1.5, 0.9, -0.5),
  ];
  for origin in origins {
    let ray = Ray::new(origin, Vec3::splat(0.5) - origin, &config).unwrap();
    let Some(hit) = cast_ray::cast(&root, &ray, config.max_distance) else {
      continue;
    };
    let inside = hit.position + ray.direction * 1e-4;
    let leaf = leaf_containing(&root, inside).unwrap();
    assert_eq!(leaf.index, hit.index, "Origin {:?}", origin);
    assert!(leaf.voxel.is_solid());
  }
}

#[test]
fn test_octant_helpers_agree_with_cube() {
  let cube = Cube::UNIT;
  for octant in 0u8..8 {
    let child = cube.child(octant);
    assert_eq!(child.min, octant_offset(octant) * 0.5);
    assert_eq!(child.side, side_length(1));
    assert_eq!(octant_of(child.center()), octant);
  }
}
