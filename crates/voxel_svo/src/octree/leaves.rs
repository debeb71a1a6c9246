//! Leaf enumeration and point queries.
//!
//! Visitors see leaves in depth-first octant order, which is the order a
//! host gets when it replays a tree it has not been observing.

use glam::Vec3;

use super::{BlockIndex, Cube, Node};
use crate::types::LeafInfo;

/// Visit every leaf, air included.
pub fn visit_leaves(root: &Node, mut visit: impl FnMut(LeafInfo)) {
  walk(root, false, &mut visit);
}

/// Visit every non-air leaf.
pub fn visit_solid_leaves(root: &Node, mut visit: impl FnMut(LeafInfo)) {
  walk(root, true, &mut visit);
}

/// Every leaf, air included.
pub fn collect_leaves(root: &Node) -> Vec<LeafInfo> {
  let mut leaves = Vec::with_capacity(root.leaf_count());
  visit_leaves(root, |leaf| leaves.push(leaf));
  leaves
}

/// Pre-order walk with an explicit stack; the path is rebuilt from each
/// entry's depth and octant.
fn walk(root: &Node, solid_only: bool, visit: &mut dyn FnMut(LeafInfo)) {
  let mut path = BlockIndex::root();
  // (node, depth, octant within parent)
  let mut stack = vec![(root, 0usize, 0u8)];
  while let Some((node, depth, octant)) = stack.pop() {
    if depth > 0 {
      path.truncate(depth - 1);
      path.push(octant);
    }
    match node {
      Node::Leaf { voxel, .. } => {
        if !solid_only || voxel.is_solid() {
          visit(LeafInfo::new(path.clone(), *voxel));
        }
      }
      Node::Branch(children) => {
        for (octant, child) in children.iter().enumerate().rev() {
          stack.push((child, depth + 1, octant as u8));
        }
      }
    }
  }
}

/// Leaf whose half-open cube contains `point`, None outside `[0,1)^3`.
pub fn leaf_containing(root: &Node, point: Vec3) -> Option<LeafInfo> {
  let mut cube = Cube::UNIT;
  if !cube.contains_point(point) {
    return None;
  }
  let mut node = root;
  let mut path = BlockIndex::root();
  loop {
    match node {
      Node::Leaf { voxel, .. } => return Some(LeafInfo::new(path, *voxel)),
      Node::Branch(children) => {
        let octant = cube.octant_of(point);
        path.push(octant);
        cube = cube.child(octant);
        node = &children[octant as usize];
      }
    }
  }
}

/// Leaf at `index` or the ancestor leaf covering it.
///
/// None when the addressed node is a branch, i.e. the cube is split into
/// several leaves.
pub fn leaf_covering(root: &Node, index: &BlockIndex) -> Option<LeafInfo> {
  let mut node = root;
  let mut path = BlockIndex::root();
  for &octant in index.as_slice() {
    let Node::Branch(children) = node else {
      break;
    };
    path.push(octant);
    node = &children[octant as usize];
  }
  node.voxel().map(|voxel| LeafInfo::new(path, voxel))
}

#[cfg(test)]
#[path = "leaves_test.rs"]
mod leaves_test;
