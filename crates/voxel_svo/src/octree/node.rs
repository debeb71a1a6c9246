//! Node - owned recursive octree storage.
//!
//! A node is either a leaf holding one voxel type for its whole cube, or a
//! branch owning exactly eight children. Extents are implicit: a child's
//! cube follows from its parent's cube and its octant.
//!
//! Depth is unbounded, so whole-subtree work (counting, id harvesting,
//! teardown) runs on an explicit stack rather than recursing per level.
//! The derived `Clone`, `PartialEq` and `Debug` still recurse and are meant
//! for trees of ordinary depth.

use super::BlockIndex;
use crate::constants::OCTANT_COUNT;
use crate::types::{ExternalId, VoxelType};

/// Octree node.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
  Leaf {
    voxel: VoxelType,
    /// Token from the observer's create callback, if one ran for this leaf.
    external_id: Option<ExternalId>,
  },
  /// Children indexed by octant.
  Branch(Box<[Node; OCTANT_COUNT]>),
}

impl Node {
  /// Leaf without an external id.
  #[inline]
  pub fn leaf(voxel: VoxelType) -> Self {
    Node::Leaf {
      voxel,
      external_id: None,
    }
  }

  #[inline]
  pub fn is_leaf(&self) -> bool {
    matches!(self, Node::Leaf { .. })
  }

  /// Voxel type of a leaf, None for branches.
  #[inline]
  pub fn voxel(&self) -> Option<VoxelType> {
    match self {
      Node::Leaf { voxel, .. } => Some(*voxel),
      Node::Branch(_) => None,
    }
  }

  #[inline]
  pub fn external_id(&self) -> Option<ExternalId> {
    match self {
      Node::Leaf { external_id, .. } => *external_id,
      Node::Branch(_) => None,
    }
  }

  #[inline]
  pub fn children(&self) -> Option<&[Node; OCTANT_COUNT]> {
    match self {
      Node::Leaf { .. } => None,
      Node::Branch(children) => Some(children),
    }
  }

  /// Node addressed by `index`, if the tree is subdivided that far.
  pub fn get(&self, index: &BlockIndex) -> Option<&Node> {
    index.as_slice().iter().try_fold(self, |node, &octant| {
      node.children().map(|children| &children[octant as usize])
    })
  }

  pub(crate) fn get_mut(&mut self, index: &BlockIndex) -> Option<&mut Node> {
    let mut node = self;
    for &octant in index.as_slice() {
      match node {
        Node::Leaf { .. } => return None,
        Node::Branch(children) => node = &mut children[octant as usize],
      }
    }
    Some(node)
  }

  /// Split a leaf into eight leaves of the same type.
  ///
  /// Returns the external id the leaf carried. No-op on branches.
  pub(crate) fn subdivide(&mut self) -> Option<ExternalId> {
    let Node::Leaf { voxel, external_id } = *self else {
      return None;
    };
    *self = Node::Branch(Box::new(std::array::from_fn(|_| Node::leaf(voxel))));
    external_id
  }

  /// Replace this subtree with a single leaf, collecting every external id
  /// it held.
  pub(crate) fn replace_with_leaf(&mut self, voxel: VoxelType, removed: &mut Vec<ExternalId>) {
    self.take_external_ids(removed);
    *self = Node::leaf(voxel);
  }

  /// Move every external id in this subtree into `out`, in depth-first
  /// octant order.
  pub(crate) fn take_external_ids(&mut self, out: &mut Vec<ExternalId>) {
    let mut stack = vec![self];
    while let Some(node) = stack.pop() {
      match node {
        Node::Leaf { external_id, .. } => out.extend(external_id.take()),
        Node::Branch(children) => stack.extend(children.iter_mut().rev()),
      }
    }
  }

  /// Store `id` on the leaf at `index`. Returns false if `index` does not
  /// name a leaf.
  pub(crate) fn attach_external_id(&mut self, index: &BlockIndex, id: ExternalId) -> bool {
    match self.get_mut(index) {
      Some(Node::Leaf { external_id, .. }) => {
        *external_id = Some(id);
        true
      }
      _ => false,
    }
  }

  /// Call `visit` with every leaf below this node and its depth relative to
  /// this node, in no particular order.
  fn for_each_leaf_node(&self, mut visit: impl FnMut(&Node, usize)) {
    let mut stack = vec![(self, 0usize)];
    while let Some((node, depth)) = stack.pop() {
      match node {
        Node::Leaf { .. } => visit(node, depth),
        Node::Branch(children) => stack.extend(children.iter().map(|child| (child, depth + 1))),
      }
    }
  }

  pub fn leaf_count(&self) -> usize {
    let mut count = 0;
    self.for_each_leaf_node(|_, _| count += 1);
    count
  }

  pub fn solid_leaf_count(&self) -> usize {
    let mut count = 0;
    self.for_each_leaf_node(|leaf, _| {
      count += leaf.voxel().is_some_and(VoxelType::is_solid) as usize;
    });
    count
  }

  /// Leaves carrying an external id.
  pub fn registered_leaf_count(&self) -> usize {
    let mut count = 0;
    self.for_each_leaf_node(|leaf, _| count += leaf.external_id().is_some() as usize);
    count
  }

  /// Depth of the deepest leaf below this node (0 for a leaf).
  pub fn max_depth(&self) -> usize {
    let mut deepest = 0;
    self.for_each_leaf_node(|_, depth| deepest = deepest.max(depth));
    deepest
  }

  /// Move every branch child into `out`, leaving air leaves behind.
  fn detach_branches(&mut self, out: &mut Vec<Node>) {
    if let Node::Branch(children) = self {
      for child in children.iter_mut().filter(|child| !child.is_leaf()) {
        out.push(std::mem::replace(child, Node::leaf(VoxelType::AIR)));
      }
    }
  }
}

impl Drop for Node {
  /// Tear down level by level; every node dropped here has only leaf
  /// children left.
  fn drop(&mut self) {
    let mut pending = Vec::new();
    self.detach_branches(&mut pending);
    while let Some(mut node) = pending.pop() {
      node.detach_branches(&mut pending);
    }
  }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
