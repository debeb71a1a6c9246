//! Block writes with on-demand subdivision.
//!
//! A write walks the index from the root, splitting every leaf it meets on
//! the way down, then replaces the addressed node with a single leaf. The
//! structural work is done here in one pass; what observers need to hear
//! about is returned as a [`LeafChanges`] and delivered by the caller once
//! the tree is consistent again.

use smallvec::SmallVec;

use super::{BlockIndex, Node};
use crate::constants::OCTANT_COUNT;
use crate::types::{ExternalId, VoxelType};

/// A solid leaf that came into existence and has not been reported yet.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingLeaf {
  pub index: BlockIndex,
  pub voxel: VoxelType,
}

/// Change-set produced by a single structural mutation.
///
/// Removals are ids of leaves that no longer exist. Creations are solid
/// leaves that now exist, in the order they were made: subdivision siblings
/// from the root downward, then the written leaf.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LeafChanges {
  pub removed: Vec<ExternalId>,
  pub created: SmallVec<[PendingLeaf; OCTANT_COUNT]>,
  /// Leaves split on the way down.
  pub subdivisions: usize,
}

impl LeafChanges {
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.removed.is_empty() && self.created.is_empty()
  }
}

/// Write `voxel` at `index`, replacing whatever leaf or subtree was there.
///
/// The index must already be validated. Identical siblings are never merged.
/// The descent is a loop, so index length is bounded by memory only.
pub fn write_block(root: &mut Node, index: &BlockIndex, voxel: VoxelType) -> LeafChanges {
  let mut changes = LeafChanges::default();
  let selectors = index.as_slice();
  let mut node = root;
  let mut level = 0;

  while let Some(&octant) = selectors.get(level) {
    match node {
      Node::Branch(children) => {
        node = &mut children[octant as usize];
        level += 1;
      }
      Node::Leaf { voxel: parent, .. } => {
        // Split, then take the same level again through the new branch
        let parent = *parent;
        changes.removed.extend(node.subdivide());
        changes.subdivisions += 1;
        if parent.is_solid() {
          let parent_index = index.prefix(level);
          changes.created.extend(
            (0..OCTANT_COUNT as u8)
              .filter(|&sibling| sibling != octant)
              .map(|sibling| PendingLeaf {
                index: parent_index.child(sibling),
                voxel: parent,
              }),
          );
        }
      }
    }
  }

  node.replace_with_leaf(voxel, &mut changes.removed);
  if voxel.is_solid() {
    changes.created.push(PendingLeaf {
      index: index.clone(),
      voxel,
    });
  }
  changes
}

#[cfg(test)]
#[path = "set_block_test.rs"]
mod set_block_test;
