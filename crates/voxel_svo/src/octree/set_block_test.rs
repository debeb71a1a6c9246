use super::*;

fn index(selectors: &[u8]) -> BlockIndex {
  BlockIndex::new(selectors).unwrap()
}

fn registered(voxel: i32, id: u64) -> Node {
  Node::Leaf {
    voxel: VoxelType(voxel),
    external_id: Some(ExternalId(id)),
  }
}

// =========================================================================
// Structure
// =========================================================================

#[test]
fn test_empty_index_replaces_root() {
  let mut root = Node::leaf(VoxelType(1));
  let changes = write_block(&mut root, &BlockIndex::root(), VoxelType(2));

  assert_eq!(root, Node::leaf(VoxelType(2)));
  assert_eq!(changes.subdivisions, 0);
  assert_eq!(changes.created.len(), 1);
  assert!(changes.created[0].index.is_root());
}

/// Subdivision copies the parent type into every untouched sibling.
#[test]
fn test_subdivision_preserves_parent_type() {
  let mut root = Node::leaf(VoxelType(7));
  write_block(&mut root, &index(&[3]), VoxelType(2));

  let children = root.children().expect("Root should be split");
  for (octant, child) in children.iter().enumerate() {
    let expected = if octant == 3 { 2 } else { 7 };
    assert_eq!(child.voxel(), Some(VoxelType(expected)), "Octant {}", octant);
  }
}

#[test]
fn test_deep_write_splits_each_level() {
  let mut root = Node::leaf(VoxelType(1));
  let changes = write_block(&mut root, &index(&[0, 1, 2]), VoxelType(5));

  assert_eq!(changes.subdivisions, 3);
  assert_eq!(root.leaf_count(), 22);
  assert_eq!(root.max_depth(), 3);
  assert_eq!(root.get(&index(&[0, 1, 2])).and_then(Node::voxel), Some(VoxelType(5)));
  assert_eq!(root.get(&index(&[0, 1, 3])).and_then(Node::voxel), Some(VoxelType(1)));
}

/// Writing above existing detail discards the whole subtree.
#[test]
fn test_write_replaces_subtree() {
  let mut root = Node::leaf(VoxelType(0));
  write_block(&mut root, &index(&[4, 4, 4]), VoxelType(3));
  write_block(&mut root, &index(&[4]), VoxelType(6));

  assert!(root.get(&index(&[4])).unwrap().is_leaf());
  assert_eq!(root.leaf_count(), 8);
}

/// Writing the same type into every child leaves eight leaves behind.
#[test]
fn test_no_merge_of_identical_siblings() {
  let mut root = Node::leaf(VoxelType(0));
  for octant in 0u8..8 {
    write_block(&mut root, &index(&[octant]), VoxelType(1));
  }
  assert!(!root.is_leaf());
  assert_eq!(root.leaf_count(), 8);
}

// =========================================================================
// Change-set
// =========================================================================

/// create(1); set [0,1,2] to 5: 21 siblings of type 1 then the new leaf.
#[test]
fn test_created_siblings_in_descent_order() {
  let mut root = Node::leaf(VoxelType(1));
  let changes = write_block(&mut root, &index(&[0, 1, 2]), VoxelType(5));

  assert_eq!(changes.created.len(), 22);
  let siblings = &changes.created[..21];
  assert!(siblings.iter().all(|leaf| leaf.voxel == VoxelType(1)));
  assert_eq!(siblings[0].index, index(&[1]));
  assert_eq!(siblings[7].index, index(&[0, 0]));
  assert_eq!(siblings[14].index, index(&[0, 1, 0]));

  let last = changes.created.last().unwrap();
  assert_eq!(last.index, index(&[0, 1, 2]));
  assert_eq!(last.voxel, VoxelType(5));
}

#[test]
fn test_air_parent_creates_no_siblings() {
  let mut root = Node::leaf(VoxelType(0));
  let changes = write_block(&mut root, &index(&[2, 2]), VoxelType(4));
  assert_eq!(changes.created.len(), 1);
  assert_eq!(changes.subdivisions, 2);
}

#[test]
fn test_air_write_creates_nothing() {
  let mut root = registered(3, 10);
  let changes = write_block(&mut root, &BlockIndex::root(), VoxelType::AIR);
  assert_eq!(changes.removed, vec![ExternalId(10)]);
  assert!(changes.created.is_empty());
}

#[test]
fn test_subdivided_leaf_id_is_removed() {
  let mut root = registered(3, 10);
  let changes = write_block(&mut root, &index(&[6]), VoxelType::AIR);

  assert_eq!(changes.removed, vec![ExternalId(10)]);
  // Seven type-3 siblings, nothing for the air leaf
  assert_eq!(changes.created.len(), 7);
  assert!(changes.created.iter().all(|leaf| leaf.index.as_slice() != [6]));
}

#[test]
fn test_replaced_subtree_ids_are_removed() {
  let mut root = Node::Branch(Box::new(std::array::from_fn(|octant| registered(1, octant as u64 + 100))));
  let changes = write_block(&mut root, &BlockIndex::root(), VoxelType(2));

  assert_eq!(changes.removed.len(), 8);
  assert_eq!(changes.removed[0], ExternalId(100));
  assert_eq!(changes.created.len(), 1);
  assert_eq!(root.registered_leaf_count(), 0);
}

/// Rewriting a leaf with its own type still replaces it.
#[test]
fn test_same_type_write_still_replaces() {
  let mut root = registered(2, 1);
  let changes = write_block(&mut root, &BlockIndex::root(), VoxelType(2));
  assert_eq!(changes.removed, vec![ExternalId(1)]);
  assert_eq!(changes.created.len(), 1);
  assert!(!changes.is_empty());
}
