use super::*;

fn registered(voxel: i32, id: u64) -> Node {
  Node::Leaf {
    voxel: VoxelType(voxel),
    external_id: Some(ExternalId(id)),
  }
}

/// A fresh leaf carries no id.
#[test]
fn test_leaf_defaults() {
  let node = Node::leaf(VoxelType(4));
  assert!(node.is_leaf());
  assert_eq!(node.voxel(), Some(VoxelType(4)));
  assert_eq!(node.external_id(), None);
  assert!(node.children().is_none());
  assert_eq!(node.leaf_count(), 1);
  assert_eq!(node.max_depth(), 0);
}

/// Subdividing copies the type into all 8 children and hands back the id.
#[test]
fn test_subdivide_copies_type() {
  let mut node = registered(2, 11);
  assert_eq!(node.subdivide(), Some(ExternalId(11)));

  let children = node.children().expect("Should be a branch");
  for (octant, child) in children.iter().enumerate() {
    assert_eq!(child.voxel(), Some(VoxelType(2)), "Octant {}", octant);
    assert_eq!(child.external_id(), None);
  }
  assert_eq!(node.leaf_count(), 8);
  assert_eq!(node.max_depth(), 1);
}

#[test]
fn test_subdivide_branch_is_noop() {
  let mut node = Node::leaf(VoxelType(1));
  node.subdivide();
  let before = node.clone();
  assert_eq!(node.subdivide(), None);
  assert_eq!(node, before);
}

#[test]
fn test_get_follows_path() {
  let mut root = Node::leaf(VoxelType(0));
  root.subdivide();
  root.get_mut(&BlockIndex::new(&[3]).unwrap()).unwrap().subdivide();

  let deep = BlockIndex::new(&[3, 6]).unwrap();
  assert_eq!(root.get(&deep).and_then(Node::voxel), Some(VoxelType(0)));
  assert!(root.get(&BlockIndex::new(&[3]).unwrap()).is_some_and(|n| !n.is_leaf()));

  // Path runs past a leaf
  assert!(root.get(&BlockIndex::new(&[2, 0]).unwrap()).is_none());
  assert_eq!(root.max_depth(), 2);
  assert_eq!(root.leaf_count(), 15);
}

#[test]
fn test_replace_collects_ids_depth_first() {
  let mut root = Node::Branch(Box::new(std::array::from_fn(|octant| {
    if octant % 2 == 0 {
      registered(1, octant as u64)
    } else {
      Node::leaf(VoxelType(0))
    }
  })));

  let mut removed = Vec::new();
  root.replace_with_leaf(VoxelType(9), &mut removed);

  assert_eq!(
    removed,
    vec![ExternalId(0), ExternalId(2), ExternalId(4), ExternalId(6)]
  );
  assert_eq!(root, Node::leaf(VoxelType(9)));
}

#[test]
fn test_attach_external_id() {
  let mut root = Node::leaf(VoxelType(1));
  root.subdivide();

  let index = BlockIndex::new(&[5]).unwrap();
  assert!(root.attach_external_id(&index, ExternalId(42)));
  assert_eq!(root.get(&index).unwrap().external_id(), Some(ExternalId(42)));
  assert_eq!(root.registered_leaf_count(), 1);

  // Branches and missing paths are rejected
  assert!(!root.attach_external_id(&BlockIndex::root(), ExternalId(1)));
  assert!(!root.attach_external_id(&BlockIndex::new(&[5, 0]).unwrap(), ExternalId(1)));
}

#[test]
fn test_solid_leaf_count_ignores_air() {
  let mut root = Node::leaf(VoxelType(0));
  root.subdivide();
  root.get_mut(&BlockIndex::new(&[1]).unwrap()).unwrap().replace_with_leaf(VoxelType(3), &mut Vec::new());
  assert_eq!(root.leaf_count(), 8);
  assert_eq!(root.solid_leaf_count(), 1);
}
