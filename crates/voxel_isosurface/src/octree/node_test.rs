use super::*;

const ISO: f32 = 0.15;

fn empty_node() -> OctreeNode {
  OctreeNode::new(NodeId(7), 2, [0.0; 8], ISO)
}

#[test]
fn test_new_node_derives_case_and_stats() {
  let corners = [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0];
  let node = OctreeNode::new(NodeId(3), 1, corners, ISO);

  assert_eq!(node.case_index(), 0b1000_0001);
  assert!((node.mean() - 0.25).abs() < 1e-6);
  // Population std-dev of {1,1,0,0,0,0,0,0} = sqrt(0.1875)
  assert!((node.std_dev() - 0.1875f32.sqrt()).abs() < 1e-6);
  assert_eq!(node.layer(), 1);
  assert_eq!(node.id(), NodeId(3));
}

#[test]
fn test_push_sets_and_clears_case_bit() {
  let mut node = empty_node();

  assert_eq!(node.push(4, 1.0, ISO), PushOutcome::Updated);
  assert_eq!(node.case_index(), 1 << 4);
  assert_eq!(node.corner(4), 1.0);

  assert_eq!(node.push(4, 0.0, ISO), PushOutcome::Deletable);
  assert_eq!(node.case_index(), 0);
}

#[test]
fn test_push_same_value_is_unchanged() {
  let mut node = empty_node();
  node.push(2, 0.5, ISO);
  assert_eq!(node.push(2, 0.5, ISO), PushOutcome::Unchanged);
}

#[test]
fn test_push_at_iso_level_counts_as_inside() {
  let mut node = empty_node();
  node.push(0, ISO, ISO);
  assert_eq!(node.case_index(), 1);
}

#[test]
fn test_push_below_iso_keeps_case_but_updates_stats() {
  let mut node = empty_node();
  node.push(1, 1.0, ISO);
  node.push(3, 0.1, ISO);
  assert_eq!(node.case_index(), 1 << 1);
  assert!((node.mean() - 1.1 / 8.0).abs() < 1e-6);
}

#[test]
fn test_invalid_corner_leaves_node_untouched() {
  let mut node = empty_node();
  node.push(0, 1.0, ISO);
  let before = node.clone();

  assert_eq!(node.push(8, 1.0, ISO), PushOutcome::Unchanged);
  assert_eq!(node, before);
}

#[test]
fn test_children_keep_trivial_node_alive() {
  let mut node = empty_node();
  node.push(0, 1.0, ISO);
  node.set_child(5, true);
  assert!(node.has_child(5));

  assert_eq!(node.push(0, 0.0, ISO), PushOutcome::Updated);
  assert!(node.is_trivial());
  assert!(!node.is_deletable());

  node.set_child(5, false);
  assert!(node.is_deletable());
}

#[test]
fn test_fully_inside_node_is_deletable() {
  let node = OctreeNode::new(NodeId(0), 0, [1.0; 8], ISO);
  assert_eq!(node.case_index(), 255);
  assert!(node.is_deletable());
}

#[test]
fn test_refresh_case_after_iso_change() {
  let mut node = OctreeNode::new(NodeId(0), 0, [0.3; 8], ISO);
  assert_eq!(node.case_index(), 255);

  node.refresh_case(0.5);
  assert_eq!(node.case_index(), 0);
}
