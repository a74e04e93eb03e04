//! Level-of-detail selection.
//!
//! A node may be meshed at its own resolution only when doing so reproduces
//! the topology its finer data would produce: a single surface sheet and at
//! most one crossing per cell edge. [`SurfaceLodPolicy`] implements that
//! test; [`RenderPlan`] applies any [`DetailPolicy`] top-down to decide which
//! nodes are rendered.
//!
//! # Decision Order
//!
//! ```text
//! budget == 0 or finest layer        -> keep (no finer data reachable)
//! no children                        -> keep
//! node case not simple               -> descend
//! any child not simple / needs more  -> descend
//! any edge crossed twice below       -> descend
//! otherwise                          -> keep
//! ```

use std::collections::HashSet;

use crate::constants::CORNER_TO_OCTANT;
use crate::edge_table::EDGE_CORNERS;
use crate::octree::{LayerChain, NodeId, OctreeNode};
use crate::tri_table::is_simple_case;

/// Decides whether a node must be replaced by its children when meshing.
///
/// `budget` is how many more layers the walk may descend below `node`.
pub trait DetailPolicy {
  fn requires_higher_detail(&self, chain: &LayerChain, node: &OctreeNode, budget: u32) -> bool;
}

impl<P: DetailPolicy + ?Sized> DetailPolicy for &P {
  fn requires_higher_detail(&self, chain: &LayerChain, node: &OctreeNode, budget: u32) -> bool {
    (**self).requires_higher_detail(chain, node, budget)
  }
}

/// Topology-preserving LOD heuristic.
#[derive(Clone, Copy, Debug, Default)]
pub struct SurfaceLodPolicy;

impl DetailPolicy for SurfaceLodPolicy {
  fn requires_higher_detail(&self, chain: &LayerChain, node: &OctreeNode, budget: u32) -> bool {
    if budget == 0 || chain.is_finest(node.layer()) {
      return false;
    }
    if !node.has_children() {
      return false;
    }
    if !is_simple_case(node.case_index()) {
      return true;
    }

    let child_budget = budget - 1;
    for (_, child) in chain.children(node) {
      if !is_simple_case(child.case_index())
        || self.requires_higher_detail(chain, child, child_budget)
      {
        return true;
      }
    }

    has_multiple_intersections(chain, node)
  }
}

/// Whether any of the node's 12 edges is crossed more than once by the
/// surface at the finest available resolution.
pub fn has_multiple_intersections(chain: &LayerChain, node: &OctreeNode) -> bool {
  (0..12).any(|edge| edge_crossings(chain, node, edge) >= 2)
}

/// Number of sign changes along one edge, counted through descendants.
///
/// The edge splits into two halves owned by the children at its endpoints;
/// each half is the same edge index in that child. An absent child is
/// trivial, so its half contributes nothing. Without any children the
/// node's own corners decide.
pub fn edge_crossings(chain: &LayerChain, node: &OctreeNode, edge: usize) -> u32 {
  let Some(&[c0, c1]) = EDGE_CORNERS.get(edge) else {
    return 0;
  };

  let mut any_child = false;
  let mut total = 0;
  for corner in [c0, c1] {
    if let Some(child) = chain.child(node, CORNER_TO_OCTANT[corner]) {
      any_child = true;
      total += edge_crossings(chain, child, edge);
    }
  }

  if any_child {
    total
  } else {
    let case = node.case_index();
    u32::from(((case >> c0) ^ (case >> c1)) & 1 == 1)
  }
}

/// The set of nodes meshed at their own resolution for one build.
///
/// Produced by walking from the root and descending wherever the policy
/// requires more detail. Absent children are holes and contribute nothing.
#[derive(Clone, Debug, Default)]
pub struct RenderPlan {
  rendered: HashSet<NodeId>,
  order: Vec<NodeId>,
  visited: usize,
}

impl RenderPlan {
  #[tracing::instrument(skip_all, name = "lod::plan")]
  pub fn build<P: DetailPolicy>(chain: &LayerChain, policy: &P, max_depth_offset: u32) -> Self {
    let mut plan = Self::default();
    if let Some(root) = chain.root() {
      plan.walk(chain, policy, root, max_depth_offset);
    }
    plan
  }

  fn walk<P: DetailPolicy>(
    &mut self,
    chain: &LayerChain,
    policy: &P,
    node: &OctreeNode,
    budget: u32,
  ) {
    self.visited += 1;
    if policy.requires_higher_detail(chain, node, budget) {
      let child_budget = budget.saturating_sub(1);
      for (_, child) in chain.children(node) {
        self.walk(chain, policy, child, child_budget);
      }
    } else {
      self.rendered.insert(node.id());
      self.order.push(node.id());
    }
  }

  /// Whether a node is meshed at its own resolution.
  #[inline]
  pub fn is_rendered(&self, id: NodeId) -> bool {
    self.rendered.contains(&id)
  }

  /// Rendered nodes in depth-first order.
  #[inline]
  pub fn order(&self) -> &[NodeId] {
    &self.order
  }

  /// Nodes reached by the walk, rendered or not.
  #[inline]
  pub fn visited(&self) -> usize {
    self.visited
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.order.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.order.is_empty()
  }
}

#[cfg(test)]
#[path = "lod_test.rs"]
mod lod_test;
