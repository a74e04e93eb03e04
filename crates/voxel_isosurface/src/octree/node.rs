//! OctreeNode - one cell of one layer, with cached corner densities.
//!
//! Every node has the same representation regardless of depth: the 8 corner
//! densities of its cell, the derived case mask, a child-presence mask and
//! the mean / standard deviation of the corners. Corners are written
//! independently as the underlying voxels change, so a node never reads the
//! field except when it is first built.

use crate::constants::is_inside;
use crate::tri_table::is_trivial_case;

/// Globally unique node identifier.
///
/// Encodes the flattened cell coordinate within the owning layer, offset by
/// the first id of that layer. Layers own disjoint, contiguous id ranges, so
/// the owning layer can be found from the id alone.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl NodeId {
  /// Get the raw ID value.
  #[inline]
  pub fn raw(&self) -> u64 {
    self.0
  }
}

/// Result of pushing one corner value into a node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PushOutcome {
  /// Value and case were already up to date.
  Unchanged,
  /// Corner cache (and possibly case) changed; node stays.
  Updated,
  /// Node is now trivial with no children and should be removed.
  Deletable,
}

/// Octree node with cached corner densities.
#[derive(Clone, Debug, PartialEq)]
pub struct OctreeNode {
  id: NodeId,
  /// Index of the owning layer in the chain (0 = coarsest). Not ownership.
  layer: usize,
  corners: [f32; 8],
  case_index: u8,
  child_mask: u8,
  mean: f32,
  std_dev: f32,
}

impl OctreeNode {
  /// Build a node from its 8 corner densities (Marching Cubes order).
  pub fn new(id: NodeId, layer: usize, corners: [f32; 8], iso_level: f32) -> Self {
    let mut node = Self {
      id,
      layer,
      corners,
      case_index: 0,
      child_mask: 0,
      mean: 0.0,
      std_dev: 0.0,
    };
    node.refresh_case(iso_level);
    node.refresh_stats();
    node
  }

  #[inline]
  pub fn id(&self) -> NodeId {
    self.id
  }

  /// Index of the owning layer (0 = coarsest).
  #[inline]
  pub fn layer(&self) -> usize {
    self.layer
  }

  #[inline]
  pub fn corners(&self) -> &[f32; 8] {
    &self.corners
  }

  #[inline]
  pub fn corner(&self, corner: usize) -> f32 {
    self.corners[corner]
  }

  /// 8-bit case mask: bit `i` set iff corner `i` is inside.
  #[inline]
  pub fn case_index(&self) -> u8 {
    self.case_index
  }

  /// Child presence mask, one bit per octant.
  #[inline]
  pub fn child_mask(&self) -> u8 {
    self.child_mask
  }

  #[inline]
  pub fn has_children(&self) -> bool {
    self.child_mask != 0
  }

  #[inline]
  pub fn has_child(&self, octant: u8) -> bool {
    octant < 8 && self.child_mask & (1 << octant) != 0
  }

  #[inline]
  pub fn mean(&self) -> f32 {
    self.mean
  }

  #[inline]
  pub fn std_dev(&self) -> f32 {
    self.std_dev
  }

  /// Fully outside or fully inside.
  #[inline]
  pub fn is_trivial(&self) -> bool {
    is_trivial_case(self.case_index)
  }

  /// Trivial with no children: nothing to mesh and nothing below it.
  #[inline]
  pub fn is_deletable(&self) -> bool {
    self.is_trivial() && !self.has_children()
  }

  /// Update one cached corner.
  ///
  /// O(1): touches only this node. An out-of-range corner is a caller bug; it
  /// is logged and the node is left untouched.
  pub fn push(&mut self, corner: usize, value: f32, iso_level: f32) -> PushOutcome {
    if corner >= 8 {
      tracing::error!(corner, node = self.id.0, "invalid corner pushed into node");
      return PushOutcome::Unchanged;
    }

    if self.corners[corner] == value {
      return PushOutcome::Unchanged;
    }

    self.corners[corner] = value;
    if is_inside(value, iso_level) {
      self.case_index |= 1 << corner;
    } else {
      self.case_index &= !(1 << corner);
    }
    self.refresh_stats();

    if self.is_deletable() {
      PushOutcome::Deletable
    } else {
      PushOutcome::Updated
    }
  }

  /// Mark a child octant present or absent.
  pub fn set_child(&mut self, octant: u8, present: bool) {
    if octant >= 8 {
      tracing::error!(octant, node = self.id.0, "invalid child octant");
      return;
    }
    if present {
      self.child_mask |= 1 << octant;
    } else {
      self.child_mask &= !(1 << octant);
    }
  }

  /// Recompute the whole case mask, e.g. after an iso-level change.
  pub fn refresh_case(&mut self, iso_level: f32) {
    self.case_index = self
      .corners
      .iter()
      .enumerate()
      .filter(|(_, &value)| is_inside(value, iso_level))
      .fold(0u8, |mask, (corner, _)| mask | (1 << corner));
  }

  fn refresh_stats(&mut self) {
    let mean = self.corners.iter().sum::<f32>() / 8.0;
    let variance = self
      .corners
      .iter()
      .map(|&v| (v - mean) * (v - mean))
      .sum::<f32>()
      / 8.0;
    self.mean = mean;
    self.std_dev = variance.sqrt();
  }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
