//! OctreeLayer - all nodes of one resolution level.
//!
//! A layer covers the volume with cells of edge length `stride` (a power of
//! two). Cell `(cx, cy, cz)` spans lattice points `c * stride ..= (c + 1) *
//! stride` on each axis; its id is the flattened cell coordinate offset by
//! the first id of the layer.
//!
//! ```text
//! Layer ids are contiguous and disjoint (coarsest first):
//!
//!   layer 0 (stride 16):  [0 ..= 0]
//!   layer 1 (stride 8):   [1 ..= 8]
//!   layer 2 (stride 4):   [9 ..= 72]
//!   ...
//! ```

use std::collections::HashMap;

use glam::{IVec3, UVec3};

use super::node::{NodeId, OctreeNode};
use crate::constants::corner_offset;
use crate::field::ScalarField;

/// One resolution level of the layered octree.
#[derive(Clone, Debug)]
pub struct OctreeLayer {
  depth: usize,
  stride: i32,
  dims: IVec3,
  start: u64,
  nodes: HashMap<NodeId, OctreeNode>,
}

impl OctreeLayer {
  /// Create an empty layer for `resolution` voxels at the given stride.
  ///
  /// Cells per axis are `ceil(resolution / stride)`: the last cell may
  /// reach one lattice point past the field, which reads as empty.
  pub fn new(depth: usize, stride: i32, resolution: UVec3, start: u64) -> Self {
    let res = resolution.as_ivec3();
    let dims = (res + IVec3::splat(stride - 1)) / stride;
    Self {
      depth,
      stride,
      dims,
      start,
      nodes: HashMap::new(),
    }
  }

  /// Position in the chain (0 = coarsest).
  #[inline]
  pub fn depth(&self) -> usize {
    self.depth
  }

  /// Cell edge length in voxels.
  #[inline]
  pub fn stride(&self) -> i32 {
    self.stride
  }

  /// Cells per axis.
  #[inline]
  pub fn dims(&self) -> IVec3 {
    self.dims
  }

  /// Number of addressable cells (not the number of live nodes).
  #[inline]
  pub fn cell_count(&self) -> u64 {
    (self.dims.x as u64) * (self.dims.y as u64) * (self.dims.z as u64)
  }

  /// First id owned by this layer.
  #[inline]
  pub fn start(&self) -> u64 {
    self.start
  }

  /// Last id owned by this layer.
  #[inline]
  pub fn end(&self) -> u64 {
    self.start + self.cell_count() - 1
  }

  #[inline]
  pub fn owns(&self, id: NodeId) -> bool {
    (self.start..=self.end()).contains(&id.0)
  }

  /// Id of a cell, or `None` if the cell is outside the layer.
  pub fn node_id(&self, cell: IVec3) -> Option<NodeId> {
    if cell.cmplt(IVec3::ZERO).any() || cell.cmpge(self.dims).any() {
      return None;
    }
    let (w, h) = (self.dims.x as u64, self.dims.y as u64);
    let local = cell.x as u64 + w * (cell.y as u64 + h * cell.z as u64);
    Some(NodeId(self.start + local))
  }

  /// Cell coordinate of an id owned by this layer.
  pub fn cell_of(&self, id: NodeId) -> Option<IVec3> {
    if !self.owns(id) {
      return None;
    }
    let local = id.0 - self.start;
    let (w, h) = (self.dims.x as u64, self.dims.y as u64);
    Some(IVec3::new(
      (local % w) as i32,
      ((local / w) % h) as i32,
      (local / (w * h)) as i32,
    ))
  }

  /// Lattice position of a cell's minimum corner.
  #[inline]
  pub fn cell_origin(&self, cell: IVec3) -> IVec3 {
    cell * self.stride
  }

  /// Lattice position of a node's minimum corner.
  pub fn node_origin(&self, id: NodeId) -> Option<IVec3> {
    self.cell_of(id).map(|cell| self.cell_origin(cell))
  }

  /// Whether a lattice point sits on this layer's lattice.
  #[inline]
  pub fn is_aligned(&self, p: IVec3) -> bool {
    p.x % self.stride == 0 && p.y % self.stride == 0 && p.z % self.stride == 0
  }

  /// Build a node for a cell by sampling its 8 corners from the field.
  pub fn sample_node(&self, id: NodeId, field: &ScalarField, iso_level: f32) -> Option<OctreeNode> {
    let origin = self.node_origin(id)?;
    let corners =
      std::array::from_fn(|corner| field.sample(origin + corner_offset(corner) * self.stride));
    Some(OctreeNode::new(id, self.depth, corners, iso_level))
  }

  #[inline]
  pub fn get(&self, id: NodeId) -> Option<&OctreeNode> {
    self.nodes.get(&id)
  }

  #[inline]
  pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut OctreeNode> {
    self.nodes.get_mut(&id)
  }

  /// Live node at a cell, if any.
  pub fn node_at(&self, cell: IVec3) -> Option<&OctreeNode> {
    self.node_id(cell).and_then(|id| self.nodes.get(&id))
  }

  #[inline]
  pub fn contains(&self, id: NodeId) -> bool {
    self.nodes.contains_key(&id)
  }

  pub(crate) fn insert(&mut self, node: OctreeNode) {
    self.nodes.insert(node.id(), node);
  }

  pub(crate) fn remove(&mut self, id: NodeId) -> Option<OctreeNode> {
    self.nodes.remove(&id)
  }

  pub(crate) fn clear(&mut self) {
    self.nodes.clear();
  }

  /// Number of live nodes.
  #[inline]
  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  /// Iterate over live nodes (arbitrary order).
  pub fn nodes(&self) -> impl Iterator<Item = &OctreeNode> {
    self.nodes.values()
  }
}

#[cfg(test)]
#[path = "layer_test.rs"]
mod layer_test;
