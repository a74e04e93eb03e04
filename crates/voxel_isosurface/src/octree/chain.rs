//! LayerChain - the ordered list of layers, coarsest first.
//!
//! The chain owns every layer, and each layer owns its nodes. Parent/child
//! links are never pointers: they are computed from ids by coordinate
//! arithmetic and resolved by table lookup in the adjacent layer.
//!
//! ```text
//!   depth 0   stride 2^k   (root, one cell)    previous: none
//!   depth 1   stride 2^k-1
//!   ...
//!   depth k   stride 1     (finest)            next: none
//! ```
//!
//! # Node Lifetime
//!
//! A node is live iff it is non-trivial (the surface crosses its cell) or it
//! has live children. Nodes are created lazily when an edit makes a cell
//! non-trivial (ancestors are created on demand so every live node is
//! reachable from the root) and removed as soon as they become trivial and
//! childless, cascading upward.

use glam::{IVec3, UVec3};
use smallvec::SmallVec;

use super::layer::OctreeLayer;
use super::node::{NodeId, OctreeNode, PushOutcome};
use crate::constants::{octant_offset, offset_octant, OCTANT_TO_CORNER};
use crate::field::ScalarField;

/// Nodes touched by one edit: updated, created or removed.
pub type ChangedNodes = SmallVec<[NodeId; 16]>;

/// Layered octree: every resolution level from the root down to stride 1.
#[derive(Clone, Debug)]
pub struct LayerChain {
  layers: Vec<OctreeLayer>,
  iso_level: f32,
}

impl LayerChain {
  /// Create empty layers covering `resolution` voxels.
  ///
  /// The root stride is the smallest power of two covering the largest axis,
  /// so the coarsest layer always holds a single cell.
  pub fn new(resolution: UVec3, iso_level: f32) -> Self {
    let root_stride = resolution.max_element().max(1).next_power_of_two();
    let layer_count = root_stride.trailing_zeros() as usize + 1;

    let mut layers = Vec::with_capacity(layer_count);
    let mut start = 0u64;
    for depth in 0..layer_count {
      let stride = (root_stride >> depth) as i32;
      let layer = OctreeLayer::new(depth, stride, resolution, start);
      start = layer.end() + 1;
      layers.push(layer);
    }

    Self { layers, iso_level }
  }

  #[inline]
  pub fn iso_level(&self) -> f32 {
    self.iso_level
  }

  /// All layers, coarsest first.
  #[inline]
  pub fn layers(&self) -> &[OctreeLayer] {
    &self.layers
  }

  #[inline]
  pub fn layer(&self, depth: usize) -> Option<&OctreeLayer> {
    self.layers.get(depth)
  }

  /// Number of layers.
  #[inline]
  pub fn len(&self) -> usize {
    self.layers.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.layers.iter().all(OctreeLayer::is_empty)
  }

  /// Depth of the stride-1 layer.
  #[inline]
  pub fn finest_depth(&self) -> usize {
    self.layers.len() - 1
  }

  #[inline]
  pub fn is_finest(&self, depth: usize) -> bool {
    depth >= self.finest_depth()
  }

  /// Total number of live nodes across all layers.
  pub fn node_count(&self) -> usize {
    self.layers.iter().map(OctreeLayer::len).sum()
  }

  /// The root node, if the volume has any surface at all.
  pub fn root(&self) -> Option<&OctreeNode> {
    let layer = self.layers.first()?;
    layer.get(NodeId(layer.start()))
  }

  // ===========================================================================
  // Id resolution
  // ===========================================================================

  /// Find the layer owning `id`, starting the search at layer `from`.
  ///
  /// Ids below the layer's range are forwarded to the previous (coarser)
  /// layer, ids above it to the next (finer) layer.
  pub fn owning_layer(&self, from: usize, id: NodeId) -> Option<usize> {
    let layer = self.layers.get(from)?;
    if id.0 < layer.start() {
      let previous = from.checked_sub(1)?;
      self.owning_layer(previous, id)
    } else if id.0 > layer.end() {
      self.owning_layer(from + 1, id)
    } else {
      Some(from)
    }
  }

  /// Look up a live node, forwarding through the chain from layer `from`.
  pub fn attempt_node_fetch(&self, from: usize, id: NodeId) -> Option<&OctreeNode> {
    let depth = self.owning_layer(from, id)?;
    self.layers[depth].get(id)
  }

  /// Look up a live node anywhere in the chain.
  #[inline]
  pub fn node(&self, id: NodeId) -> Option<&OctreeNode> {
    self.attempt_node_fetch(0, id)
  }

  /// Live node at a cell of a given layer.
  pub fn node_at(&self, depth: usize, cell: IVec3) -> Option<&OctreeNode> {
    self.layers.get(depth)?.node_at(cell)
  }

  /// Layer depth and cell coordinate of an id.
  pub fn locate(&self, id: NodeId) -> Option<(usize, IVec3)> {
    let depth = self.owning_layer(0, id)?;
    let cell = self.layers[depth].cell_of(id)?;
    Some((depth, cell))
  }

  /// Lattice-space minimum corner and stride of a node.
  pub fn node_extent(&self, node: &OctreeNode) -> Option<(IVec3, i32)> {
    let layer = self.layers.get(node.layer())?;
    Some((layer.node_origin(node.id())?, layer.stride()))
  }

  // ===========================================================================
  // Parent / child id arithmetic
  // ===========================================================================

  /// Id of the parent cell in the previous (coarser) layer.
  pub fn parent_id(&self, id: NodeId) -> Option<NodeId> {
    let (depth, cell) = self.locate(id)?;
    self.layers.get(depth.checked_sub(1)?)?.node_id(cell / 2)
  }

  /// Id of a child cell in the next (finer) layer.
  ///
  /// Returns `None` at the finest layer or when the child cell falls outside
  /// the finer layer.
  pub fn child_id(&self, id: NodeId, octant: u8) -> Option<NodeId> {
    if octant >= 8 {
      return None;
    }
    let (depth, cell) = self.locate(id)?;
    self
      .layers
      .get(depth + 1)?
      .node_id(cell * 2 + octant_offset(octant))
  }

  /// Octant this cell occupies within its parent.
  pub fn offset_as_child(&self, id: NodeId) -> Option<u8> {
    let (depth, cell) = self.locate(id)?;
    if depth == 0 {
      return None;
    }
    Some(offset_octant(IVec3::new(cell.x & 1, cell.y & 1, cell.z & 1)))
  }

  /// Live child of a node in a given octant.
  pub fn child(&self, node: &OctreeNode, octant: u8) -> Option<&OctreeNode> {
    if !node.has_child(octant) {
      return None;
    }
    let child_id = self.child_id(node.id(), octant)?;
    self.layers.get(node.layer() + 1)?.get(child_id)
  }

  /// Live children of a node with their octants.
  pub fn children<'a>(
    &'a self,
    node: &'a OctreeNode,
  ) -> impl Iterator<Item = (u8, &'a OctreeNode)> + 'a {
    (0..8u8).filter_map(move |octant| self.child(node, octant).map(|child| (octant, child)))
  }

  /// Live parent of a node.
  pub fn parent(&self, node: &OctreeNode) -> Option<&OctreeNode> {
    let parent_id = self.parent_id(node.id())?;
    self.layers.get(node.layer().checked_sub(1)?)?.get(parent_id)
  }

  // ===========================================================================
  // Mutation
  // ===========================================================================

  /// Apply a changed voxel to one layer.
  ///
  /// When `p` lies on this layer's lattice it is a corner of up to 8 cells
  /// (the octants around it). Each live cell gets the corner pushed; absent
  /// cells are created only if the new value makes them non-trivial. Cells
  /// at negative or out-of-range indices are skipped.
  ///
  /// Returns whether any node changed.
  pub fn handle_push(
    &mut self,
    depth: usize,
    p: IVec3,
    field: &ScalarField,
    changed: &mut ChangedNodes,
  ) -> bool {
    let Some(layer) = self.layers.get(depth) else {
      return false;
    };
    if !layer.is_aligned(p) {
      return false;
    }

    let iso_level = self.iso_level;
    let lattice = p / layer.stride();
    let value = field.sample(p);
    let mut any_changed = false;

    for octant in 0..8u8 {
      let cell = lattice - octant_offset(octant);
      if cell.cmplt(IVec3::ZERO).any() {
        continue;
      }
      let Some(id) = self.layers[depth].node_id(cell) else {
        continue;
      };
      let corner = OCTANT_TO_CORNER[octant as usize];

      let outcome = self.layers[depth]
        .get_mut(id)
        .map(|node| node.push(corner, value, iso_level));

      match outcome {
        Some(PushOutcome::Unchanged) => {}
        Some(PushOutcome::Updated) => {
          changed.push(id);
          any_changed = true;
        }
        Some(PushOutcome::Deletable) => {
          self.remove_node(depth, id, changed);
          any_changed = true;
        }
        None => {
          let Some(node) = self.layers[depth].sample_node(id, field, iso_level) else {
            continue;
          };
          if !node.is_deletable() {
            self.insert_node(node, field, changed);
            any_changed = true;
          }
        }
      }
    }

    any_changed
  }

  /// Fetch a node, creating it from the field if absent.
  ///
  /// Newly created nodes are linked into their parent (which is created in
  /// turn if needed). Returns `None` if no layer owns the id.
  pub(crate) fn attempt_node_fetch_or_create(
    &mut self,
    from: usize,
    id: NodeId,
    field: &ScalarField,
    changed: &mut ChangedNodes,
  ) -> Option<&mut OctreeNode> {
    let depth = self.owning_layer(from, id)?;
    if !self.layers[depth].contains(id) {
      let node = self.layers[depth].sample_node(id, field, self.iso_level)?;
      self.insert_node(node, field, changed);
    }
    self.layers[depth].get_mut(id)
  }

  fn insert_node(&mut self, node: OctreeNode, field: &ScalarField, changed: &mut ChangedNodes) {
    let depth = node.layer();
    let id = node.id();
    self.layers[depth].insert(node);
    changed.push(id);
    self.link_to_parent(depth, id, field, changed);
  }

  fn link_to_parent(
    &mut self,
    depth: usize,
    id: NodeId,
    field: &ScalarField,
    changed: &mut ChangedNodes,
  ) {
    let Some(parent_depth) = depth.checked_sub(1) else {
      return;
    };
    let (Some(parent_id), Some(octant)) = (self.parent_id(id), self.offset_as_child(id)) else {
      return;
    };
    if let Some(parent) = self.attempt_node_fetch_or_create(parent_depth, parent_id, field, changed)
    {
      if !parent.has_child(octant) {
        parent.set_child(octant, true);
        changed.push(parent_id);
      }
    }
  }

  /// Remove a node and unlink it from its parent, cascading upward while
  /// parents become trivial and childless.
  fn remove_node(&mut self, depth: usize, id: NodeId, changed: &mut ChangedNodes) {
    if self.layers[depth].remove(id).is_none() {
      return;
    }
    changed.push(id);

    let Some(parent_depth) = depth.checked_sub(1) else {
      return;
    };
    let (Some(parent_id), Some(octant)) = (self.parent_id(id), self.offset_as_child(id)) else {
      return;
    };
    let parent_deletable = match self.layers[parent_depth].get_mut(parent_id) {
      Some(parent) => {
        parent.set_child(octant, false);
        parent.is_deletable()
      }
      None => false,
    };
    if parent_deletable {
      self.remove_node(parent_depth, parent_id, changed);
    }
  }

  /// Drop every node.
  pub fn clear(&mut self) {
    for layer in &mut self.layers {
      layer.clear();
    }
  }

  /// Rebuild every layer from the field in one pass.
  ///
  /// Scans the finest layer; each non-trivial cell is inserted together with
  /// its ancestors. Any coarse cell the surface crosses has a crossed fine
  /// cell below it, so this reaches every node an edit sequence would.
  #[tracing::instrument(skip_all, name = "octree::rebuild")]
  pub fn rebuild(&mut self, field: &ScalarField) {
    self.clear();

    let finest = self.finest_depth();
    let dims = self.layers[finest].dims();
    let iso_level = self.iso_level;
    let mut changed = ChangedNodes::new();

    for z in 0..dims.z {
      for y in 0..dims.y {
        for x in 0..dims.x {
          let Some(id) = self.layers[finest].node_id(IVec3::new(x, y, z)) else {
            continue;
          };
          let Some(node) = self.layers[finest].sample_node(id, field, iso_level) else {
            continue;
          };
          if !node.is_deletable() {
            self.insert_node(node, field, &mut changed);
            changed.clear();
          }
        }
      }
    }

    tracing::debug!(nodes = self.node_count(), layers = self.len(), "octree rebuilt");
  }

  /// Change the iso-level. Every cached case is stale, so the tree is rebuilt.
  pub fn set_iso_level(&mut self, iso_level: f32, field: &ScalarField) {
    self.iso_level = iso_level;
    self.rebuild(field);
  }
}

#[cfg(test)]
#[path = "chain_test.rs"]
mod chain_test;
