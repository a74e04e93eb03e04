//! Volume - the top-level aggregate: field, layered octree and dirty state.
//!
//! All edits go through [`Volume::set`], which writes the field and pushes
//! the new value into every layer whose lattice contains the edited point.
//! The returned [`EditOutcome`] lists the nodes touched; the volume also
//! keeps a [`DirtyTracker`] so an extraction driver can rebuild lazily.
//!
//! Node references obtained from [`Volume::chain`] are only valid until the
//! next mutating call; look nodes up again by id after an edit.

use glam::{IVec3, UVec3};

use crate::config::{validate_iso_level, VolumeConfig};
use crate::dirty::{DirtyRegion, DirtyTracker};
use crate::error::VolumeError;
use crate::field::ScalarField;
use crate::octree::{ChangedNodes, LayerChain, OctreeLayer};

/// Result of a single voxel edit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditOutcome {
  /// Whether any node changed (the mesh needs a rebuild).
  pub changed: bool,
  /// Dirty generation after this edit (unchanged if nothing changed).
  pub generation: u64,
  /// Nodes updated, created or removed by the edit.
  pub nodes: ChangedNodes,
}

/// Scalar field plus the layered octree built over it.
#[derive(Clone, Debug)]
pub struct Volume {
  config: VolumeConfig,
  field: ScalarField,
  chain: LayerChain,
  dirty: DirtyTracker,
}

impl Volume {
  /// Create an empty volume. Every voxel starts at the default density.
  pub fn new(config: VolumeConfig) -> Result<Self, VolumeError> {
    config.validate()?;
    let resolution = config.resolution_vec();
    let chain = LayerChain::new(resolution, config.iso_level);

    tracing::debug!(
      x = resolution.x,
      y = resolution.y,
      z = resolution.z,
      layers = chain.len(),
      "volume created"
    );

    Ok(Self {
      field: ScalarField::new(resolution),
      chain,
      dirty: DirtyTracker::new(),
      config,
    })
  }

  #[inline]
  pub fn config(&self) -> &VolumeConfig {
    &self.config
  }

  /// Voxels per axis.
  #[inline]
  pub fn resolution(&self) -> UVec3 {
    self.field.resolution()
  }

  /// World units per voxel.
  #[inline]
  pub fn scale(&self) -> f32 {
    self.config.scale
  }

  #[inline]
  pub fn iso_level(&self) -> f32 {
    self.chain.iso_level()
  }

  /// Extraction depth budget, clamped to the number of layers.
  #[inline]
  pub fn max_depth_offset(&self) -> u32 {
    self
      .config
      .max_depth_offset
      .min(self.chain.finest_depth() as u32)
  }

  #[inline]
  pub fn field(&self) -> &ScalarField {
    &self.field
  }

  #[inline]
  pub fn chain(&self) -> &LayerChain {
    &self.chain
  }

  /// All layers, coarsest first.
  #[inline]
  pub fn layers(&self) -> &[OctreeLayer] {
    self.chain.layers()
  }

  /// Total number of live nodes.
  #[inline]
  pub fn node_count(&self) -> usize {
    self.chain.node_count()
  }

  /// Live nodes per layer, coarsest first.
  pub fn layer_node_counts(&self) -> Vec<usize> {
    self.chain.layers().iter().map(OctreeLayer::len).collect()
  }

  #[inline]
  pub fn dirty(&self) -> &DirtyTracker {
    &self.dirty
  }

  #[inline]
  pub fn is_dirty(&self) -> bool {
    self.dirty.is_dirty()
  }

  /// Consume pending edits (called by the extraction driver).
  pub(crate) fn take_dirty(&mut self) -> Option<DirtyRegion> {
    self.dirty.take()
  }

  /// Density at `p`, or [`crate::constants::UNKNOWN_DENSITY`] out of range.
  #[inline]
  pub fn get(&self, p: IVec3) -> f32 {
    self.field.get(p)
  }

  /// Write one voxel and propagate it through every layer.
  ///
  /// Values are clamped to `[0, 1]`. Out-of-range coordinates and NaN values
  /// are logged and ignored.
  pub fn set(&mut self, p: IVec3, value: f32) -> EditOutcome {
    let Some(previous) = self.field.set(p, value) else {
      return self.unchanged();
    };
    if previous == self.field.sample(p) {
      return self.unchanged();
    }

    let mut nodes = ChangedNodes::new();
    for depth in 0..self.chain.len() {
      self.chain.handle_push(depth, p, &self.field, &mut nodes);
    }

    if nodes.is_empty() {
      return self.unchanged();
    }

    let generation = self.dirty.mark(p);
    tracing::trace!(x = p.x, y = p.y, z = p.z, nodes = nodes.len(), "voxel edit");
    EditOutcome {
      changed: true,
      generation,
      nodes,
    }
  }

  /// Overwrite every voxel and rebuild the octree in one pass.
  #[tracing::instrument(skip_all, name = "volume::fill_with")]
  pub fn fill_with(&mut self, density: impl FnMut(IVec3) -> f32) {
    self.field.fill_with(density);
    self.chain.rebuild(&self.field);
    self.mark_all_dirty();
  }

  /// Reset the field to the default density and drop every node.
  pub fn clear(&mut self) {
    self.field.reset();
    self.chain.clear();
    self.mark_all_dirty();
  }

  /// Change the surface threshold. Every cached case is re-derived.
  pub fn set_iso_level(&mut self, iso_level: f32) -> Result<(), VolumeError> {
    validate_iso_level(iso_level)?;
    self.config.iso_level = iso_level;
    self.chain.set_iso_level(iso_level, &self.field);
    self.mark_all_dirty();
    Ok(())
  }

  fn mark_all_dirty(&mut self) {
    let max = self.resolution().as_ivec3() - IVec3::ONE;
    self.dirty.mark_region(DirtyRegion { min: IVec3::ZERO, max });
  }

  fn unchanged(&self) -> EditOutcome {
    EditOutcome {
      changed: false,
      generation: self.dirty.generation(),
      nodes: ChangedNodes::new(),
    }
  }
}

#[cfg(test)]
#[path = "volume_test.rs"]
mod volume_test;
