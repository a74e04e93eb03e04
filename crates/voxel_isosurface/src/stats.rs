//! Counters collected during one extraction pass.

use crate::constants::MAX_LAYERS;

/// Kind of edge override applied by the reconciler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverrideKind {
  /// Coarse edge reused exactly.
  Inline,
  /// Fine point projected onto a coarse face contour.
  FaceProjected,
  /// Coarse face had a degenerate crossing count; fine point kept.
  FaceFallback,
}

/// Statistics from one extraction pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ExtractionStats {
  /// Nodes reached by the depth-first walk.
  pub nodes_visited: usize,
  /// Nodes meshed at their own resolution, indexed by layer depth.
  pub nodes_meshed: [usize; MAX_LAYERS],
  /// Meshed nodes whose case was 0 or 255.
  pub trivial_cells: usize,
  /// Edges resolved by reusing a coarse edge.
  pub inline_overrides: usize,
  /// Edges resolved by projection onto a coarse face.
  pub face_overrides: usize,
  /// Edges on a coarse face with a degenerate contour.
  pub face_fallbacks: usize,
  /// Edges no coarser rendered node could answer (direct interpolation).
  pub direct_edges: usize,
  /// Triangles dropped for coincident vertices or a zero/NaN normal.
  pub degenerate_triangles: usize,
  /// Triangles in the output mesh.
  pub triangles: usize,
  /// Vertices in the output mesh after welding.
  pub vertices: usize,
  /// Wall-clock duration of the pass in microseconds.
  pub build_time_us: u64,
}

impl ExtractionStats {
  /// Record one applied override.
  #[inline]
  pub fn record_override(&mut self, kind: OverrideKind) {
    match kind {
      OverrideKind::Inline => self.inline_overrides += 1,
      OverrideKind::FaceProjected => self.face_overrides += 1,
      OverrideKind::FaceFallback => self.face_fallbacks += 1,
    }
  }

  /// Record a node meshed at `depth`.
  #[inline]
  pub fn record_meshed(&mut self, depth: usize) {
    if let Some(count) = self.nodes_meshed.get_mut(depth) {
      *count += 1;
    }
  }

  /// Total overrides of any kind.
  #[inline]
  pub fn total_overrides(&self) -> usize {
    self.inline_overrides + self.face_overrides + self.face_fallbacks
  }

  /// Total nodes meshed across all layers.
  pub fn total_meshed(&self) -> usize {
    self.nodes_meshed.iter().sum()
  }
}
