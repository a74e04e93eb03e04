//! MeshExtractor - Marching Cubes over the adaptive octree.
//!
//! A build runs in two phases:
//!
//! 1. **Plan**: walk from the root, descending wherever the detail policy
//!    asks for it, and collect the nodes meshed at their own resolution.
//! 2. **Emit**: for every planned node, place one point per crossed edge
//!    (reconciled against coarser rendered neighbors, otherwise
//!    interpolated) and emit the case triangles into a welding builder.
//!
//! Triangles are emitted counter-clockwise seen from outside, so normals
//! point from high density toward low density.

use glam::Vec3;
use web_time::Instant;

use super::builder::MeshBuilder;
use super::interpolate::vertex_lerp;
use crate::constants::corner_offset;
use crate::edge_table::{EDGE_CORNERS, EDGE_TABLE};
use crate::lod::{DetailPolicy, RenderPlan, SurfaceLodPolicy};
use crate::octree::{LayerChain, OctreeNode};
use crate::reconcile::{EdgeQuery, EdgeReconciler};
use crate::stats::ExtractionStats;
use crate::tri_table::{case_triangles, is_trivial_case};
use crate::types::{MeshOutput, MeshSink};
use crate::volume::Volume;

/// Mesh plus the counters collected while building it.
#[derive(Clone, Debug, Default)]
pub struct Extraction {
  pub mesh: MeshOutput,
  pub stats: ExtractionStats,
}

/// Builds meshes from a [`Volume`] under a detail policy.
#[derive(Clone, Debug, Default)]
pub struct MeshExtractor<P = SurfaceLodPolicy> {
  policy: P,
}

impl MeshExtractor<SurfaceLodPolicy> {
  pub fn new() -> Self {
    Self::default()
  }
}

impl<P: DetailPolicy> MeshExtractor<P> {
  pub fn with_policy(policy: P) -> Self {
    Self { policy }
  }

  #[inline]
  pub fn policy(&self) -> &P {
    &self.policy
  }

  /// Extract the full mesh. Single-threaded; runs to completion.
  #[tracing::instrument(skip_all, name = "mesh::build")]
  pub fn build(&self, volume: &Volume) -> Extraction {
    let start = Instant::now();
    let chain = volume.chain();
    let max_depth_offset = volume.max_depth_offset();

    let plan = {
      let _span = tracing::info_span!("plan").entered();
      RenderPlan::build(chain, &self.policy, max_depth_offset)
    };

    let mut stats = ExtractionStats {
      nodes_visited: plan.visited(),
      ..Default::default()
    };
    let mut builder = MeshBuilder::new();

    {
      let _span = tracing::info_span!("emit", nodes = plan.len()).entered();
      let reconciler = EdgeReconciler::new(chain, &plan, max_depth_offset);
      for &id in plan.order() {
        let Some(node) = chain.node(id) else {
          continue;
        };
        emit_node(chain, node, &reconciler, &mut builder, &mut stats);
      }
    }

    let mesh = builder.finish(volume.scale());
    stats.triangles = mesh.triangle_count();
    stats.vertices = mesh.vertices.len();
    stats.build_time_us = start.elapsed().as_micros() as u64;

    tracing::debug!(
      triangles = stats.triangles,
      vertices = stats.vertices,
      meshed = stats.total_meshed(),
      overrides = stats.total_overrides(),
      degenerate = stats.degenerate_triangles,
      time_us = stats.build_time_us,
      "mesh extracted"
    );

    Extraction { mesh, stats }
  }

  /// Build and hand the mesh to `sink` only if the volume changed since the
  /// last build. Returns the stats when a build happened.
  pub fn rebuild_if_dirty(
    &self,
    volume: &mut Volume,
    sink: &mut impl MeshSink,
  ) -> Option<ExtractionStats> {
    let region = volume.take_dirty()?;
    tracing::trace!(
      min = ?region.min,
      max = ?region.max,
      generation = volume.dirty().generation(),
      "rebuilding dirty volume"
    );
    let extraction = self.build(volume);
    extraction.mesh.write_to(sink);
    Some(extraction.stats)
  }
}

/// Emit the Marching Cubes triangles of one node at its own resolution.
fn emit_node(
  chain: &LayerChain,
  node: &OctreeNode,
  reconciler: &EdgeReconciler<'_>,
  builder: &mut MeshBuilder,
  stats: &mut ExtractionStats,
) {
  stats.record_meshed(node.layer());
  let case = node.case_index();
  if is_trivial_case(case) {
    stats.trivial_cells += 1;
    return;
  }
  let Some((origin, stride)) = chain.node_extent(node) else {
    return;
  };

  let iso_level = chain.iso_level();
  let crossed = EDGE_TABLE[case as usize];
  let mut points = [Vec3::ZERO; 12];
  for (edge, &[c0, c1]) in EDGE_CORNERS.iter().enumerate() {
    if crossed & (1 << edge) == 0 {
      continue;
    }
    let a = origin + corner_offset(c0) * stride;
    let b = origin + corner_offset(c1) * stride;
    let query = EdgeQuery::new(a, b, node.corner(c0), node.corner(c1));

    points[edge] = match reconciler.override_edge(&query) {
      Some(edge_override) => {
        stats.record_override(edge_override.kind());
        edge_override.point()
      }
      None => {
        stats.direct_edges += 1;
        vertex_lerp(
          iso_level,
          query.a.as_vec3(),
          query.b.as_vec3(),
          query.value_a,
          query.value_b,
        )
      }
    };
  }

  for [e0, e1, e2] in case_triangles(case) {
    // Table triangles face the inside; swap to face out.
    if builder
      .add_triangle(points[e0], points[e2], points[e1])
      .is_err()
    {
      stats.degenerate_triangles += 1;
    }
  }
}

#[cfg(test)]
#[path = "extractor_test.rs"]
mod extractor_test;
