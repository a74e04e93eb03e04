use std::collections::HashSet;

use glam::{IVec3, UVec3, Vec3};

use super::*;
use crate::config::VolumeConfig;
use crate::octree::NodeId;
use crate::lod::SurfaceLodPolicy;
use crate::test_utils::{
  assert_watertight, centroid, cubic_volume, filled_volume, height_density, rolling_density,
  signed_volume, sphere_density, spheres_density, tilted_plane_density, uncovered_open_edges,
  FinestPolicy, SplitPolicy, THREE_SPHERES,
};
use crate::tri_table::triangle_count;

#[derive(Default)]
struct CountingSink {
  vertices: usize,
  normals: usize,
  indices: usize,
  calls: usize,
}

impl MeshSink for CountingSink {
  fn set_vertices(&mut self, positions: &[[f32; 3]]) {
    self.vertices = positions.len();
    self.calls += 1;
  }

  fn set_normals(&mut self, normals: &[[f32; 3]]) {
    self.normals = normals.len();
  }

  fn set_triangles(&mut self, indices: &[u32]) {
    self.indices = indices.len();
  }
}

#[test]
fn test_empty_volume_yields_empty_mesh() {
  let volume = cubic_volume(8);
  let extraction = MeshExtractor::new().build(&volume);
  assert!(extraction.mesh.is_empty());
  assert_eq!(extraction.stats.triangles, 0);
  assert_eq!(extraction.stats.nodes_visited, 0);
}

#[test]
fn test_every_case_on_a_unit_cell() {
  let iso = 0.15;
  let chain = LayerChain::new(UVec3::ONE, iso);
  let plan = RenderPlan::default();
  let reconciler = EdgeReconciler::new(&chain, &plan, u32::MAX);

  for case in 0..=255u8 {
    let corners = std::array::from_fn(|c| if case & (1 << c) != 0 { 1.0 } else { 0.0 });
    let node = OctreeNode::new(NodeId(0), 0, corners, iso);
    assert_eq!(node.case_index(), case);

    let mut builder = MeshBuilder::new();
    let mut stats = ExtractionStats::default();
    emit_node(&chain, &node, &reconciler, &mut builder, &mut stats);

    assert_eq!(stats.degenerate_triangles, 0, "case {case}");
    assert_eq!(builder.triangle_count(), triangle_count(case), "case {case}");
    if is_trivial_case(case) {
      assert_eq!(builder.triangle_count(), 0);
      assert_eq!(stats.trivial_cells, 1);
    } else {
      assert!(builder.triangle_count() >= 1, "case {case}");
    }
  }
}

#[test]
fn test_single_voxel_closes_into_octahedron() {
  let mut volume = cubic_volume(16);
  let center = IVec3::new(5, 5, 5);
  volume.set(center, 1.0);

  let extraction = MeshExtractor::new().build(&volume);
  let mesh = &extraction.mesh;
  assert_eq!(mesh.triangle_count(), 8);
  assert_eq!(mesh.vertices.len(), 6);
  assert_watertight(mesh);
  assert!(signed_volume(mesh) > 0.0);

  let c = center.as_vec3();
  for vertex in &mesh.vertices {
    let p = Vec3::from_array(vertex.position);
    assert!(((p - c).length() - 0.85).abs() < 1e-5, "vertex {p}");
    assert!(Vec3::from_array(vertex.normal).dot(p - c) > 0.0);
  }
  assert_eq!(extraction.stats.nodes_meshed[volume.chain().finest_depth()], 8);
}

#[test]
fn test_cleared_voxel_emits_nothing() {
  let mut volume = cubic_volume(16);
  volume.set(IVec3::new(5, 5, 5), 1.0);
  volume.set(IVec3::new(5, 5, 5), 0.0);

  let extraction = MeshExtractor::new().build(&volume);
  assert_eq!(extraction.mesh.triangle_count(), 0);
}

#[test]
fn test_build_is_idempotent() {
  let volume = filled_volume(16, sphere_density(Vec3::new(7.6, 8.3, 7.9), 3.0));
  let extractor = MeshExtractor::new();
  let first = extractor.build(&volume);
  let second = extractor.build(&volume);

  assert!(!first.mesh.is_empty());
  assert_eq!(first.mesh, second.mesh);
}

#[test]
fn test_sphere_at_finest_resolution_is_closed() {
  let volume = filled_volume(16, sphere_density(Vec3::new(7.6, 8.3, 7.9), 3.0));
  let extraction = MeshExtractor::with_policy(FinestPolicy).build(&volume);
  let mesh = &extraction.mesh;

  assert_watertight(mesh);
  // Iso 0.15 sits 1.4 voxels outside the 0.5 shell.
  let radius = 4.4f32;
  let expected = 4.0 / 3.0 * std::f32::consts::PI * radius.powi(3);
  let actual = signed_volume(mesh);
  assert!((actual - expected).abs() / expected < 0.1, "{actual} vs {expected}");
  assert_eq!(extraction.stats.total_overrides(), 0);
}

#[test]
fn test_welded_positions_are_unique() {
  let volume = filled_volume(16, sphere_density(Vec3::new(7.6, 8.3, 7.9), 4.0));
  let mesh = MeshExtractor::new().build(&volume).mesh;

  let mut seen = HashSet::new();
  for vertex in &mesh.vertices {
    assert!(seen.insert(vertex.position.map(f32::to_bits)), "duplicate {:?}", vertex.position);
  }
}

#[test]
fn test_no_degenerate_triangles_survive() {
  let volume = filled_volume(16, height_density);
  let policy = SplitPolicy {
    split_x: 8,
    coarse_stride: 4,
  };
  let mesh = MeshExtractor::with_policy(policy).build(&volume).mesh;

  for tri in mesh.indices.chunks_exact(3) {
    assert!(tri[0] != tri[1] && tri[1] != tri[2] && tri[0] != tri[2]);
  }
}

#[test]
fn test_planar_surface_coarsens() {
  let volume = filled_volume(16, tilted_plane_density);
  let adaptive = MeshExtractor::new().build(&volume);
  let finest = MeshExtractor::with_policy(FinestPolicy).build(&volume);

  let finest_depth = volume.chain().finest_depth();
  let coarse_meshed: usize = adaptive.stats.nodes_meshed[..finest_depth].iter().sum();
  assert!(coarse_meshed > 0);
  assert!(adaptive.mesh.triangle_count() < finest.mesh.triangle_count());
  assert!(signed_volume(&adaptive.mesh).is_finite());
}

#[test]
fn test_coarse_fine_boundary_is_stitched() {
  let volume = filled_volume(16, height_density);
  let policy = SplitPolicy {
    split_x: 8,
    coarse_stride: 4,
  };
  let extraction = MeshExtractor::with_policy(policy).build(&volume);
  let mesh = &extraction.mesh;

  let finest_depth = volume.chain().finest_depth();
  assert!(extraction.stats.nodes_meshed[finest_depth - 2] > 0);
  assert!(extraction.stats.nodes_meshed[finest_depth] > 0);
  assert!(extraction.stats.inline_overrides > 0);
  assert!(extraction.stats.face_overrides > 0);

  // Which sides of x = 8 each vertex is used on.
  let mut coarse_side = HashSet::new();
  let mut fine_side = HashSet::new();
  for (t, tri) in mesh.indices.chunks_exact(3).enumerate() {
    let c = centroid(mesh, t);
    for &i in tri {
      if c.x < 8.0 {
        coarse_side.insert(i);
      } else if c.x > 8.0 {
        fine_side.insert(i);
      }
    }
  }

  let mut boundary = 0;
  for (i, vertex) in mesh.vertices.iter().enumerate() {
    if vertex.position[0] != 8.0 || !coarse_side.contains(&(i as u32)) {
      continue;
    }
    boundary += 1;
    assert!(
      fine_side.contains(&(i as u32)),
      "coarse vertex {:?} on the boundary has no fine partner",
      vertex.position
    );
  }
  assert!(boundary > 0);
}

#[test]
fn test_projected_points_lie_on_the_coarse_face() {
  let volume = filled_volume(16, height_density);
  let policy = SplitPolicy {
    split_x: 8,
    coarse_stride: 4,
  };
  let mesh = MeshExtractor::with_policy(policy).build(&volume).mesh;

  // Every vertex on the boundary plane stays on it.
  for (t, tri) in mesh.indices.chunks_exact(3).enumerate() {
    if centroid(&mesh, t).x < 8.0 {
      continue;
    }
    for &i in tri {
      assert!(mesh.vertices[i as usize].position[0] >= 8.0);
    }
  }
}

#[test]
fn test_three_resolutions_meet_without_cracks() {
  let volume = filled_volume(32, spheres_density(&THREE_SPHERES));
  let extraction = MeshExtractor::with_policy(SurfaceLodPolicy).build(&volume);
  let stats = &extraction.stats;

  let levels = stats.nodes_meshed.iter().filter(|&&n| n > 0).count();
  assert!(levels >= 3, "only {levels} resolutions meshed");
  assert!(stats.inline_overrides > 0);
  assert!(stats.face_overrides > 0);
  assert_eq!(stats.face_fallbacks, 0);
  assert_eq!(stats.total_meshed(), stats.nodes_meshed.iter().sum::<usize>());

  let uncovered = uncovered_open_edges(&extraction.mesh, 32.0);
  assert!(uncovered.is_empty(), "cracks: {uncovered:?}");
}

#[test]
fn test_rolling_terrain_has_no_interior_cracks() {
  let volume = filled_volume(32, rolling_density);
  let extraction = MeshExtractor::with_policy(SurfaceLodPolicy).build(&volume);

  assert!(extraction.stats.total_overrides() > 0);
  assert_eq!(extraction.stats.face_fallbacks, 0);
  let uncovered = uncovered_open_edges(&extraction.mesh, 32.0);
  assert!(uncovered.is_empty(), "cracks: {uncovered:?}");
}

#[test]
fn test_depth_budget_limits_resolution() {
  let config = VolumeConfig::cubic(16).with_max_depth_offset(2);
  let mut volume = Volume::new(config).unwrap();
  volume.fill_with(sphere_density(Vec3::new(7.6, 8.3, 7.9), 3.0));

  let extraction = MeshExtractor::with_policy(FinestPolicy).build(&volume);
  let finest_depth = volume.chain().finest_depth();
  assert_eq!(extraction.stats.nodes_meshed[finest_depth], 0);
  assert_eq!(extraction.stats.nodes_meshed[finest_depth - 1], 0);
  assert!(extraction.stats.nodes_meshed[2] > 0);
}

#[test]
fn test_scale_applies_to_positions() {
  let config = VolumeConfig::cubic(16).with_scale(0.5);
  let mut volume = Volume::new(config).unwrap();
  volume.set(IVec3::new(5, 5, 5), 1.0);

  let mesh = MeshExtractor::new().build(&volume).mesh;
  for vertex in &mesh.vertices {
    let p = Vec3::from_array(vertex.position);
    assert!(((p - Vec3::splat(2.5)).length() - 0.425).abs() < 1e-5);
  }
  assert!(mesh.bounds.is_valid());
  assert!(mesh.bounds.max[0] <= 2.5 + 0.425 + 1e-5);
}

#[test]
fn test_rebuild_if_dirty() {
  let mut volume = cubic_volume(16);
  let extractor = MeshExtractor::new();
  let mut sink = CountingSink::default();

  assert!(extractor.rebuild_if_dirty(&mut volume, &mut sink).is_none());

  volume.set(IVec3::new(5, 5, 5), 1.0);
  let stats = extractor.rebuild_if_dirty(&mut volume, &mut sink).unwrap();
  assert_eq!(stats.triangles, 8);
  assert_eq!(sink.vertices, 6);
  assert_eq!(sink.normals, 6);
  assert_eq!(sink.indices, 24);

  assert!(extractor.rebuild_if_dirty(&mut volume, &mut sink).is_none());
  assert_eq!(sink.calls, 1);
}

#[test]
fn test_incremental_edits_match_fresh_volume() {
  let density = sphere_density(Vec3::new(7.6, 8.3, 7.9), 3.0);
  let mut edited = cubic_volume(16);
  for z in 0..16 {
    for y in 0..16 {
      for x in 0..16 {
        let p = IVec3::new(x, y, z);
        edited.set(p, density(p));
      }
    }
  }
  let fresh = filled_volume(16, density);

  let extractor = MeshExtractor::new();
  assert_eq!(extractor.build(&edited).mesh, extractor.build(&fresh).mesh);
}
