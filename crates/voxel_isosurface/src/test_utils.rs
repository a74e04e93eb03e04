//! Test utilities shared by the extraction tests.
//!
//! Provides density fixtures, a policy that forces a coarse/fine split and
//! mesh topology and crack checks.

use std::collections::HashMap;

use glam::{IVec3, Vec3};

use crate::config::VolumeConfig;
use crate::lod::DetailPolicy;
use crate::octree::{LayerChain, OctreeNode};
use crate::types::MeshOutput;
use crate::volume::Volume;

// =============================================================================
// Density fixtures
// =============================================================================

/// Empty cubic volume with the default iso-level.
pub fn cubic_volume(size: u32) -> Volume {
  Volume::new(VolumeConfig::cubic(size)).expect("valid test config")
}

/// Smooth ball: 1 at the center, crossing 0.5 at `radius`.
pub fn sphere_density(center: Vec3, radius: f32) -> impl Fn(IVec3) -> f32 {
  move |p| (0.5 + (radius - (p.as_vec3() - center).length()) * 0.25).clamp(0.0, 1.0)
}

/// Union of smooth balls.
pub fn spheres_density(spheres: &[(Vec3, f32)]) -> impl Fn(IVec3) -> f32 + '_ {
  move |p| {
    spheres
      .iter()
      .map(|&(center, radius)| sphere_density(center, radius)(p))
      .fold(0.0, f32::max)
  }
}

/// Three balls of different size, meshed at several resolutions by the
/// surface policy.
pub const THREE_SPHERES: [(Vec3, f32); 3] = [
  (Vec3::new(9.3, 10.1, 9.7), 6.0),
  (Vec3::new(21.4, 19.2, 20.6), 4.5),
  (Vec3::new(22.2, 8.7, 11.3), 2.2),
];

/// Terrain-like field, monotone in y: solid below a curved height surface.
pub fn height_density(p: IVec3) -> f32 {
  let (x, z) = (p.x as f32, p.z as f32);
  let height = 4.0 + 0.2 * z + 0.02 * z * z + 0.1 * x;
  (0.5 + (height - p.y as f32) * 0.08).clamp(0.0, 1.0)
}

/// Wavy terrain, open at the low faces of the volume.
pub fn rolling_density(p: IVec3) -> f32 {
  let (x, z) = (p.x as f32, p.z as f32);
  let height = 6.0 + 2.0 * (x * 0.4).sin() + 1.5 * (z * 0.3).cos();
  (0.5 + (height - p.y as f32) * 0.08).clamp(0.0, 1.0)
}

/// Linear field whose iso-surface is the plane `0.3x + 0.5y + 0.2z = 3.05`.
pub fn tilted_plane_density(p: IVec3) -> f32 {
  let s = 0.3 * p.x as f32 + 0.5 * p.y as f32 + 0.2 * p.z as f32;
  (0.15 + (3.05 - s) * 0.05).clamp(0.0, 1.0)
}

/// Volume built from a density function.
pub fn filled_volume(size: u32, density: impl FnMut(IVec3) -> f32) -> Volume {
  let mut volume = cubic_volume(size);
  volume.fill_with(density);
  volume
}

// =============================================================================
// Policies
// =============================================================================

/// Meshes cells left of `split_x` at `coarse_stride` and everything else at
/// the finest available resolution.
pub struct SplitPolicy {
  pub split_x: i32,
  pub coarse_stride: i32,
}

impl DetailPolicy for SplitPolicy {
  fn requires_higher_detail(&self, chain: &LayerChain, node: &OctreeNode, budget: u32) -> bool {
    if budget == 0 || chain.is_finest(node.layer()) || !node.has_children() {
      return false;
    }
    let Some((origin, stride)) = chain.node_extent(node) else {
      return false;
    };
    if origin.x + stride <= self.split_x {
      stride > self.coarse_stride
    } else {
      true
    }
  }
}

/// Descends everywhere it can.
pub struct FinestPolicy;

impl DetailPolicy for FinestPolicy {
  fn requires_higher_detail(&self, chain: &LayerChain, node: &OctreeNode, budget: u32) -> bool {
    budget > 0 && !chain.is_finest(node.layer()) && node.has_children()
  }
}

// =============================================================================
// Mesh checks
// =============================================================================

/// Count of each undirected edge across all triangles.
pub fn edge_usage(mesh: &MeshOutput) -> HashMap<(u32, u32), usize> {
  let mut usage = HashMap::new();
  for tri in mesh.indices.chunks_exact(3) {
    for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
      *usage.entry((a.min(b), a.max(b))).or_insert(0) += 1;
    }
  }
  usage
}

/// Every edge shared by exactly two triangles, traversed once each way.
pub fn assert_watertight(mesh: &MeshOutput) {
  for (edge, count) in edge_usage(mesh) {
    assert_eq!(count, 2, "edge {edge:?} used by {count} triangles");
  }

  let mut directed = HashMap::new();
  for tri in mesh.indices.chunks_exact(3) {
    for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
      *directed.entry((a, b)).or_insert(0usize) += 1;
    }
  }
  for (&(a, b), &count) in &directed {
    assert_eq!(count, 1, "directed edge ({a}, {b}) repeated");
    assert!(directed.contains_key(&(b, a)), "edge ({a}, {b}) has no opposite");
  }
}

/// Open edges (used by a single triangle) with a point farther than 1e-3
/// from every other open edge, as `(a, b, gap)`.
///
/// Where resolutions meet, a coarse open edge is covered by the fine open
/// edges lying along it and vice versa; anything left over is a crack.
/// Edges lying in a face of the box `[0, extent]^3` are skipped.
pub fn uncovered_open_edges(mesh: &MeshOutput, extent: f32) -> Vec<(Vec3, Vec3, f32)> {
  let position = |i: u32| Vec3::from_array(mesh.vertices[i as usize].position);
  let open: Vec<(Vec3, Vec3)> = edge_usage(mesh)
    .into_iter()
    .filter(|&(_, count)| count == 1)
    .map(|((a, b), _)| (position(a), position(b)))
    .collect();

  let on_box_face = |a: Vec3, b: Vec3| {
    (0..3).any(|axis| {
      [0.0, extent]
        .iter()
        .any(|&plane| (a[axis] - plane).abs() < 1e-6 && (b[axis] - plane).abs() < 1e-6)
    })
  };

  let mut uncovered = Vec::new();
  for (i, &(a, b)) in open.iter().enumerate() {
    if on_box_face(a, b) {
      continue;
    }
    for t in [0.25, 0.5, 0.75] {
      let p = a.lerp(b, t);
      let gap = open
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != i)
        .map(|(_, &(c, d))| distance_to_segment(p, c, d))
        .fold(f32::INFINITY, f32::min);
      if gap > 1e-3 {
        uncovered.push((a, b, gap));
        break;
      }
    }
  }
  uncovered
}

fn distance_to_segment(p: Vec3, a: Vec3, b: Vec3) -> f32 {
  let ab = b - a;
  let length_sq = ab.length_squared();
  let t = if length_sq > 0.0 {
    ((p - a).dot(ab) / length_sq).clamp(0.0, 1.0)
  } else {
    0.0
  };
  p.distance(a + ab * t)
}

/// Signed enclosed volume; positive when triangles wind outward.
pub fn signed_volume(mesh: &MeshOutput) -> f32 {
  mesh
    .indices
    .chunks_exact(3)
    .map(|tri| {
      let [a, b, c] = [tri[0], tri[1], tri[2]]
        .map(|i| Vec3::from_array(mesh.vertices[i as usize].position));
      a.dot(b.cross(c)) / 6.0
    })
    .sum()
}

/// Triangle centroid.
pub fn centroid(mesh: &MeshOutput, triangle: usize) -> Vec3 {
  let [a, b, c] = mesh
    .triangle(triangle)
    .expect("triangle in range")
    .map(Vec3::from_array);
  (a + b + c) / 3.0
}
