//! MeshBuilder - welds vertices and accumulates smooth normals.
//!
//! Vertices are keyed by the exact bits of their position, so two cells that
//! compute the same intersection (same canonical edge, same densities) share
//! one output vertex. Each triangle adds its face normal to its three
//! vertices, weighted by the triangle's angle at that vertex.

use std::collections::HashMap;

use glam::Vec3;

use crate::types::{MeshOutput, MinMaxAABB, Vertex};

/// Why a triangle was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Degenerate {
  /// Two of the three vertices weld to the same point.
  CoincidentVertices,
  /// Cross product is zero or not finite.
  ZeroArea,
}

/// Incremental welded-triangle mesh.
#[derive(Debug, Default)]
pub struct MeshBuilder {
  positions: Vec<Vec3>,
  normals: Vec<Vec3>,
  indices: Vec<u32>,
  lookup: HashMap<[u32; 3], u32>,
}

impl MeshBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of unique vertices so far.
  #[inline]
  pub fn vertex_count(&self) -> usize {
    self.positions.len()
  }

  /// Number of accepted triangles so far.
  #[inline]
  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }

  /// Add a triangle wound counter-clockwise as seen from its normal side.
  pub fn add_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) -> Result<(), Degenerate> {
    let (ka, kb, kc) = (weld_key(a), weld_key(b), weld_key(c));
    if ka == kb || kb == kc || ka == kc {
      return Err(Degenerate::CoincidentVertices);
    }

    let cross = (b - a).cross(c - a);
    let length = cross.length();
    if !length.is_finite() || length == 0.0 {
      return Err(Degenerate::ZeroArea);
    }
    let face_normal = cross / length;

    let corners = [(a, ka, b, c), (b, kb, c, a), (c, kc, a, b)];
    for (p, key, next, prev) in corners {
      let index = self.weld(p, key);
      let angle = (next - p).angle_between(prev - p);
      if angle.is_finite() {
        self.normals[index as usize] += face_normal * angle;
      }
      self.indices.push(index);
    }
    Ok(())
  }

  fn weld(&mut self, position: Vec3, key: [u32; 3]) -> u32 {
    if let Some(&index) = self.lookup.get(&key) {
      return index;
    }
    let index = self.positions.len() as u32;
    self.positions.push(position);
    self.normals.push(Vec3::ZERO);
    self.lookup.insert(key, index);
    index
  }

  /// Scale positions into world units and normalize accumulated normals.
  pub fn finish(self, scale: f32) -> MeshOutput {
    let mut bounds = MinMaxAABB::empty();
    let vertices = self
      .positions
      .iter()
      .zip(&self.normals)
      .map(|(&p, &n)| {
        let position = (p * scale).to_array();
        bounds.encapsulate(position);
        Vertex {
          position,
          normal: n.normalize_or(Vec3::Y).to_array(),
        }
      })
      .collect();

    MeshOutput {
      vertices,
      indices: self.indices,
      bounds,
    }
  }
}

/// Exact position bits, with `-0.0` folded into `0.0`.
#[inline]
fn weld_key(p: Vec3) -> [u32; 3] {
  [(p.x + 0.0).to_bits(), (p.y + 0.0).to_bits(), (p.z + 0.0).to_bits()]
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod builder_test;
