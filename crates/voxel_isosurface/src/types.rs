//! Mesh output types and the rendering sink contract.

/// Output vertex.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
  /// Position in world units (lattice coordinate * scale).
  pub position: [f32; 3],

  /// Surface normal (unit vector, pointing out of the surface).
  pub normal: [f32; 3],
}

impl Default for Vertex {
  fn default() -> Self {
    Self {
      position: [0.0; 3],
      normal: [0.0, 1.0, 0.0],
    }
  }
}

/// Axis-aligned bounding box.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinMaxAABB {
  pub min: [f32; 3],
  pub max: [f32; 3],
}

impl MinMaxAABB {
  /// Create AABB with inverted extents (ready for encapsulation).
  pub fn empty() -> Self {
    Self {
      min: [f32::INFINITY; 3],
      max: [f32::NEG_INFINITY; 3],
    }
  }

  pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
    Self { min, max }
  }

  /// Expand AABB to include a point.
  #[inline]
  pub fn encapsulate(&mut self, point: [f32; 3]) {
    for i in 0..3 {
      self.min[i] = self.min[i].min(point[i]);
      self.max[i] = self.max[i].max(point[i]);
    }
  }

  /// Check if AABB is valid (min <= max on all axes).
  pub fn is_valid(&self) -> bool {
    self.min[0] <= self.max[0] && self.min[1] <= self.max[1] && self.min[2] <= self.max[2]
  }
}

impl Default for MinMaxAABB {
  fn default() -> Self {
    Self::empty()
  }
}

/// Receiver for finished mesh buffers (the rendering side).
///
/// The extractor never issues draw calls; it hands flat arrays to a sink.
pub trait MeshSink {
  fn set_vertices(&mut self, positions: &[[f32; 3]]);
  fn set_normals(&mut self, normals: &[[f32; 3]]);
  fn set_triangles(&mut self, indices: &[u32]);
}

/// Welded triangle mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshOutput {
  /// Unique vertices with positions and normals.
  pub vertices: Vec<Vertex>,

  /// Triangle indices (3 per triangle, counter-clockwise seen from outside).
  pub indices: Vec<u32>,

  /// Bounding box encompassing all vertices.
  pub bounds: MinMaxAABB,
}

impl MeshOutput {
  pub fn new() -> Self {
    Self::default()
  }

  /// Clear all buffers, preserving capacity.
  pub fn clear(&mut self) {
    self.vertices.clear();
    self.indices.clear();
    self.bounds = MinMaxAABB::empty();
  }

  /// Returns true if no geometry was generated.
  pub fn is_empty(&self) -> bool {
    self.indices.is_empty()
  }

  /// Number of triangles in the mesh.
  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }

  /// Vertex positions of one triangle.
  pub fn triangle(&self, index: usize) -> Option<[[f32; 3]; 3]> {
    let tri = self.indices.get(index * 3..index * 3 + 3)?;
    let mut out = [[0.0; 3]; 3];
    for (slot, &i) in out.iter_mut().zip(tri) {
      *slot = self.vertices.get(i as usize)?.position;
    }
    Some(out)
  }

  /// Hand the flat buffers to a rendering sink.
  pub fn write_to(&self, sink: &mut impl MeshSink) {
    let positions: Vec<[f32; 3]> = self.vertices.iter().map(|v| v.position).collect();
    let normals: Vec<[f32; 3]> = self.vertices.iter().map(|v| v.normal).collect();
    sink.set_vertices(&positions);
    sink.set_normals(&normals);
    sink.set_triangles(&self.indices);
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
