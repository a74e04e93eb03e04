//! Edge reconciliation between regions meshed at different resolutions.
//!
//! When a fine cell borders a coarser rendered cell, the fine cell's edge
//! intersections on the shared boundary must land where the coarse mesh
//! puts its surface, or the two meshes leave a crack. For each requested
//! fine edge the reconciler looks for a coarser rendered node touching it:
//!
//! ```text
//!            transverse coordinates vs coarse lattice
//!   inline    both aligned  -> edge lies on a coarse edge: reuse the
//!                              coarse edge intersection exactly
//!   face      one aligned   -> edge lies inside a coarse face: project
//!                              the fine point onto the face contour
//!   embedded  none aligned  -> coarse layer knows nothing here: go finer
//! ```
//!
//! Layers are searched coarsest first. A layer whose stride does not exceed
//! the edge length cannot contain it, which ends the search. An inline match
//! on any layer wins over a face match; otherwise the coarsest face match is
//! used. When nothing applies the caller interpolates the fine edge directly.
//!
//! Coarse edge points (the inline result and the face contour endpoints) are
//! reconciled the same way before use, so they are exactly the points the
//! coarse node emits even when a still coarser neighbor moved them.

use glam::{IVec3, Vec3};

use crate::constants::{is_inside, offset_octant, OCTANT_TO_CORNER};
use crate::lod::RenderPlan;
use crate::mesh::interpolate::vertex_lerp;
use crate::octree::{LayerChain, OctreeLayer, OctreeNode};
use crate::stats::OverrideKind;

/// An axis-aligned lattice edge with its endpoint densities.
///
/// `a` must be the lower endpoint so that both cells sharing an edge ask
/// the identical question.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeQuery {
  pub a: IVec3,
  pub b: IVec3,
  pub value_a: f32,
  pub value_b: f32,
}

impl EdgeQuery {
  pub fn new(a: IVec3, b: IVec3, value_a: f32, value_b: f32) -> Self {
    if b.cmplt(a).any() {
      Self {
        a: b,
        b: a,
        value_a: value_b,
        value_b: value_a,
      }
    } else {
      Self {
        a,
        b,
        value_a,
        value_b,
      }
    }
  }

  /// Axis the edge runs along (0 = X, 1 = Y, 2 = Z), or `None` if the
  /// endpoints are not axis-aligned.
  pub fn axis(&self) -> Option<usize> {
    let delta = self.b - self.a;
    match (delta.x != 0, delta.y != 0, delta.z != 0) {
      (true, false, false) => Some(0),
      (false, true, false) => Some(1),
      (false, false, true) => Some(2),
      _ => None,
    }
  }

  /// Edge length in lattice units.
  pub fn length(&self) -> i32 {
    (self.b - self.a).abs().max_element()
  }

  /// Intersection by plain interpolation of the fine edge.
  pub fn direct(&self, iso_level: f32) -> Vec3 {
    vertex_lerp(
      iso_level,
      self.a.as_vec3(),
      self.b.as_vec3(),
      self.value_a,
      self.value_b,
    )
  }
}

/// Replacement intersection for an edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EdgeOverride {
  /// Exact intersection of the coarse edge containing the query.
  Inline(Vec3),
  /// Fine intersection projected onto the coarse face contour.
  FaceProjected(Vec3),
  /// Coarse face had a degenerate contour; the fine intersection is kept.
  FaceFallback(Vec3),
}

impl EdgeOverride {
  #[inline]
  pub fn point(&self) -> Vec3 {
    match *self {
      EdgeOverride::Inline(p) | EdgeOverride::FaceProjected(p) | EdgeOverride::FaceFallback(p) => p,
    }
  }

  #[inline]
  pub fn kind(&self) -> OverrideKind {
    match self {
      EdgeOverride::Inline(_) => OverrideKind::Inline,
      EdgeOverride::FaceProjected(_) => OverrideKind::FaceProjected,
      EdgeOverride::FaceFallback(_) => OverrideKind::FaceFallback,
    }
  }
}

/// Four corners of a square lattice face, in cyclic order:
/// `origin`, `origin + u`, `origin + u + v`, `origin + v`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceCorners {
  pub positions: [IVec3; 4],
  pub values: [f32; 4],
}

/// Boundary edges of a face as corner pairs, lower endpoint first.
const FACE_EDGES: [[usize; 2]; 4] = [[0, 1], [1, 2], [3, 2], [0, 3]];

/// Result of projecting a point onto a face contour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FaceProjection {
  /// Exactly two boundary crossings; point moved onto the segment.
  Projected(Vec3),
  /// 0, 1, 3 or 4 crossings; point returned unchanged.
  Degenerate(Vec3),
}

/// Project a point onto the iso-contour of a coarse face.
///
/// The contour is approximated by the segment joining the face's boundary
/// crossings. With exactly two crossings the point is moved to the closest
/// point on that segment (removing its rejection from the segment
/// direction); any other crossing count leaves the point as it is.
pub fn project_edge_onto_face(face: &FaceCorners, point: Vec3, iso_level: f32) -> FaceProjection {
  project_onto_contour(face, point, iso_level, |i, j| {
    vertex_lerp(
      iso_level,
      face.positions[i].as_vec3(),
      face.positions[j].as_vec3(),
      face.values[i],
      face.values[j],
    )
  })
}

/// Projection with the boundary crossing of face corners `i`-`j` supplied
/// by `crossing`.
fn project_onto_contour(
  face: &FaceCorners,
  point: Vec3,
  iso_level: f32,
  mut crossing: impl FnMut(usize, usize) -> Vec3,
) -> FaceProjection {
  let mut crossings = [Vec3::ZERO; 4];
  let mut count = 0;
  for [i, j] in FACE_EDGES {
    if is_inside(face.values[i], iso_level) != is_inside(face.values[j], iso_level) {
      crossings[count] = crossing(i, j);
      count += 1;
    }
  }

  if count != 2 {
    return FaceProjection::Degenerate(point);
  }

  let (start, end) = (crossings[0], crossings[1]);
  let direction = end - start;
  let length_sq = direction.length_squared();
  if length_sq <= f32::EPSILON {
    return FaceProjection::Projected(start);
  }
  let t = ((point - start).dot(direction) / length_sq).clamp(0.0, 1.0);
  FaceProjection::Projected(start + direction * t)
}

/// Answers edge overrides for one build, against one render plan.
pub struct EdgeReconciler<'a> {
  chain: &'a LayerChain,
  plan: &'a RenderPlan,
  max_depth_offset: u32,
}

impl<'a> EdgeReconciler<'a> {
  pub fn new(chain: &'a LayerChain, plan: &'a RenderPlan, max_depth_offset: u32) -> Self {
    Self {
      chain,
      plan,
      max_depth_offset,
    }
  }

  /// Replacement intersection for a fine edge, if a coarser rendered node
  /// constrains it.
  pub fn override_edge(&self, query: &EdgeQuery) -> Option<EdgeOverride> {
    let axis = query.axis()?;
    let (t1, t2) = ((axis + 1) % 3, (axis + 2) % 3);
    let searched = (self.max_depth_offset as usize).saturating_add(1);

    let mut face = None;
    for layer in self.chain.layers().iter().take(searched) {
      let stride = layer.stride();
      if query.length() >= stride {
        break;
      }

      let aligned = (query.a[t1] % stride == 0, query.a[t2] % stride == 0);
      match aligned {
        (true, true) => {
          if let Some(inline) = self.inline(layer, query, axis) {
            return Some(inline);
          }
        }
        (true, false) if face.is_none() => face = self.on_face(layer, query, axis, t1, t2),
        (false, true) if face.is_none() => face = self.on_face(layer, query, axis, t2, t1),
        _ => {}
      }
    }
    face
  }

  /// Point a node emits for one of its own edges.
  fn edge_point(&self, a: IVec3, b: IVec3, value_a: f32, value_b: f32) -> Vec3 {
    let query = EdgeQuery::new(a, b, value_a, value_b);
    match self.override_edge(&query) {
      Some(edge_override) => edge_override.point(),
      None => query.direct(self.chain.iso_level()),
    }
  }

  /// Edge lies on a coarse edge: any of the up to 4 cells around that coarse
  /// edge being rendered pins the intersection to the coarse one.
  fn inline(&self, layer: &OctreeLayer, query: &EdgeQuery, axis: usize) -> Option<EdgeOverride> {
    let stride = layer.stride();
    let (t1, t2) = ((axis + 1) % 3, (axis + 2) % 3);

    let mut start = query.a;
    start[axis] = query.a[axis].div_euclid(stride) * stride;
    let mut end = start;
    end[axis] += stride;

    let base = start / stride;
    for (d1, d2) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
      let mut cell = base;
      cell[t1] -= d1;
      cell[t2] -= d2;
      let Some(node) = self.rendered_node(layer, cell) else {
        continue;
      };
      let (value_start, value_end) = (
        corner_value(layer, node, start)?,
        corner_value(layer, node, end)?,
      );
      let iso_level = self.chain.iso_level();
      if is_inside(value_start, iso_level) == is_inside(value_end, iso_level) {
        continue;
      }
      return Some(EdgeOverride::Inline(self.edge_point(start, end, value_start, value_end)));
    }
    None
  }

  /// Edge lies inside a coarse face spanned by `axis` and `free`, at a fixed
  /// `fixed` coordinate. The cells on either side of the face are checked.
  fn on_face(
    &self,
    layer: &OctreeLayer,
    query: &EdgeQuery,
    axis: usize,
    fixed: usize,
    free: usize,
  ) -> Option<EdgeOverride> {
    let stride = layer.stride();

    let mut origin = query.a;
    origin[axis] = query.a[axis].div_euclid(stride) * stride;
    origin[free] = query.a[free].div_euclid(stride) * stride;

    let mut u = IVec3::ZERO;
    u[axis] = stride;
    let mut v = IVec3::ZERO;
    v[free] = stride;
    let positions = [origin, origin + u, origin + u + v, origin + v];

    let base = origin / stride;
    for side in [0, 1] {
      let mut cell = base;
      cell[fixed] -= side;
      let Some(node) = self.rendered_node(layer, cell) else {
        continue;
      };
      let mut values = [0.0; 4];
      for (value, &p) in values.iter_mut().zip(&positions) {
        *value = corner_value(layer, node, p)?;
      }

      let iso_level = self.chain.iso_level();
      let face = FaceCorners { positions, values };
      let fine = query.direct(iso_level);
      let projection = project_onto_contour(&face, fine, iso_level, |i, j| {
        self.edge_point(positions[i], positions[j], values[i], values[j])
      });
      return Some(match projection {
        FaceProjection::Projected(p) => EdgeOverride::FaceProjected(p),
        FaceProjection::Degenerate(p) => EdgeOverride::FaceFallback(p),
      });
    }
    None
  }

  fn rendered_node<'l>(&self, layer: &'l OctreeLayer, cell: IVec3) -> Option<&'l OctreeNode> {
    let node = layer.node_at(cell)?;
    self.plan.is_rendered(node.id()).then_some(node)
  }
}

/// Cached density of a node at one of its corner lattice points.
fn corner_value(layer: &OctreeLayer, node: &OctreeNode, p: IVec3) -> Option<f32> {
  let origin = layer.node_origin(node.id())?;
  let local = (p - origin) / layer.stride();
  if local.cmplt(IVec3::ZERO).any() || local.cmpgt(IVec3::ONE).any() {
    return None;
  }
  Some(node.corner(OCTANT_TO_CORNER[offset_octant(local) as usize]))
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod reconcile_test;
