use super::*;

fn quad_builder() -> MeshBuilder {
  let mut builder = MeshBuilder::new();
  let (a, b, c, d) = (
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(1.0, 0.0, 0.0),
    Vec3::new(1.0, 1.0, 0.0),
    Vec3::new(0.0, 1.0, 0.0),
  );
  builder.add_triangle(a, b, c).unwrap();
  builder.add_triangle(a, c, d).unwrap();
  builder
}

#[test]
fn test_shared_vertices_are_welded() {
  let builder = quad_builder();
  assert_eq!(builder.vertex_count(), 4);
  assert_eq!(builder.triangle_count(), 2);

  let mesh = builder.finish(1.0);
  assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
}

#[test]
fn test_negative_zero_welds_with_zero() {
  let mut builder = MeshBuilder::new();
  builder
    .add_triangle(Vec3::ZERO, Vec3::X, Vec3::Y)
    .unwrap();
  builder
    .add_triangle(Vec3::new(-0.0, 0.0, 0.0), Vec3::Y, Vec3::NEG_X)
    .unwrap();
  assert_eq!(builder.vertex_count(), 4);
}

#[test]
fn test_coincident_vertices_rejected() {
  let mut builder = MeshBuilder::new();
  let result = builder.add_triangle(Vec3::ZERO, Vec3::ZERO, Vec3::X);
  assert_eq!(result, Err(Degenerate::CoincidentVertices));
  assert_eq!(builder.vertex_count(), 0);
}

#[test]
fn test_collinear_triangle_rejected() {
  let mut builder = MeshBuilder::new();
  let result = builder.add_triangle(Vec3::ZERO, Vec3::X, Vec3::X * 2.0);
  assert_eq!(result, Err(Degenerate::ZeroArea));
  assert_eq!(builder.triangle_count(), 0);
}

#[test]
fn test_nan_triangle_rejected() {
  let mut builder = MeshBuilder::new();
  let result = builder.add_triangle(Vec3::ZERO, Vec3::X, Vec3::new(f32::NAN, 1.0, 0.0));
  assert_eq!(result, Err(Degenerate::ZeroArea));
}

#[test]
fn test_flat_quad_normals_face_up() {
  let mesh = quad_builder().finish(1.0);
  for vertex in &mesh.vertices {
    let n = Vec3::from_array(vertex.normal);
    assert!((n - Vec3::Z).length() < 1e-6, "normal {n}");
  }
}

#[test]
fn test_angle_weighting_on_a_fold() {
  // Two triangles meeting at the shared vertex `p`. The first subtends 90
  // degrees at `p`, the second 45, so the blend leans toward the first.
  let mut builder = MeshBuilder::new();
  let p = Vec3::ZERO;
  builder.add_triangle(p, Vec3::X, Vec3::Y).unwrap();
  builder
    .add_triangle(p, Vec3::Y, Vec3::new(0.0, 1.0, 1.0))
    .unwrap();

  let mesh = builder.finish(1.0);
  let n = Vec3::from_array(mesh.vertices[0].normal);
  // First face normal +Z (weight pi/2), second +X (weight pi/4).
  let expected =
    (Vec3::Z * std::f32::consts::FRAC_PI_2 + Vec3::X * std::f32::consts::FRAC_PI_4).normalize();
  assert!((n - expected).length() < 1e-5, "normal {n} expected {expected}");
}

#[test]
fn test_finish_scales_positions_and_bounds() {
  let mesh = quad_builder().finish(0.5);
  assert_eq!(mesh.vertices[2].position, [0.5, 0.5, 0.0]);
  assert_eq!(mesh.bounds.min, [0.0, 0.0, 0.0]);
  assert_eq!(mesh.bounds.max, [0.5, 0.5, 0.0]);
}
