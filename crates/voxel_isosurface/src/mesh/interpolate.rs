//! Edge intersection by linear interpolation.

use glam::Vec3;

use crate::constants::LERP_EPSILON;

/// Point on segment `a`-`b` where the density crosses `iso_level`.
///
/// Snaps to an endpoint whose value is within [`LERP_EPSILON`] of the
/// iso-level, and returns `a` for a flat edge. Callers pass the lower
/// endpoint as `a` so that shared edges produce bit-identical points.
#[inline]
pub fn vertex_lerp(iso_level: f32, a: Vec3, b: Vec3, value_a: f32, value_b: f32) -> Vec3 {
  if (iso_level - value_a).abs() < LERP_EPSILON {
    return a;
  }
  if (iso_level - value_b).abs() < LERP_EPSILON {
    return b;
  }
  if (value_a - value_b).abs() < LERP_EPSILON {
    return a;
  }
  let t = (iso_level - value_a) / (value_b - value_a);
  a + (b - a) * t
}
