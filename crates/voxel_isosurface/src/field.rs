//! ScalarField - dense density storage.
//!
//! # Memory Layout
//!
//! ```text
//! index = x + w * (y + h * z)
//!
//! Address:  0      1     ...  w-1     w     ...
//! Content: [0,0,0][1,0,0]...[w-1,0,0][0,1,0]...
//!          └──────── X ─────────────┘
//! ```
//!
//! Densities are clamped to `[0, 1]` on write. Reads outside the field return
//! [`UNKNOWN_DENSITY`]; the octree samples through [`ScalarField::sample`],
//! which maps the sentinel to [`DEFAULT_DENSITY`] so boundary cells close.

use glam::{IVec3, UVec3};

use crate::constants::{DEFAULT_DENSITY, UNKNOWN_DENSITY};

/// Dense 3D grid of densities in `[0, 1]`.
#[derive(Clone, Debug)]
pub struct ScalarField {
  resolution: UVec3,
  data: Vec<f32>,
}

impl ScalarField {
  /// Create a field filled with [`DEFAULT_DENSITY`].
  pub fn new(resolution: UVec3) -> Self {
    let len = (resolution.x as usize) * (resolution.y as usize) * (resolution.z as usize);
    Self {
      resolution,
      data: vec![DEFAULT_DENSITY; len],
    }
  }

  /// Voxels per axis `(w, h, d)`.
  #[inline]
  pub fn resolution(&self) -> UVec3 {
    self.resolution
  }

  /// Total number of voxels.
  #[inline]
  pub fn len(&self) -> usize {
    self.data.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  /// Whether `p` addresses a stored voxel.
  #[inline]
  pub fn contains(&self, p: IVec3) -> bool {
    p.cmpge(IVec3::ZERO).all() && p.as_uvec3().cmplt(self.resolution).all()
  }

  /// Linear index of `p`, or `None` when out of range.
  #[inline]
  pub fn index(&self, p: IVec3) -> Option<usize> {
    if !self.contains(p) {
      return None;
    }
    let (w, h) = (self.resolution.x as usize, self.resolution.y as usize);
    Some(p.x as usize + w * (p.y as usize + h * p.z as usize))
  }

  /// Density at `p`, or [`UNKNOWN_DENSITY`] when out of range.
  pub fn get(&self, p: IVec3) -> f32 {
    match self.index(p) {
      Some(idx) => self.data[idx],
      None => {
        tracing::debug!(x = p.x, y = p.y, z = p.z, "density read outside field");
        UNKNOWN_DENSITY
      }
    }
  }

  /// Density used for corner caching: out-of-range reads count as empty.
  #[inline]
  pub fn sample(&self, p: IVec3) -> f32 {
    self
      .index(p)
      .map_or(DEFAULT_DENSITY, |idx| self.data[idx])
  }

  /// Store a density, returning the previous value.
  ///
  /// Returns `None` (and logs) when `p` is out of range or `value` is NaN.
  pub fn set(&mut self, p: IVec3, value: f32) -> Option<f32> {
    let Some(idx) = self.index(p) else {
      tracing::warn!(x = p.x, y = p.y, z = p.z, "density write outside field ignored");
      return None;
    };
    if value.is_nan() {
      tracing::warn!(x = p.x, y = p.y, z = p.z, "NaN density write ignored");
      return None;
    }
    let previous = self.data[idx];
    self.data[idx] = value.clamp(0.0, 1.0);
    Some(previous)
  }

  /// Overwrite every voxel from a generator function.
  pub fn fill_with(&mut self, mut density: impl FnMut(IVec3) -> f32) {
    let res = self.resolution.as_ivec3();
    let mut idx = 0;
    for z in 0..res.z {
      for y in 0..res.y {
        for x in 0..res.x {
          let value = density(IVec3::new(x, y, z));
          self.data[idx] = if value.is_nan() {
            DEFAULT_DENSITY
          } else {
            value.clamp(0.0, 1.0)
          };
          idx += 1;
        }
      }
    }
  }

  /// Reset every voxel to [`DEFAULT_DENSITY`].
  pub fn reset(&mut self) {
    self.data.fill(DEFAULT_DENSITY);
  }

  /// Raw density slice in storage order.
  pub fn as_slice(&self) -> &[f32] {
    &self.data
  }
}

#[cfg(test)]
#[path = "field_test.rs"]
mod field_test;
