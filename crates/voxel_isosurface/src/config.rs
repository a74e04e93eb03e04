//! VolumeConfig - resolution, scale and surface extraction settings.

use glam::UVec3;

use crate::constants::{DEFAULT_ISO_LEVEL, MAX_RESOLUTION};
use crate::error::VolumeError;

/// Configuration for a [`crate::Volume`].
#[derive(Clone, Debug, PartialEq)]
pub struct VolumeConfig {
  /// Voxels per axis. Fixed for the lifetime of the volume.
  pub resolution: [u32; 3],

  /// World units per voxel. Applied to emitted vertex positions.
  pub scale: f32,

  /// Density threshold: a voxel is inside when `density >= iso_level`.
  pub iso_level: f32,

  /// How many layers below the root the extractor may descend.
  /// `u32::MAX` lets it reach the finest layer everywhere.
  pub max_depth_offset: u32,
}

impl Default for VolumeConfig {
  fn default() -> Self {
    Self {
      resolution: [32; 3],
      scale: 1.0,
      iso_level: DEFAULT_ISO_LEVEL,
      max_depth_offset: u32::MAX,
    }
  }
}

impl VolumeConfig {
  pub fn new() -> Self {
    Self::default()
  }

  /// Cubic volume with `size` voxels per axis.
  pub fn cubic(size: u32) -> Self {
    Self::default().with_resolution([size; 3])
  }

  pub fn with_resolution(mut self, resolution: [u32; 3]) -> Self {
    self.resolution = resolution;
    self
  }

  pub fn with_scale(mut self, scale: f32) -> Self {
    self.scale = scale;
    self
  }

  pub fn with_iso_level(mut self, iso_level: f32) -> Self {
    self.iso_level = iso_level;
    self
  }

  pub fn with_max_depth_offset(mut self, max_depth_offset: u32) -> Self {
    self.max_depth_offset = max_depth_offset;
    self
  }

  /// Resolution as a vector.
  #[inline]
  pub fn resolution_vec(&self) -> UVec3 {
    UVec3::from_array(self.resolution)
  }

  /// Check every field, reporting the first problem found.
  pub fn validate(&self) -> Result<(), VolumeError> {
    if self
      .resolution
      .iter()
      .any(|&axis| axis == 0 || axis > MAX_RESOLUTION)
    {
      return Err(VolumeError::InvalidResolution {
        resolution: self.resolution,
        max: MAX_RESOLUTION,
      });
    }
    if !self.scale.is_finite() || self.scale <= 0.0 {
      return Err(VolumeError::InvalidScale(self.scale));
    }
    validate_iso_level(self.iso_level)
  }
}

/// Iso-levels must be finite and lie within the density range.
pub(crate) fn validate_iso_level(iso_level: f32) -> Result<(), VolumeError> {
  if !iso_level.is_finite() || !(0.0..=1.0).contains(&iso_level) {
    return Err(VolumeError::InvalidIsoLevel(iso_level));
  }
  Ok(())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
