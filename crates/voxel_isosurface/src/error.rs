//! Error types for volume construction.
//!
//! Runtime edits never fail with an error: out-of-range reads return
//! [`crate::constants::UNKNOWN_DENSITY`] and out-of-range writes are logged
//! and ignored. Only configuration problems surface as [`VolumeError`].

use thiserror::Error;

/// Invalid volume configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VolumeError {
  #[error("invalid resolution {resolution:?}: every axis must be in 1..={max}")]
  InvalidResolution { resolution: [u32; 3], max: u32 },

  #[error("invalid scale {0}: must be finite and positive")]
  InvalidScale(f32),

  #[error("invalid iso-level {0}: must be finite and within [0, 1]")]
  InvalidIsoLevel(f32),
}
