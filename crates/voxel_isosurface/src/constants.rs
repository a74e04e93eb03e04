//! Density conventions and cell layout constants.
//!
//! # Density Range
//!
//! ```text
//! 0.0 ──────── 0.15 ─────────────────────────── 1.0
//! │  outside    │              inside             │
//! │ (default)   └─ DEFAULT_ISO_LEVEL              │
//! ```
//!
//! A lattice point is *inside* the surface when its density is `>=` the
//! iso-level. Reads outside the field return [`UNKNOWN_DENSITY`], which sits
//! below every valid iso-level and therefore always classifies as outside.
//!
//! # Cell Corner Layout
//!
//! Corners follow the classic Marching Cubes numbering so that the fixed
//! triangle table can be indexed directly by the case mask:
//!
//! ```text
//!       7──────6          Corners:
//!      /│     /│            0=(0,0,0)  1=(1,0,0)  2=(1,1,0)  3=(0,1,0)
//!     3─┼────2 │            4=(0,0,1)  5=(1,0,1)  6=(1,1,1)  7=(0,1,1)
//!     │ 4────┼─5
//!     │/     │/           +Y
//!     0──────1             │  +Z
//!                          │ /
//!                          └───+X
//! ```
//!
//! Octants (children, and the 8 cells around a lattice point) use the bit
//! layout of the octree module instead: bit 0 = +X, bit 1 = +Y, bit 2 = +Z.
//! [`OCTANT_TO_CORNER`] and [`CORNER_TO_OCTANT`] convert between the two.

use glam::IVec3;

/// Default surface threshold.
pub const DEFAULT_ISO_LEVEL: f32 = 0.15;

/// Density of an untouched voxel (empty space).
pub const DEFAULT_DENSITY: f32 = 0.0;

/// Sentinel returned for reads outside the field. Compares below any iso-level.
pub const UNKNOWN_DENSITY: f32 = -1.0;

/// Tolerance used by edge interpolation.
pub const LERP_EPSILON: f32 = 1e-5;

/// Largest accepted resolution along any axis (2^12).
pub const MAX_RESOLUTION: u32 = 4096;

/// Upper bound on the number of octree layers (log2(MAX_RESOLUTION) + 1).
pub const MAX_LAYERS: usize = 13;

/// Unit offsets of the 8 cell corners, in Marching Cubes order.
pub const CORNER_OFFSETS: [[i32; 3]; 8] = [
  [0, 0, 0], // 0
  [1, 0, 0], // 1
  [1, 1, 0], // 2
  [0, 1, 0], // 3
  [0, 0, 1], // 4
  [1, 0, 1], // 5
  [1, 1, 1], // 6
  [0, 1, 1], // 7
];

/// Octant code (bit 0 = X, bit 1 = Y, bit 2 = Z) to corner index.
pub const OCTANT_TO_CORNER: [usize; 8] = [0, 1, 3, 2, 4, 5, 7, 6];

/// Corner index to octant code.
pub const CORNER_TO_OCTANT: [u8; 8] = [0, 1, 3, 2, 4, 5, 7, 6];

/// Unit offset for an octant code.
#[inline(always)]
pub const fn octant_offset(octant: u8) -> IVec3 {
  IVec3::new(
    (octant & 1) as i32,
    ((octant >> 1) & 1) as i32,
    ((octant >> 2) & 1) as i32,
  )
}

/// Octant code of a unit offset. Components must be 0 or 1.
#[inline(always)]
pub const fn offset_octant(offset: IVec3) -> u8 {
  (offset.x as u8) | ((offset.y as u8) << 1) | ((offset.z as u8) << 2)
}

/// Unit offset of a corner as a vector.
#[inline(always)]
pub const fn corner_offset(corner: usize) -> IVec3 {
  let [x, y, z] = CORNER_OFFSETS[corner];
  IVec3::new(x, y, z)
}

/// Whether a density counts as inside the surface.
#[inline(always)]
pub fn is_inside(value: f32, iso_level: f32) -> bool {
  value >= iso_level
}

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
