//! Cube edge layout and the precomputed edge crossing table.
//!
//! Maps 8-bit case masks to 12-bit edge masks indicating which edges the
//! surface crosses.
//!
//! # Edge Layout
//!
//! ```text
//! 12 edges, Marching Cubes numbering [from, to]:
//!
//!   X-axis:  0 [0,1]   2 [3,2]   4 [4,5]   6 [7,6]
//!   Y-axis:  1 [1,2]   3 [0,3]   5 [5,6]   7 [4,7]
//!   Z-axis:  8 [0,4]   9 [1,5]  10 [2,6]  11 [3,7]
//! ```
//!
//! Every edge is stored with its lower-coordinate corner first, so walking
//! `corner[0] -> corner[1]` always moves along the positive axis. Shared
//! edges therefore interpolate in the same direction from every cell that
//! touches them.

/// Edge endpoint corner indices, lower-coordinate corner first.
pub const EDGE_CORNERS: [[usize; 2]; 12] = [
  [0, 1], // Edge 0:  X axis at Y=0, Z=0
  [1, 2], // Edge 1:  Y axis at X=1, Z=0
  [3, 2], // Edge 2:  X axis at Y=1, Z=0
  [0, 3], // Edge 3:  Y axis at X=0, Z=0
  [4, 5], // Edge 4:  X axis at Y=0, Z=1
  [5, 6], // Edge 5:  Y axis at X=1, Z=1
  [7, 6], // Edge 6:  X axis at Y=1, Z=1
  [4, 7], // Edge 7:  Y axis at X=0, Z=1
  [0, 4], // Edge 8:  Z axis at X=0, Y=0
  [1, 5], // Edge 9:  Z axis at X=1, Y=0
  [2, 6], // Edge 10: Z axis at X=1, Y=1
  [3, 7], // Edge 11: Z axis at X=0, Y=1
];

/// Precomputed edge table.
/// Index: 8-bit case mask (which corners are inside)
/// Value: 12-bit edge mask (which edges have crossings)
///
/// An edge has a crossing if exactly one of its endpoint corners is inside.
pub const EDGE_TABLE: [u16; 256] = generate_edge_table();

/// Generate the edge table at compile time.
const fn generate_edge_table() -> [u16; 256] {
  let mut table = [0u16; 256];
  let mut case = 0usize;

  while case < 256 {
    let mut edge_mask = 0u16;
    let mut edge = 0;

    while edge < 12 {
      let c0 = EDGE_CORNERS[edge][0];
      let c1 = EDGE_CORNERS[edge][1];

      let inside0 = (case >> c0) & 1;
      let inside1 = (case >> c1) & 1;

      if inside0 != inside1 {
        edge_mask |= 1 << edge;
      }

      edge += 1;
    }

    table[case] = edge_mask;
    case += 1;
  }

  table
}

#[cfg(test)]
#[path = "edge_table_test.rs"]
mod edge_table_test;
