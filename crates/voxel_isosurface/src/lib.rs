//! voxel_isosurface - Adaptive octree Marching Cubes for editable voxel volumes
//!
//! This crate extracts triangle meshes from a dense scalar density field. The
//! field is mirrored by a layered octree holding only cells the surface
//! passes through, so single-voxel edits touch a handful of nodes instead of
//! the whole volume.
//!
//! # Features
//!
//! - **Incremental edits**: `Volume::set` updates the affected nodes in every
//!   layer and reports which ones changed
//! - **Level of detail**: a [`DetailPolicy`] decides per node whether to mesh
//!   it or descend; [`SurfaceLodPolicy`] keeps coarse cells wherever they
//!   capture the surface without loss of topology
//! - **Crack-free transitions**: fine edge intersections on the border of a
//!   coarser rendered cell are snapped onto the coarse surface
//! - **Welded output**: shared vertices with angle-weighted smooth normals
//!
//! # Example
//!
//! ```ignore
//! use glam::IVec3;
//! use voxel_isosurface::{MeshExtractor, Volume, VolumeConfig};
//!
//! let mut volume = Volume::new(VolumeConfig::cubic(32))?;
//! volume.set(IVec3::new(10, 12, 9), 1.0);
//!
//! let extraction = MeshExtractor::new().build(&volume);
//! println!("{} triangles in {}us",
//!     extraction.mesh.triangle_count(), extraction.stats.build_time_us);
//! ```

pub mod config;
pub mod constants;
pub mod dirty;
pub mod edge_table;
pub mod error;
pub mod field;
pub mod tri_table;
pub mod types;

// Re-export commonly used items
pub use config::VolumeConfig;
pub use constants::{
  CORNER_OFFSETS, DEFAULT_DENSITY, DEFAULT_ISO_LEVEL, LERP_EPSILON, MAX_LAYERS, MAX_RESOLUTION,
  UNKNOWN_DENSITY,
};
pub use dirty::{DirtyRegion, DirtyTracker};
pub use edge_table::{EDGE_CORNERS, EDGE_TABLE};
pub use error::VolumeError;
pub use field::ScalarField;
pub use tri_table::TRI_TABLE;
pub use types::{MeshOutput, MeshSink, MinMaxAABB, Vertex};

// Layered octree mirroring the field
pub mod octree;
pub use octree::{LayerChain, NodeId, OctreeNode};

// Density field plus octree, edited together
pub mod volume;
pub use volume::{EditOutcome, Volume};

// Level-of-detail selection
pub mod lod;
pub use lod::{DetailPolicy, RenderPlan, SurfaceLodPolicy};

// Coarse/fine edge reconciliation
pub mod reconcile;
pub use reconcile::{EdgeOverride, EdgeQuery, EdgeReconciler};

// Mesh generation
pub mod mesh;
pub use mesh::{Extraction, MeshExtractor};

pub mod stats;
pub use stats::{ExtractionStats, OverrideKind};

#[cfg(test)]
mod test_utils;
