//! Marching Cubes mesh generation over the adaptive octree.
//!
//! ```text
//!   Volume ──► RenderPlan ──► emit per node ──► MeshBuilder ──► MeshOutput
//!              (lod policy)   (edge points,      (weld + smooth
//!                              reconciled)        normals)
//! ```

pub mod builder;
pub mod extractor;
pub mod interpolate;

pub use builder::{Degenerate, MeshBuilder};
pub use extractor::{Extraction, MeshExtractor};
pub use interpolate::vertex_lerp;
