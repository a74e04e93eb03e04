//! Layered octree over the scalar field.
//!
//! Every resolution level is a separate layer owning an id-keyed table of
//! nodes. There are no pointers between nodes - parent/child relationships
//! are computed on demand via coordinate math and resolved by lookup in the
//! adjacent layer.
//!
//! # Depth Convention
//!
//! Depth 0 = coarsest (a single root cell), the last layer = finest.
//!
//! ```text
//! stride(depth) = root_stride >> depth
//! root_stride   = next_power_of_two(max(resolution))
//! ```
//!
//! # Module Structure
//!
//! - [`node`]: `OctreeNode` - cached corners, case mask, child mask, stats
//! - [`layer`]: `OctreeLayer` - one resolution level and its id range
//! - [`chain`]: `LayerChain` - id forwarding, lazy creation, cascading
//!   deletion and incremental corner pushes

pub mod chain;
pub mod layer;
pub mod node;

// Re-exports
pub use chain::{ChangedNodes, LayerChain};
pub use layer::OctreeLayer;
pub use node::{NodeId, OctreeNode, PushOutcome};
