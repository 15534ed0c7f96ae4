//! Collision detection and resolution
//!
//! Detection keeps a registry of bodies whose bounding boxes overlap, maintained
//! by sweeping per-axis edge sequences. Resolution merges touching pairs.

pub mod detection;
pub mod resolution;


pub use detection::{BoundingEdges, OverlapId, OverlapRegistry};
pub use resolution::{Merge, absorbs, apply_collisions, merge_bodies};
