//! Gravity for the stepping engine
//!
//! Living bodies are split by mass into *real* bodies, which attract each other
//! exactly, and *pseudo* bodies, whose mass is folded into the real body that
//! pulls on them hardest. See [`gravity::ApproximateGravity`] for the passes and
//! [`partition::MassPartition`] for the split.

pub mod gravity;
pub mod partition;


pub use gravity::ApproximateGravity;
pub use partition::{MassPartition, PartitionRule};
