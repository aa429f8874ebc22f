mod accumulator;
mod boundary_policy;
mod writer;

pub use accumulator::{BlockAccumulator, PushOutcome};
pub use boundary_policy::{BoundaryMode, BoundaryPolicy, PrefixLengthPolicy, PrefixesPolicy, VolumePolicy};
pub use writer::{BlockWriter, BlockWriterStats, ListVolumes, WriterTimers};
