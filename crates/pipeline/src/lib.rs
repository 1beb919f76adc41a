pub mod config;
pub mod engine;
pub mod registry;
pub mod stages;
#[cfg(feature = "telemetry")]
pub mod telemetry;

pub use engine::{run, run_batch, PipelineOutput, PipelineStats, SplitFailure};
pub use registry::{FlagLookup, Registry};
