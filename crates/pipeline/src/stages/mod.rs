//! The five pipeline stages, in execution order.
//!
//! Each stage takes the previous stage's records by reference and returns
//! new records; none mutates its input.

pub mod expander;
pub mod flag_processor;
pub mod normalizer;
pub mod profile_filter;
pub mod set_splitter;

pub use expander::expand;
pub use flag_processor::{process, resolve_selections, ResolvedSelections};
pub use normalizer::{normalize, NormalizedSubmission};
pub use profile_filter::{filter, filter_all, filter_flags};
pub use set_splitter::split;
