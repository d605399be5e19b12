//! Application services
//!
//! Services orchestrate domain logic and depend on I/O boundary traits.

pub mod prune;

pub use prune::{ensure_output_free, PruneRequest, PruneService, PruneSummary};
