//! Graph construction from question records.
//!
//! Records go in one at a time through [`GraphBuilder::ingest`]; a
//! [`GraphSnapshot`](qgraph_model::GraphSnapshot) comes out of
//! [`GraphBuilder::finalize`].

mod builder;
mod stats;

pub use builder::{GraphBuilder, IngestOutcome};
pub use qgraph_normalize::SkipReason;
pub use stats::BuildStats;
