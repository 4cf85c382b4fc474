//! Library side of the `qgraph` binary: configuration, logging and the
//! pipeline stages behind each command.

pub mod analyze;
pub mod config;
pub mod logging;
pub mod merge;
pub mod pipeline;
