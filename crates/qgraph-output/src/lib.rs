//! Neo4j bulk-import table output.
//!
//! A [`GraphSnapshot`](qgraph_model::GraphSnapshot) is written as one CSV per
//! node label and one per relationship collection, using the header
//! conventions of `neo4j-admin database import`. [`import`] reads such a set
//! back.

mod error;
mod reader;
mod schema;
mod writer;

pub use error::{ExportError, Result};
pub use reader::import;
pub use schema::{Column, ColumnKind, Table};
pub use writer::{ExportReport, TableReport, export, table_rows};
