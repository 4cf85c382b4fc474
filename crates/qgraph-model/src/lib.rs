pub mod error;
pub mod graph;
pub mod ids;
pub mod record;

pub use error::{ModelError, Result};
pub use graph::{
    ConflictKind, Edge, EdgeKind, GraphCounts, GraphSnapshot, NodeLabel, OptionEdge, OptionNode,
    PaperNode, QuestionNode, RelationType, TaxonomyConflict, TaxonomyNode,
};
pub use ids::{NodeId, UNSPECIFIED};
pub use record::{FieldIssue, QuestionRecord};
