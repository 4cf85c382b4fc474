use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("identifier must not be empty")]
    EmptyIdentifier,
    #[error("unknown node label: {0}")]
    UnknownLabel(String),
    #[error("unknown relationship type: {0}")]
    UnknownRelation(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
