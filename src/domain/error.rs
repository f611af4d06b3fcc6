//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::node::NodeId;

/// Domain errors represent conditions of the report model itself.
/// Per-item decode gaps are never errors; they degrade into partial nodes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("not a structured report: document has no content sequence")]
    NotStructuredReport,

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("invalid tag: {0}")]
    InvalidTag(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
