//! Domain-level errors
//!
//! The tree engine itself is total: lookups report absence with `Option`,
//! mutations with `bool`. Errors only arise at the wire boundary.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("invalid tree document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("node not in tree: {0}")]
    UnknownNode(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
