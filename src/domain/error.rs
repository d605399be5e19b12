//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent malformed documents and tree invariant violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("malformed XML at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    #[error("input is not valid {encoding}")]
    Undecodable { encoding: String },

    #[error("unsupported encoding {0:?} in XML declaration")]
    UnknownEncoding(String),

    #[error("document has no root element")]
    MissingRoot,

    #[error("document has more than one root element")]
    MultipleRoots,

    #[error("unexpected closing tag </{0}>")]
    UnexpectedClose(String),

    #[error("unclosed element <{0}> at end of document")]
    Unclosed(String),

    #[error("node is not a child of the given parent")]
    NotAChild,

    #[error("node handle no longer refers to a live node")]
    DanglingNode,
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
