//! Error types for the grammar traversal

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TraverseError>;

/// Raised when a node's shape does not match any recognized grammar rule.
///
/// This aborts extraction for the current statement rather than silently
/// skipping the construct: a missed table reference would corrupt the lineage
/// graph. Callers processing multiple statements should catch this
/// per-statement and continue with the next one.
///
/// An unresolvable table name or alias is deliberately *not* an error; the
/// traversal emits the empty-string sentinel instead (see
/// [`crate::hql_engine::traverse`]).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraverseError {
    #[error("Join table without a join keyword: {0}")]
    MissingJoinKeyword(String),

    #[error("Unrecognized table factor: {0}")]
    UnrecognizedTableFactor(String),

    #[error("Unexpected end of statement after {0}")]
    UnexpectedEndOfStatement(String),
}
