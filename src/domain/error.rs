//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors are raised only at the input boundary, when text is turned
/// into domain values. The tree editor itself never fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown combinator: {0} (expected AND or OR)")]
    UnknownCombinator(String),

    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("unknown condition attribute: {0} (expected field, operator or value)")]
    UnknownAttribute(String),

    #[error("field catalog must contain at least one field")]
    EmptyCatalog,

    #[error("duplicate field key in catalog: {0}")]
    DuplicateField(String),
}
