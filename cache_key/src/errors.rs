//! Error types for cache key building
//!
//! Every variant is a programming error on the caller side and is raised
//! before any fetch is attempted.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KeyError {
    #[error("Invalid resource kind '{0}': must be non-empty and cannot contain ':'")]
    InvalidResourceKind(String),

    #[error("Parameter name cannot be empty")]
    EmptyParameterName,

    #[error("Duplicate parameter: {0}")]
    DuplicateParameter(String),

    #[error("Parameter '{0}' holds a non-finite float")]
    NonFiniteFloat(String),

    #[error("Parameter '{0}' holds a nested list")]
    NestedList(String),

    #[error("Unsupported parameter value: {0}")]
    Unsupported(String),
}
