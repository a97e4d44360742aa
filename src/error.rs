//! Error types for the converge crate

use crate::runner::RunPhase;
use crate::value::ValueKind;
use thiserror::Error;

/// Errors that can occur during type registration, property assignment, and
/// action runs
#[derive(Error, Debug)]
pub enum Error {
    /// A second name property was declared on one resource type
    #[error("resource type '{type_name}' declares more than one name property: '{first}' and '{second}'")]
    DuplicateNameProperty {
        type_name: String,
        first: String,
        second: String,
    },

    /// A value assigned to a property failed its declared constraint; the
    /// assignment did not take effect
    #[error("property '{property}' on resource type '{type_name}' expects {expected}, got {actual}")]
    TypeConstraint {
        type_name: String,
        property: String,
        expected: ValueKind,
        actual: ValueKind,
    },

    /// Assignment to a property the resource type does not declare
    #[error("resource type '{type_name}' has no property named '{property}'")]
    UnknownProperty {
        type_name: String,
        property: String,
    },

    /// No hand-written provider or inline action resolves for the pair
    #[error("no provider found for resource type '{type_name}' action '{action}'")]
    NoProviderFound { type_name: String, action: String },

    /// A pipeline phase failed; the underlying error is chained unmodified
    #[error("{phase} failed for resource type '{type_name}' action '{action}': {source}")]
    Phase {
        phase: RunPhase,
        type_name: String,
        action: String,
        #[source]
        source: Box<Error>,
    },

    /// Failure raised inside an externally authored hook or action body
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type for convergence operations
pub type Result<T> = std::result::Result<T, Error>;
