//! Error types for the tracker.

use crate::entity::EntityState;
use doctrack_model::ModelError;
use thiserror::Error;

/// Result type for tracking operations.
pub type TrackResult<T> = Result<T, TrackError>;

/// Errors that can occur while tracking or committing.
///
/// Everything except `Serialization` is a contract violation by the caller
/// or a model that does not match the tracked types.
#[derive(Debug, Error)]
pub enum TrackError {
    /// `add` for an identifier that is already registered.
    #[error("entity already tracked: {0}")]
    AlreadyTracked(String),

    /// `add` for an identifier that is registered as deleted.
    #[error("entity is marked deleted: {0}")]
    AlreadyDeleted(String),

    /// `get`/`delete` for an identifier that is not registered.
    #[error("entity not tracked: {0}")]
    NotFound(String),

    /// An operation requires a different lifecycle state.
    #[error("entity is {actual:?}, expected {expected:?}")]
    InvalidState {
        expected: EntityState,
        actual: EntityState,
    },

    /// The identifier of a tracked instance was mutated.
    #[error("identifier of tracked entity changed from {tracked} to {current}")]
    IdentifierChanged { tracked: String, current: String },

    /// A classified property is absent from the serialized instance.
    #[error("property {property} not found on {entity_type}")]
    PropertyNotFound {
        entity_type: String,
        property: String,
    },

    /// A property holds a value of the wrong shape for its classification.
    #[error("property {property} on {entity_type} is not {expected}")]
    TypeMismatch {
        entity_type: String,
        property: String,
        expected: &'static str,
    },

    /// An instance did not serialize to a JSON object.
    #[error("{0} did not serialize to an object")]
    NotADocument(String),

    /// Model configuration error.
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from committing straight into a write sink.
#[derive(Debug, Error)]
pub enum CommitError<E>
where
    E: std::error::Error + 'static,
{
    /// Preparing or finalizing the commit failed.
    #[error(transparent)]
    Track(#[from] TrackError),

    /// The sink rejected a batch. Its changes stay pending.
    #[error("write sink failed: {0}")]
    Sink(#[source] E),
}
