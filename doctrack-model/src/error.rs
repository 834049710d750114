//! Error types for model configuration.

use thiserror::Error;

/// Result type for model configuration.
pub type ModelResult<T> = Result<T, ModelError>;

/// Configuration errors, detected when a [`crate::ModelConfig`] is built
/// or when a root model is looked up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The same entity type was registered twice.
    #[error("entity type registered twice: {0}")]
    DuplicateEntityType(String),

    /// A property name appears twice within one entity type.
    #[error("property {property} declared twice on {entity_type}")]
    DuplicateProperty {
        entity_type: String,
        property: String,
    },

    /// No model is registered for the entity type.
    #[error("no model registered for entity type: {0}")]
    UnknownEntityType(String),

    /// A type used as a tracking root has no identifier property.
    #[error("entity type {0} has no identifier property")]
    MissingIdentifier(String),

    /// More than one property is classified as the identifier.
    #[error("entity type {0} declares more than one identifier")]
    MultipleIdentifiers(String),

    /// More than one property is classified as the version.
    #[error("entity type {0} declares more than one version property")]
    MultipleVersions(String),

    /// A version property is not declared as a timestamp.
    #[error("version property {property} on {entity_type} is not a timestamp")]
    VersionNotTimestamp {
        entity_type: String,
        property: String,
    },

    /// A collection-like property is not declared as a list.
    #[error("property {property} on {entity_type} is configured as a collection but is not a list")]
    NotACollection {
        entity_type: String,
        property: String,
    },

    /// A nested or collection-of-objects property does not declare an object type.
    #[error("property {property} on {entity_type} is configured as a tracked object but is not an object")]
    NotAnObject {
        entity_type: String,
        property: String,
    },

    /// A property refers to an entity type that has no registered model.
    #[error("property {property} on {entity_type} refers to unregistered type {target}")]
    UnknownTarget {
        entity_type: String,
        property: String,
        target: String,
    },
}
