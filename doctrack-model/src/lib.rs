//! Model configuration for doctrack.
//!
//! Defines the static, per-entity-type metadata the change tracker consumes:
//! - [`PropertyClassification`]: what a declared property is (identifier,
//!   scalar, nested tracked object, collection, version, concurrency token)
//! - [`EntityModel`]: the ordered classifications of one entity type
//! - [`ModelConfig`]: the validated, immutable set of models a session uses
//! - [`Document`]: the contract a tracked root type implements
//!
//! Models are validated once, when the [`ModelConfig`] is built. Nothing in
//! here is global: every session receives its configuration explicitly.

mod config;
mod document;
mod error;
mod schema;

pub use config::{ModelConfig, ModelConfigBuilder};
pub use document::Document;
pub use error::{ModelError, ModelResult};
pub use schema::{DeclaredType, EntityModel, PropertyClassification, PropertyKind};
