use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;

/// A root type that can be tracked by a session.
///
/// The serialized form is the property accessor: every property classified
/// in the type's [`crate::EntityModel`] must appear in the JSON object
/// produced by `serde_json::to_value`. Do not combine tracked properties
/// with `skip_serializing_if`.
///
/// The identifier must stay stable for as long as the instance is tracked.
pub trait Document: Serialize {
    /// Name of the [`crate::EntityModel`] describing this type.
    const ENTITY_TYPE: &'static str;

    /// Registry key for tracked instances.
    type Id: Clone + Eq + Hash + Debug;

    /// Returns the identifier of this instance.
    fn id(&self) -> Self::Id;
}
