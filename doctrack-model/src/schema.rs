use serde::{Deserialize, Serialize};

/// The declared type of a property, as the serialized document shows it.
///
/// Declared types exist so that misconfiguration (a version field that is not
/// a timestamp, a collection property that is not a list) is caught when the
/// model is built rather than halfway through a diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredType {
    String,
    Integer,
    Float,
    Bool,
    Timestamp,
    Uuid,
    /// Any JSON value; compared as a whole.
    Any,
    /// An embedded object described by the named [`EntityModel`].
    Object(String),
    /// An ordered list of the element type.
    List(Box<DeclaredType>),
}

impl DeclaredType {
    /// Shorthand for `List(element)`.
    pub fn list(element: DeclaredType) -> Self {
        Self::List(Box::new(element))
    }

    /// Shorthand for `Object(entity_type)`.
    pub fn object(entity_type: &str) -> Self {
        Self::Object(entity_type.into())
    }

    /// Returns the element type if this is a list.
    pub fn element(&self) -> Option<&DeclaredType> {
        match self {
            Self::List(element) => Some(element),
            _ => None,
        }
    }

    /// Returns the model name if this is an embedded object.
    pub fn object_type(&self) -> Option<&str> {
        match self {
            Self::Object(name) => Some(name),
            _ => None,
        }
    }
}

/// How the change tracker treats a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    /// Registry key and filter field. Never diffed.
    Identifier,
    /// Compared by value.
    Scalar,
    /// An embedded object diffed field by field.
    NestedTrackedObject,
    /// A list of plain values diffed as a multiset.
    ValueCollection,
    /// A list of embedded objects, each diffed field by field.
    TrackedObjectCollection,
    /// Timestamp touched whenever anything else changes; guards writes.
    Version,
    /// Compared by value; its tracking-time value guards writes.
    ConcurrencyToken,
    /// Not tracked.
    Ignored,
}

/// Classification of one declared property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyClassification {
    /// Property name in the serialized document.
    pub name: String,
    pub declared_type: DeclaredType,
    pub kind: PropertyKind,
}

impl PropertyClassification {
    fn simple(name: &str, declared_type: DeclaredType, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            declared_type,
            kind,
        }
    }

    /// Shorthand for the identifier property.
    pub fn identifier(name: &str, declared_type: DeclaredType) -> Self {
        Self::simple(name, declared_type, PropertyKind::Identifier)
    }

    /// Shorthand for a plain value property.
    pub fn scalar(name: &str, declared_type: DeclaredType) -> Self {
        Self::simple(name, declared_type, PropertyKind::Scalar)
    }

    /// Shorthand for an embedded object described by `entity_type`.
    pub fn nested(name: &str, entity_type: &str) -> Self {
        Self::simple(
            name,
            DeclaredType::object(entity_type),
            PropertyKind::NestedTrackedObject,
        )
    }

    /// Shorthand for a list of plain values.
    pub fn values(name: &str, element: DeclaredType) -> Self {
        Self::simple(name, DeclaredType::list(element), PropertyKind::ValueCollection)
    }

    /// Shorthand for a list of embedded objects described by `entity_type`.
    pub fn objects(name: &str, entity_type: &str) -> Self {
        Self::simple(
            name,
            DeclaredType::list(DeclaredType::object(entity_type)),
            PropertyKind::TrackedObjectCollection,
        )
    }

    /// Shorthand for the version timestamp.
    pub fn version(name: &str) -> Self {
        Self::simple(name, DeclaredType::Timestamp, PropertyKind::Version)
    }

    /// Shorthand for a concurrency token.
    pub fn concurrency_token(name: &str, declared_type: DeclaredType) -> Self {
        Self::simple(name, declared_type, PropertyKind::ConcurrencyToken)
    }

    /// Shorthand for a property the tracker ignores.
    pub fn ignored(name: &str) -> Self {
        Self::simple(name, DeclaredType::Any, PropertyKind::Ignored)
    }

    /// Returns true if the tracker snapshots and diffs this property.
    pub fn is_tracked(&self) -> bool {
        !matches!(
            self.kind,
            PropertyKind::Identifier | PropertyKind::Version | PropertyKind::Ignored
        )
    }
}

/// The classified properties of one entity or value-object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityModel {
    pub entity_type: String,
    pub properties: Vec<PropertyClassification>,
}

impl EntityModel {
    /// Creates a model from its ordered property classifications.
    pub fn new(entity_type: &str, properties: Vec<PropertyClassification>) -> Self {
        Self {
            entity_type: entity_type.into(),
            properties,
        }
    }

    /// Looks up a property by name.
    pub fn property(&self, name: &str) -> Option<&PropertyClassification> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// The identifier property, if declared.
    pub fn identifier(&self) -> Option<&PropertyClassification> {
        self.first_of(PropertyKind::Identifier)
    }

    /// The version property, if declared.
    pub fn version(&self) -> Option<&PropertyClassification> {
        self.first_of(PropertyKind::Version)
    }

    /// All concurrency token properties, in declaration order.
    pub fn concurrency_tokens(&self) -> impl Iterator<Item = &PropertyClassification> {
        self.properties
            .iter()
            .filter(|p| p.kind == PropertyKind::ConcurrencyToken)
    }

    /// Properties the tracker snapshots and diffs, in declaration order.
    pub fn tracked_properties(&self) -> impl Iterator<Item = &PropertyClassification> {
        self.properties.iter().filter(|p| p.is_tracked())
    }

    fn first_of(&self, kind: PropertyKind) -> Option<&PropertyClassification> {
        self.properties.iter().find(|p| p.kind == kind)
    }
}
