use crate::error::{ModelError, ModelResult};
use crate::schema::{DeclaredType, EntityModel, PropertyKind};
use std::collections::{HashMap, HashSet};

/// The validated set of entity models a session tracks against.
///
/// Built once, before any tracking starts, and never mutated afterwards.
/// Share it between sessions behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct ModelConfig {
    models: HashMap<String, EntityModel>,
}

impl ModelConfig {
    /// Starts building a configuration.
    pub fn builder() -> ModelConfigBuilder {
        ModelConfigBuilder::default()
    }

    /// Looks up the model for an entity type.
    pub fn get(&self, entity_type: &str) -> Option<&EntityModel> {
        self.models.get(entity_type)
    }

    /// Looks up the model of a tracking root, which must declare an identifier.
    pub fn root(&self, entity_type: &str) -> ModelResult<&EntityModel> {
        let model = self
            .get(entity_type)
            .ok_or_else(|| ModelError::UnknownEntityType(entity_type.into()))?;
        if model.identifier().is_none() {
            return Err(ModelError::MissingIdentifier(entity_type.into()));
        }
        Ok(model)
    }

    /// Returns the number of registered models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Returns true if no models are registered.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Iterates over the registered entity type names.
    pub fn entity_types(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }
}

/// Collects entity models and validates them as a whole.
#[derive(Debug, Default)]
pub struct ModelConfigBuilder {
    models: Vec<EntityModel>,
    roots: HashSet<String>,
}

impl ModelConfigBuilder {
    /// Registers a value-object or entity model.
    pub fn entity(mut self, model: EntityModel) -> Self {
        self.models.push(model);
        self
    }

    /// Registers a model that will be used as a tracking root.
    /// Roots must declare an identifier.
    pub fn root(mut self, model: EntityModel) -> Self {
        self.roots.insert(model.entity_type.clone());
        self.models.push(model);
        self
    }

    /// Validates every model and produces the immutable configuration.
    pub fn build(self) -> ModelResult<ModelConfig> {
        let mut models = HashMap::with_capacity(self.models.len());
        for model in self.models {
            if models.contains_key(&model.entity_type) {
                return Err(ModelError::DuplicateEntityType(model.entity_type));
            }
            models.insert(model.entity_type.clone(), model);
        }

        for model in models.values() {
            validate_model(model, &models)?;
        }
        for root in &self.roots {
            if models.get(root).and_then(EntityModel::identifier).is_none() {
                return Err(ModelError::MissingIdentifier(root.clone()));
            }
        }

        Ok(ModelConfig { models })
    }
}

fn validate_model(model: &EntityModel, models: &HashMap<String, EntityModel>) -> ModelResult<()> {
    let entity_type = &model.entity_type;
    let mut seen = HashSet::new();
    let mut identifiers = 0;
    let mut versions = 0;

    for property in &model.properties {
        if !seen.insert(property.name.as_str()) {
            return Err(ModelError::DuplicateProperty {
                entity_type: entity_type.clone(),
                property: property.name.clone(),
            });
        }

        let target = match property.kind {
            PropertyKind::Identifier => {
                identifiers += 1;
                None
            }
            PropertyKind::Version => {
                versions += 1;
                if property.declared_type != DeclaredType::Timestamp {
                    return Err(ModelError::VersionNotTimestamp {
                        entity_type: entity_type.clone(),
                        property: property.name.clone(),
                    });
                }
                None
            }
            PropertyKind::NestedTrackedObject => Some(
                property
                    .declared_type
                    .object_type()
                    .ok_or_else(|| ModelError::NotAnObject {
                        entity_type: entity_type.clone(),
                        property: property.name.clone(),
                    })?,
            ),
            PropertyKind::ValueCollection => {
                if property.declared_type.element().is_none() {
                    return Err(ModelError::NotACollection {
                        entity_type: entity_type.clone(),
                        property: property.name.clone(),
                    });
                }
                None
            }
            PropertyKind::TrackedObjectCollection => {
                let element = property.declared_type.element().ok_or_else(|| {
                    ModelError::NotACollection {
                        entity_type: entity_type.clone(),
                        property: property.name.clone(),
                    }
                })?;
                Some(element.object_type().ok_or_else(|| ModelError::NotAnObject {
                    entity_type: entity_type.clone(),
                    property: property.name.clone(),
                })?)
            }
            PropertyKind::Scalar | PropertyKind::ConcurrencyToken | PropertyKind::Ignored => None,
        };

        if let Some(target) = target {
            if !models.contains_key(target) {
                return Err(ModelError::UnknownTarget {
                    entity_type: entity_type.clone(),
                    property: property.name.clone(),
                    target: target.into(),
                });
            }
        }
    }

    if identifiers > 1 {
        return Err(ModelError::MultipleIdentifiers(entity_type.clone()));
    }
    if versions > 1 {
        return Err(ModelError::MultipleVersions(entity_type.clone()));
    }
    Ok(())
}
