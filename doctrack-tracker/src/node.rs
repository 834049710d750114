//! The recursive diff unit.
//!
//! A [`NodeTracker`] snapshots every tracked property of one object when it
//! is built. Each [`NodeTracker::diff`] recomputes the delta set from that
//! snapshot, delegating nested objects to child trackers and lists to the
//! collection differencers. [`NodeTracker::build_patch`] turns the result
//! into a patch rooted at a path prefix.
//!
//! Object graphs must be trees. A nested object that refers back to one of
//! its ancestors recurses without bound.

use crate::collection::{ObjectCollection, ValueCollection};
use crate::error::{TrackError, TrackResult};
use doctrack_model::{EntityModel, ModelConfig, ModelError, PropertyClassification, PropertyKind};
use doctrack_patch::{FieldPath, Patch};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Property values captured when a tracker was built. Never mutated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot(BTreeMap<String, Value>);

impl Snapshot {
    pub fn get(&self, property: &str) -> Option<&Value> {
        self.0.get(property)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Properties whose value is written whole, with their new value.
///
/// Holds changed scalars and null transitions of nested objects and lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeltaSet(Vec<(String, Value)>);

impl DeltaSet {
    pub fn get(&self, property: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == property).map(|(_, v)| v)
    }

    pub fn contains(&self, property: &str) -> bool {
        self.get(property).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn record(&mut self, property: &str, value: Value) {
        self.0.push((property.to_string(), value));
    }

    fn clear(&mut self) {
        self.0.clear();
    }
}

#[derive(Debug, Clone)]
enum Slot {
    Scalar,
    Object(Option<Box<NodeTracker>>),
    Values(Option<ValueCollection>),
    Objects(Option<ObjectCollection>),
}

#[derive(Debug, Clone)]
struct TrackedProperty {
    name: String,
    slot: Slot,
}

/// Tracks one object and, through its children, everything nested in it.
#[derive(Debug, Clone)]
pub struct NodeTracker {
    entity_type: String,
    version: Option<String>,
    snapshot: Snapshot,
    deltas: DeltaSet,
    properties: Vec<TrackedProperty>,
}

impl NodeTracker {
    /// Snapshots `document`, which must be a JSON object described by `model`.
    pub fn new(config: &ModelConfig, model: &EntityModel, document: &Value) -> TrackResult<Self> {
        let object = as_object(model, document)?;
        let mut snapshot = BTreeMap::new();
        let mut properties = Vec::new();

        for property in model.tracked_properties() {
            let value = read(model, object, &property.name)?;
            let slot = match property.kind {
                PropertyKind::NestedTrackedObject => Slot::Object(match value {
                    Value::Null => None,
                    value => {
                        let child_model = target_model(config, model, property)?;
                        Some(Box::new(NodeTracker::new(config, child_model, value)?))
                    }
                }),
                PropertyKind::ValueCollection => Slot::Values(match value {
                    Value::Null => None,
                    value => Some(ValueCollection::new(as_list(model, property, value)?.to_vec())),
                }),
                PropertyKind::TrackedObjectCollection => Slot::Objects(match value {
                    Value::Null => None,
                    value => {
                        let element_model = target_model(config, model, property)?;
                        let elements = as_list(model, property, value)?.to_vec();
                        Some(ObjectCollection::new(config, element_model, elements)?)
                    }
                }),
                _ => Slot::Scalar,
            };
            snapshot.insert(property.name.clone(), value.clone());
            properties.push(TrackedProperty {
                name: property.name.clone(),
                slot,
            });
        }

        Ok(Self {
            entity_type: model.entity_type.clone(),
            version: model.version().map(|p| p.name.clone()),
            snapshot: Snapshot(snapshot),
            deltas: DeltaSet::default(),
            properties,
        })
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn deltas(&self) -> &DeltaSet {
        &self.deltas
    }

    /// Diffs the current state of the object against the snapshot.
    ///
    /// The delta set is rebuilt from scratch, so diffing the same state twice
    /// gives the same result.
    pub fn diff(&mut self, current: &Value) -> TrackResult<()> {
        let object = current
            .as_object()
            .ok_or_else(|| TrackError::NotADocument(self.entity_type.clone()))?;
        self.deltas.clear();

        for property in &mut self.properties {
            let new = object
                .get(&property.name)
                .ok_or_else(|| TrackError::PropertyNotFound {
                    entity_type: self.entity_type.clone(),
                    property: property.name.clone(),
                })?;
            let old = self.snapshot.get(&property.name).unwrap_or(&Value::Null);

            if let Slot::Scalar = property.slot {
                if old != new {
                    self.deltas.record(&property.name, new.clone());
                }
                continue;
            }

            match (old.is_null(), new.is_null()) {
                (true, true) => {}
                (true, false) | (false, true) => self.deltas.record(&property.name, new.clone()),
                (false, false) => match &mut property.slot {
                    Slot::Object(Some(child)) => child.diff(new)?,
                    Slot::Values(Some(collection)) => {
                        collection.diff(list_value(&self.entity_type, &property.name, new)?)
                    }
                    Slot::Objects(Some(collection)) => {
                        collection.diff(list_value(&self.entity_type, &property.name, new)?)?
                    }
                    _ => {}
                },
            }
        }
        Ok(())
    }

    /// Returns true if this object or anything nested in it changed in the
    /// last diff.
    pub fn is_modified(&self) -> bool {
        !self.deltas.is_empty()
            || self.properties.iter().any(|property| match &property.slot {
                Slot::Scalar => false,
                Slot::Object(child) => child.as_ref().is_some_and(|c| c.is_modified()),
                Slot::Values(collection) => collection.as_ref().is_some_and(|c| c.is_modified()),
                Slot::Objects(collection) => collection.as_ref().is_some_and(|c| c.is_modified()),
            })
    }

    /// Builds the patch for this object stored at `prefix`.
    ///
    /// When the object has a version property and anything else changed, the
    /// version is set to the store's current time.
    pub fn build_patch(&self, prefix: &FieldPath) -> Patch {
        let mut parts = Vec::new();

        for property in &self.properties {
            let path = prefix.field(&property.name);
            if let Some(value) = self.deltas.get(&property.name) {
                parts.push(match (&property.slot, value) {
                    (Slot::Values(_) | Slot::Objects(_), Value::Array(values)) => {
                        Patch::replace(path, values.clone())
                    }
                    _ => Patch::set(path, value.clone()),
                });
                continue;
            }
            match &property.slot {
                Slot::Object(Some(child)) if child.is_modified() => parts.push(child.build_patch(&path)),
                Slot::Values(Some(collection)) => parts.push(collection.build_patch(&path)),
                Slot::Objects(Some(collection)) => parts.push(collection.build_patch(&path)),
                _ => {}
            }
        }

        let patch = Patch::combine(parts);
        match &self.version {
            Some(version) if !patch.is_empty() => {
                Patch::combine([patch, Patch::set_current_timestamp(prefix.field(version))])
            }
            _ => patch,
        }
    }
}

fn as_object<'a>(model: &EntityModel, document: &'a Value) -> TrackResult<&'a Map<String, Value>> {
    document
        .as_object()
        .ok_or_else(|| TrackError::NotADocument(model.entity_type.clone()))
}

fn read<'a>(model: &EntityModel, object: &'a Map<String, Value>, property: &str) -> TrackResult<&'a Value> {
    object.get(property).ok_or_else(|| TrackError::PropertyNotFound {
        entity_type: model.entity_type.clone(),
        property: property.into(),
    })
}

fn as_list<'a>(
    model: &EntityModel,
    property: &PropertyClassification,
    value: &'a Value,
) -> TrackResult<&'a [Value]> {
    list_value(&model.entity_type, &property.name, value)
}

fn list_value<'a>(entity_type: &str, property: &str, value: &'a Value) -> TrackResult<&'a [Value]> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| TrackError::TypeMismatch {
            entity_type: entity_type.into(),
            property: property.into(),
            expected: "a list",
        })
}

fn target_model<'c>(
    config: &'c ModelConfig,
    model: &EntityModel,
    property: &PropertyClassification,
) -> TrackResult<&'c EntityModel> {
    let target = property
        .declared_type
        .object_type()
        .or_else(|| property.declared_type.element().and_then(|e| e.object_type()))
        .ok_or_else(|| ModelError::NotAnObject {
            entity_type: model.entity_type.clone(),
            property: property.name.clone(),
        })?;
    config.get(target).ok_or_else(|| {
        ModelError::UnknownTarget {
            entity_type: model.entity_type.clone(),
            property: property.name.clone(),
            target: target.into(),
        }
        .into()
    })
}
