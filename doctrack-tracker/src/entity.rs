//! Root-level tracking of one entity.

use crate::error::{TrackError, TrackResult};
use crate::node::NodeTracker;
use doctrack_model::{EntityModel, ModelConfig, ModelError};
use doctrack_patch::{FieldEquals, FieldPath, Filter, Patch};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle of a tracked entity within one commit cycle.
///
/// Callers only ever set `Added` or `Deleted`. `Modified` is derived during
/// commit from `Default` when the diff finds changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityState {
    Default,
    Added,
    Modified,
    Deleted,
}

/// Wraps the root [`NodeTracker`] of an entity with its lifecycle state and
/// the optimistic-concurrency values captured at tracking time.
#[derive(Debug, Clone)]
pub struct EntityTracker {
    state: EntityState,
    root: NodeTracker,
    identifier: FieldEquals,
    version: Option<FieldEquals>,
    concurrency_tokens: Vec<FieldEquals>,
}

impl EntityTracker {
    /// Starts tracking `document` in the `Default` state.
    pub fn new(config: &ModelConfig, model: &EntityModel, document: &Value) -> TrackResult<Self> {
        let identifier = model
            .identifier()
            .ok_or_else(|| ModelError::MissingIdentifier(model.entity_type.clone()))?;
        let capture = |name: &str| -> TrackResult<FieldEquals> {
            let value = document.get(name).ok_or_else(|| TrackError::PropertyNotFound {
                entity_type: model.entity_type.clone(),
                property: name.into(),
            })?;
            Ok(FieldEquals {
                field: name.into(),
                value: value.clone(),
            })
        };

        Ok(Self {
            state: EntityState::Default,
            root: NodeTracker::new(config, model, document)?,
            identifier: capture(&identifier.name)?,
            version: model.version().map(|p| capture(&p.name)).transpose()?,
            concurrency_tokens: model
                .concurrency_tokens()
                .map(|p| capture(&p.name))
                .collect::<TrackResult<_>>()?,
        })
    }

    pub fn state(&self) -> EntityState {
        self.state
    }

    pub fn root(&self) -> &NodeTracker {
        &self.root
    }

    /// The identifier field and value.
    pub fn identifier(&self) -> &FieldEquals {
        &self.identifier
    }

    /// Marks the entity for insertion. Fails once it is marked deleted.
    pub fn mark_added(&mut self) -> TrackResult<()> {
        if self.state == EntityState::Deleted {
            return Err(TrackError::AlreadyDeleted(self.identifier.value.to_string()));
        }
        self.state = EntityState::Added;
        Ok(())
    }

    /// Marks the entity for deletion.
    pub fn mark_deleted(&mut self) {
        self.state = EntityState::Deleted;
    }

    /// Diffs `current` against the snapshot and derives `Modified` or
    /// `Default`. Added and deleted entities are not diffed.
    pub fn refresh(&mut self, current: &Value) -> TrackResult<EntityState> {
        if matches!(self.state, EntityState::Default | EntityState::Modified) {
            self.root.diff(current)?;
            self.state = if self.root.is_modified() {
                EntityState::Modified
            } else {
                EntityState::Default
            };
        }
        Ok(self.state)
    }

    /// Returns the patch for a modified entity.
    pub fn compute_patch(&self) -> TrackResult<Patch> {
        if self.state != EntityState::Modified {
            return Err(TrackError::InvalidState {
                expected: EntityState::Modified,
                actual: self.state,
            });
        }
        Ok(self.root.build_patch(&FieldPath::root()))
    }

    /// The version value captured at tracking time.
    pub fn captured_version(&self) -> Option<&FieldEquals> {
        self.version.as_ref()
    }

    /// The concurrency-token values captured at tracking time.
    pub fn captured_concurrency_tokens(&self) -> &[FieldEquals] {
        &self.concurrency_tokens
    }

    /// Identifier equality, plus version and token equality with the
    /// tracking-time values.
    pub fn filter(&self) -> Filter {
        let mut filter = Filter::by_field(&self.identifier.field, self.identifier.value.clone());
        for clause in self.version.iter().chain(&self.concurrency_tokens) {
            filter = filter.and_eq(&clause.field, clause.value.clone());
        }
        filter
    }
}
