//! Tracking session: registry of tracked roots and commit orchestration.
//!
//! A session owns the instances it tracks. Callers mutate them through
//! [`Session::get_mut`] (or the reference returned by `track`/`add`) and
//! commit when done. The session is a plain single-threaded data structure;
//! wrap it in a lock to share it.

use crate::commit::{CommitBatch, CommitSummary, Settlement};
use crate::config::SessionConfig;
use crate::entity::{EntityState, EntityTracker};
use crate::error::{CommitError, TrackError, TrackResult};
use doctrack_model::{Document, EntityModel, ModelConfig};
use doctrack_patch::{AsyncWriteSink, WriteOperation, WriteSink};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

struct Tracked<T> {
    instance: T,
    tracker: EntityTracker,
}

/// Tracks instances of one root type `T` and turns their changes into write
/// operations.
pub struct Session<T: Document> {
    config: SessionConfig,
    models: Arc<ModelConfig>,
    entries: HashMap<T::Id, Tracked<T>>,
    /// Registration order, for deterministic commits.
    order: Vec<T::Id>,
}

impl<T: Document> Session<T> {
    /// Creates a session with the default configuration.
    ///
    /// Fails if `T::ENTITY_TYPE` has no model or its model has no identifier.
    pub fn new(models: Arc<ModelConfig>) -> TrackResult<Self> {
        Self::with_config(models, SessionConfig::default())
    }

    /// Creates a session with a custom configuration.
    pub fn with_config(models: Arc<ModelConfig>, config: SessionConfig) -> TrackResult<Self> {
        models.root(T::ENTITY_TYPE)?;
        Ok(Self {
            config,
            models,
            entries: HashMap::new(),
            order: Vec::new(),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn model(models: &ModelConfig) -> TrackResult<&EntityModel> {
        Ok(models.root(T::ENTITY_TYPE)?)
    }

    fn new_tracker(&self, document: &Value) -> TrackResult<EntityTracker> {
        EntityTracker::new(&self.models, Self::model(&self.models)?, document)
    }

    // ── Registry ─────────────────────────────────────────────────

    /// Starts tracking `instance` and returns the tracked instance.
    ///
    /// If an instance with the same identifier is already tracked, that one
    /// is returned and `instance` is dropped.
    pub fn track(&mut self, instance: T) -> TrackResult<&mut T> {
        let id = instance.id();
        if self.entries.contains_key(&id) {
            debug!("[{}] {:?} already tracked, returning tracked instance", self.config.name, id);
        } else {
            let tracker = self.new_tracker(&serde_json::to_value(&instance)?)?;
            self.register(id.clone(), instance, tracker);
            debug!("[{}] Tracking {} {:?}", self.config.name, T::ENTITY_TYPE, id);
        }
        self.get_mut(&id)
    }

    /// Registers a new instance for insertion on the next commit.
    pub fn add(&mut self, instance: T) -> TrackResult<&mut T> {
        let id = instance.id();
        if let Some(existing) = self.entries.get(&id) {
            return Err(match existing.tracker.state() {
                EntityState::Deleted => TrackError::AlreadyDeleted(format!("{id:?}")),
                _ => TrackError::AlreadyTracked(format!("{id:?}")),
            });
        }
        let mut tracker = self.new_tracker(&serde_json::to_value(&instance)?)?;
        tracker.mark_added()?;
        self.register(id.clone(), instance, tracker);
        debug!("[{}] Added {} {:?}", self.config.name, T::ENTITY_TYPE, id);
        self.get_mut(&id)
    }

    fn register(&mut self, id: T::Id, instance: T, tracker: EntityTracker) {
        self.order.push(id.clone());
        self.entries.insert(id, Tracked { instance, tracker });
    }

    fn deregister(&mut self, id: &T::Id) -> Option<T> {
        let tracked = self.entries.remove(id)?;
        self.order.retain(|k| k != id);
        Some(tracked.instance)
    }

    /// Marks the entity for deletion on the next commit.
    ///
    /// An entity that was added but never committed is simply forgotten.
    pub fn delete(&mut self, id: &T::Id) -> TrackResult<()> {
        let tracked = self
            .entries
            .get_mut(id)
            .ok_or_else(|| TrackError::NotFound(format!("{id:?}")))?;
        if tracked.tracker.state() == EntityState::Added {
            self.deregister(id);
            debug!("[{}] Discarded uncommitted {:?}", self.config.name, id);
        } else {
            tracked.tracker.mark_deleted();
            debug!("[{}] Marked {:?} deleted", self.config.name, id);
        }
        Ok(())
    }

    /// Returns the tracked instance.
    pub fn get(&self, id: &T::Id) -> TrackResult<&T> {
        self.entries
            .get(id)
            .map(|t| &t.instance)
            .ok_or_else(|| TrackError::NotFound(format!("{id:?}")))
    }

    /// Returns the tracked instance for mutation.
    ///
    /// Do not change the identifier; the next commit rejects it.
    pub fn get_mut(&mut self, id: &T::Id) -> TrackResult<&mut T> {
        self.entries
            .get_mut(id)
            .map(|t| &mut t.instance)
            .ok_or_else(|| TrackError::NotFound(format!("{id:?}")))
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.entries.contains_key(id)
    }

    /// Lifecycle state of a tracked entity.
    pub fn state(&self, id: &T::Id) -> Option<EntityState> {
        self.entries.get(id).map(|t| t.tracker.state())
    }

    /// The entity tracker of a tracked entity.
    pub fn tracker(&self, id: &T::Id) -> Option<&EntityTracker> {
        self.entries.get(id).map(|t| &t.tracker)
    }

    /// Stops tracking without writing anything and hands the instance back.
    pub fn detach(&mut self, id: &T::Id) -> Option<T> {
        self.deregister(id)
    }

    /// Tracked identifiers in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &T::Id> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ── Commit ───────────────────────────────────────────────────

    /// Computes the write operations for every pending change.
    ///
    /// Inserts come first, then deletes and updates, each in registration
    /// order. Nothing is finalized until the batch is passed to
    /// [`Session::acknowledge`].
    pub fn commit(&mut self) -> TrackResult<CommitBatch<T::Id>> {
        let mut inserts = CommitBatch::default();
        let mut writes = CommitBatch::default();

        for id in &self.order {
            let Some(tracked) = self.entries.get_mut(id) else {
                continue;
            };
            let current_id = tracked.instance.id();
            if current_id != *id {
                return Err(TrackError::IdentifierChanged {
                    tracked: format!("{id:?}"),
                    current: format!("{current_id:?}"),
                });
            }

            match tracked.tracker.state() {
                EntityState::Added => {
                    let document = serde_json::to_value(&tracked.instance)?;
                    inserts.push(
                        WriteOperation::Insert {
                            document: document.clone(),
                        },
                        Settlement::Inserted {
                            id: id.clone(),
                            document,
                        },
                    );
                }
                EntityState::Deleted => writes.push(
                    WriteOperation::Delete {
                        filter: tracked.tracker.filter(),
                    },
                    Settlement::Deleted { id: id.clone() },
                ),
                EntityState::Default | EntityState::Modified => {
                    let document = serde_json::to_value(&tracked.instance)?;
                    if tracked.tracker.refresh(&document)? != EntityState::Modified {
                        continue;
                    }
                    writes.push(
                        WriteOperation::Update {
                            filter: tracked.tracker.filter(),
                            patch: tracked.tracker.compute_patch()?,
                        },
                        Settlement::Updated {
                            id: id.clone(),
                            document,
                        },
                    );
                }
            }
        }

        inserts.append(writes);
        let summary = inserts.summary();
        debug!(
            "[{}] Prepared commit: {} inserts, {} updates, {} deletes",
            self.config.name, summary.inserted, summary.updated, summary.deleted
        );
        Ok(inserts)
    }

    /// Finalizes a batch after the store accepted its operations.
    ///
    /// Inserted entities become `Default`, updated entities are rebased onto
    /// the committed state, deleted entities stop being tracked.
    ///
    /// Rebasing uses the in-memory document. For an entity with a version
    /// property the store wrote its own current time, so the rebased tracker
    /// still holds the previous version and the next guarded update or
    /// delete of that entity matches nothing. [`Session::detach`] the stale
    /// instance and [`Session::track`] a copy reloaded from the store before
    /// writing it again.
    pub fn acknowledge(&mut self, batch: CommitBatch<T::Id>) -> TrackResult<()> {
        for settlement in batch.into_settlements() {
            match settlement {
                Settlement::Deleted { id } => {
                    self.deregister(&id);
                }
                Settlement::Inserted { id, document } | Settlement::Updated { id, document } => {
                    let mut tracker = self.new_tracker(&document)?;
                    let Some(tracked) = self.entries.get_mut(&id) else {
                        debug!("[{}] {:?} no longer tracked, skipping", self.config.name, id);
                        continue;
                    };
                    if tracked.tracker.state() == EntityState::Deleted {
                        tracker.mark_deleted();
                    }
                    tracked.tracker = tracker;
                }
            }
        }
        Ok(())
    }

    /// Commits into a synchronous sink, acknowledging each chunk of
    /// [`SessionConfig::batch_size`] operations once the sink accepted it.
    ///
    /// Acknowledging rebases updated entities as described on
    /// [`Session::acknowledge`]: a versioned entity must be reloaded and
    /// re-tracked before its next write, or the sink reports no match.
    pub fn commit_to<S: WriteSink>(&mut self, sink: &mut S) -> Result<CommitSummary, CommitError<S::Error>> {
        let batch = self.commit()?;
        let summary = batch.summary();
        for chunk in batch.into_chunks(self.config.batch_size) {
            if let Err(e) = sink.execute(chunk.operations()) {
                warn!("[{}] Write sink rejected {} operations: {}", self.config.name, chunk.len(), e);
                return Err(CommitError::Sink(e));
            }
            self.acknowledge(chunk)?;
        }
        info!("[{}] Committed {} operations", self.config.name, summary.total());
        Ok(summary)
    }

    /// Commits into an asynchronous sink. Same chunking and acknowledgement
    /// as [`Session::commit_to`].
    pub async fn commit_async<S: AsyncWriteSink>(
        &mut self,
        sink: &S,
    ) -> Result<CommitSummary, CommitError<S::Error>> {
        let batch = self.commit()?;
        let summary = batch.summary();
        for chunk in batch.into_chunks(self.config.batch_size) {
            if let Err(e) = sink.execute(chunk.operations()).await {
                warn!("[{}] Write sink rejected {} operations: {}", self.config.name, chunk.len(), e);
                return Err(CommitError::Sink(e));
            }
            self.acknowledge(chunk)?;
        }
        info!("[{}] Committed {} operations", self.config.name, summary.total());
        Ok(summary)
    }
}
