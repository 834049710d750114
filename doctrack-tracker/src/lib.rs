//! Change tracking and update synthesis for document stores.
//!
//! Register live objects with a [`Session`], mutate them with ordinary field
//! assignment, and commit: the session diffs every tracked object against
//! the snapshot taken when it was tracked and produces the minimal set of
//! write operations (inserts, deletes, field-level updates) that bring the
//! store in line.
//!
//! # Architecture
//!
//! - **Session**: registry of tracked roots; partitions them by lifecycle
//!   state on commit and emits one write operation per changed entity
//! - **Entity tracker**: lifecycle state plus the version and concurrency
//!   token values that guard each write
//! - **Node tracker**: snapshot and diff of one object, recursing into nested
//!   objects and collections
//! - **Collection differencer**: multiset diff of lists, choosing between
//!   append, remove, element-level patches and whole-list replacement
//!
//! The tracker never talks to a store itself. Operations go to a
//! [`doctrack_patch::WriteSink`], or are handed to the caller as a
//! [`CommitBatch`] and acknowledged once written.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use doctrack_model::{DeclaredType, Document, EntityModel, ModelConfig, PropertyClassification as P};
//! use doctrack_tracker::Session;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Note {
//!     id: u32,
//!     title: String,
//! }
//!
//! impl Document for Note {
//!     const ENTITY_TYPE: &'static str = "note";
//!     type Id = u32;
//!     fn id(&self) -> u32 {
//!         self.id
//!     }
//! }
//!
//! let models = ModelConfig::builder()
//!     .root(EntityModel::new(
//!         "note",
//!         vec![
//!             P::identifier("id", DeclaredType::Integer),
//!             P::scalar("title", DeclaredType::String),
//!         ],
//!     ))
//!     .build()
//!     .unwrap();
//!
//! let mut session = Session::<Note>::new(Arc::new(models)).unwrap();
//! session.track(Note { id: 1, title: "draft".into() }).unwrap();
//! session.get_mut(&1).unwrap().title = "final".into();
//!
//! let batch = session.commit().unwrap();
//! assert_eq!(batch.len(), 1);
//! session.acknowledge(batch).unwrap();
//! assert!(session.commit().unwrap().is_empty());
//! ```

pub mod collection;
mod commit;
mod config;
mod entity;
mod error;
pub mod node;
mod session;

pub use collection::{CollectionShape, ObjectCollection, ValueCollection};
pub use commit::{CommitBatch, CommitSummary};
pub use config::{SessionConfig, DEFAULT_BATCH_SIZE};
pub use entity::{EntityState, EntityTracker};
pub use error::{CommitError, TrackError, TrackResult};
pub use node::{DeltaSet, NodeTracker, Snapshot};
pub use session::Session;
