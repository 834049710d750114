//! Patch trees, filters and write operations.
//!
//! This crate defines the output side of the change tracker:
//! - [`FieldPath`]: dotted field/index path into a document
//! - [`Patch`] / [`PatchOp`]: composable tree of field-level operations
//! - [`Filter`]: conjunction of equality predicates guarding a write
//! - [`WriteOperation`]: insert, delete-by-filter or update-by-filter
//! - [`WriteSink`] / [`AsyncWriteSink`]: whatever executes those operations
//!
//! The [`render`] module turns patches and filters into update/query
//! documents for a document database. [`MemoryStore`] is an in-memory sink
//! that applies operations to JSON documents.

mod apply;
mod filter;
mod memory;
mod operation;
mod patch;
mod path;
pub mod render;

pub use apply::{apply_patch, ApplyError};
pub use filter::{FieldEquals, Filter};
pub use memory::{MemoryStore, MemoryStoreError};
pub use operation::{AsyncWriteSink, WriteOperation, WriteSink};
pub use patch::{Patch, PatchOp};
pub use path::{FieldPath, Segment};
