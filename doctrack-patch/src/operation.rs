//! Write operations and the sinks that execute them.

use crate::filter::Filter;
use crate::patch::Patch;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One write against the backing store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WriteOperation {
    /// Insert a new document.
    Insert { document: Value },
    /// Delete the document matching the filter.
    Delete { filter: Filter },
    /// Apply a patch to the document matching the filter.
    Update { filter: Filter, patch: Patch },
}

impl WriteOperation {
    /// Short name of the operation kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "insert",
            Self::Delete { .. } => "delete",
            Self::Update { .. } => "update",
        }
    }

    /// The filter guarding this write, if any.
    pub fn filter(&self) -> Option<&Filter> {
        match self {
            Self::Insert { .. } => None,
            Self::Delete { filter } | Self::Update { filter, .. } => Some(filter),
        }
    }
}

/// Executes write operations against a store.
///
/// A sink must either apply the whole slice or report an error; the caller
/// keeps the corresponding changes pending when it does.
pub trait WriteSink {
    type Error: std::error::Error + Send + Sync + 'static;

    fn execute(&mut self, operations: &[WriteOperation]) -> Result<(), Self::Error>;
}

/// Asynchronous variant of [`WriteSink`] for drivers with an async bulk API.
#[async_trait]
pub trait AsyncWriteSink: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn execute(&self, operations: &[WriteOperation]) -> Result<(), Self::Error>;
}
