//! In-memory document store.
//!
//! Holds one collection of JSON documents and executes write operations
//! against it. A batch is applied to a copy of the collection and only
//! swapped in when every operation succeeded.

use crate::apply::{apply_patch, ApplyError};
use crate::filter::Filter;
use crate::operation::{WriteOperation, WriteSink};
use crate::render::filter_document;
use chrono::Utc;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Errors reported by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryStoreError {
    /// No document matched the filter (missing, or a stale concurrency value).
    #[error("no document matches filter {0}")]
    NoMatch(String),

    /// A document with the same key already exists.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// An inserted document has no key field.
    #[error("document has no {0} field")]
    MissingKey(String),

    /// The patch could not be applied.
    #[error("patch failed: {0}")]
    Apply(#[from] ApplyError),
}

/// A single collection of documents keyed by one field.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    key_field: String,
    documents: Vec<Value>,
}

impl MemoryStore {
    /// Creates an empty store whose documents are keyed by `key_field`.
    pub fn new(key_field: &str) -> Self {
        Self {
            key_field: key_field.into(),
            documents: Vec::new(),
        }
    }

    /// Returns the document whose key equals `key`.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.documents
            .iter()
            .find(|doc| doc.get(&self.key_field) == Some(key))
    }

    /// Returns all documents in insertion order.
    pub fn documents(&self) -> &[Value] {
        &self.documents
    }

    /// Returns the number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn position(documents: &[Value], filter: &Filter) -> Result<usize, MemoryStoreError> {
        documents
            .iter()
            .position(|doc| filter.matches(doc))
            .ok_or_else(|| MemoryStoreError::NoMatch(filter_document(filter).to_string()))
    }

    fn execute_one(&self, documents: &mut Vec<Value>, operation: &WriteOperation) -> Result<(), MemoryStoreError> {
        match operation {
            WriteOperation::Insert { document } => {
                let key = document
                    .get(&self.key_field)
                    .ok_or_else(|| MemoryStoreError::MissingKey(self.key_field.clone()))?;
                if documents.iter().any(|doc| doc.get(&self.key_field) == Some(key)) {
                    return Err(MemoryStoreError::DuplicateKey(key.to_string()));
                }
                documents.push(document.clone());
            }
            WriteOperation::Delete { filter } => {
                let index = Self::position(documents, filter)?;
                documents.remove(index);
            }
            WriteOperation::Update { filter, patch } => {
                let index = Self::position(documents, filter)?;
                apply_patch(&mut documents[index], patch, Utc::now())?;
            }
        }
        Ok(())
    }
}

impl WriteSink for MemoryStore {
    type Error = MemoryStoreError;

    fn execute(&mut self, operations: &[WriteOperation]) -> Result<(), Self::Error> {
        let mut documents = self.documents.clone();
        for operation in operations {
            self.execute_one(&mut documents, operation)?;
        }
        debug!("Applied {} operations ({} documents stored)", operations.len(), documents.len());
        self.documents = documents;
        Ok(())
    }
}
