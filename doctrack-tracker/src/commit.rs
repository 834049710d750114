//! Prepared commits.

use doctrack_patch::WriteOperation;
use serde::Serialize;
use serde_json::Value;

/// What the session does once the sink accepted an operation.
#[derive(Debug, Clone)]
pub(crate) enum Settlement<Id> {
    /// Promote to `Default`, tracking the inserted document.
    Inserted { id: Id, document: Value },
    /// Rebase the tracker onto the committed document.
    Updated { id: Id, document: Value },
    /// Stop tracking.
    Deleted { id: Id },
}

/// Operation counts of a commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl CommitSummary {
    pub fn total(&self) -> usize {
        self.inserted + self.updated + self.deleted
    }
}

/// The write operations of one commit, not yet acknowledged.
///
/// Hand [`CommitBatch::operations`] to the store, then pass the batch back
/// to `Session::acknowledge` once the write succeeded. Until then the
/// session keeps every change pending, and committing again yields the same
/// operations.
#[derive(Debug, Clone)]
pub struct CommitBatch<Id> {
    operations: Vec<WriteOperation>,
    settlements: Vec<Settlement<Id>>,
}

impl<Id> Default for CommitBatch<Id> {
    fn default() -> Self {
        Self {
            operations: Vec::new(),
            settlements: Vec::new(),
        }
    }
}

impl<Id> CommitBatch<Id> {
    pub(crate) fn push(&mut self, operation: WriteOperation, settlement: Settlement<Id>) {
        self.operations.push(operation);
        self.settlements.push(settlement);
    }

    pub(crate) fn append(&mut self, other: Self) {
        self.operations.extend(other.operations);
        self.settlements.extend(other.settlements);
    }

    pub(crate) fn into_settlements(self) -> Vec<Settlement<Id>> {
        self.settlements
    }

    /// Splits into batches of at most `size` operations, preserving order.
    pub(crate) fn into_chunks(self, size: usize) -> Vec<Self> {
        let size = size.max(1);
        let mut chunks = Vec::new();
        let mut current = Self::default();
        for (operation, settlement) in self.operations.into_iter().zip(self.settlements) {
            current.push(operation, settlement);
            if current.len() == size {
                chunks.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        chunks
    }

    /// The operations to execute, in order.
    pub fn operations(&self) -> &[WriteOperation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Counts the operations by kind.
    pub fn summary(&self) -> CommitSummary {
        let mut summary = CommitSummary::default();
        for operation in &self.operations {
            match operation {
                WriteOperation::Insert { .. } => summary.inserted += 1,
                WriteOperation::Update { .. } => summary.updated += 1,
                WriteOperation::Delete { .. } => summary.deleted += 1,
            }
        }
        summary
    }
}
