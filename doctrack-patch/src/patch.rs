//! The patch tree produced by a diff.
//!
//! A patch is either a single primitive operation or a combination of
//! patches. Diffing a nested object produces a subtree; the parent combines
//! the subtrees of all its modified properties.

use crate::path::FieldPath;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A primitive field-level write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PatchOp {
    /// Set a field to a value.
    Set { path: FieldPath, value: Value },
    /// Remove a field. Produced for set-to-null.
    Unset { path: FieldPath },
    /// Append each value to the list at `path`.
    AppendEach { path: FieldPath, values: Vec<Value> },
    /// Remove the listed values from the list at `path`.
    RemoveAll { path: FieldPath, values: Vec<Value> },
    /// Overwrite the list at `path` with its full current contents.
    Replace { path: FieldPath, values: Vec<Value> },
    /// Set a field to the store's current time.
    SetCurrentTimestamp { path: FieldPath },
}

impl PatchOp {
    /// The path this operation writes.
    pub fn path(&self) -> &FieldPath {
        match self {
            Self::Set { path, .. }
            | Self::Unset { path }
            | Self::AppendEach { path, .. }
            | Self::RemoveAll { path, .. }
            | Self::Replace { path, .. }
            | Self::SetCurrentTimestamp { path } => path,
        }
    }
}

/// A composable tree of [`PatchOp`]s.
///
/// `Combine(vec![])` is the empty patch and writes nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Patch {
    Op(PatchOp),
    Combine(Vec<Patch>),
}

impl Default for Patch {
    fn default() -> Self {
        Self::empty()
    }
}

impl Patch {
    /// The patch that writes nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::Combine(Vec::new())
    }

    /// Sets a field. A null value becomes [`PatchOp::Unset`].
    #[must_use]
    pub fn set(path: FieldPath, value: Value) -> Self {
        if value.is_null() {
            Self::Op(PatchOp::Unset { path })
        } else {
            Self::Op(PatchOp::Set { path, value })
        }
    }

    #[must_use]
    pub fn unset(path: FieldPath) -> Self {
        Self::Op(PatchOp::Unset { path })
    }

    #[must_use]
    pub fn append_each(path: FieldPath, values: Vec<Value>) -> Self {
        Self::Op(PatchOp::AppendEach { path, values })
    }

    #[must_use]
    pub fn remove_all(path: FieldPath, values: Vec<Value>) -> Self {
        Self::Op(PatchOp::RemoveAll { path, values })
    }

    #[must_use]
    pub fn replace(path: FieldPath, values: Vec<Value>) -> Self {
        Self::Op(PatchOp::Replace { path, values })
    }

    #[must_use]
    pub fn set_current_timestamp(path: FieldPath) -> Self {
        Self::Op(PatchOp::SetCurrentTimestamp { path })
    }

    /// Combines patches into one, dropping empty ones.
    ///
    /// A single surviving patch is returned as is rather than wrapped.
    #[must_use]
    pub fn combine(patches: impl IntoIterator<Item = Patch>) -> Self {
        let mut parts: Vec<Patch> = patches.into_iter().filter(|p| !p.is_empty()).collect();
        if parts.len() == 1 {
            parts.pop().unwrap_or_default()
        } else {
            Self::Combine(parts)
        }
    }

    /// Returns true if the patch writes nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Op(_) => false,
            Self::Combine(parts) => parts.iter().all(Patch::is_empty),
        }
    }

    /// Iterates over the primitive operations, depth first.
    pub fn ops(&self) -> Box<dyn Iterator<Item = &PatchOp> + '_> {
        match self {
            Self::Op(op) => Box::new(std::iter::once(op)),
            Self::Combine(parts) => Box::new(parts.iter().flat_map(Patch::ops)),
        }
    }

    /// Returns the number of primitive operations.
    pub fn len(&self) -> usize {
        self.ops().count()
    }
}

impl From<PatchOp> for Patch {
    fn from(op: PatchOp) -> Self {
        Self::Op(op)
    }
}
