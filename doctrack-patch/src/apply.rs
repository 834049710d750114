//! Applies patches to JSON documents.

use crate::patch::{Patch, PatchOp};
use crate::path::{FieldPath, Segment};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while applying a patch to a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    /// An intermediate path segment does not exist.
    #[error("path not found: {0}")]
    PathNotFound(String),

    /// A list operation targets something that is not a list.
    #[error("not a list: {0}")]
    NotAList(String),

    /// A field segment crosses something that is not an object.
    #[error("not an object: {0}")]
    NotAnObject(String),

    /// Patches cannot replace the document root.
    #[error("patch targets the document root")]
    RootTarget,
}

/// Applies every operation of `patch` to `document`, in order.
///
/// `now` is written by [`PatchOp::SetCurrentTimestamp`]. `RemoveAll` removes
/// one stored occurrence per listed value.
pub fn apply_patch(document: &mut Value, patch: &Patch, now: DateTime<Utc>) -> Result<(), ApplyError> {
    let timestamp = Value::String(now.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true));
    for op in patch.ops() {
        apply_op(document, op, &timestamp)?;
    }
    Ok(())
}

fn apply_op(document: &mut Value, op: &PatchOp, timestamp: &Value) -> Result<(), ApplyError> {
    let path = op.path();
    match op {
        PatchOp::Set { value, .. } => write_slot(document, path, value.clone()),
        PatchOp::Replace { values, .. } => write_slot(document, path, Value::Array(values.clone())),
        PatchOp::SetCurrentTimestamp { .. } => write_slot(document, path, timestamp.clone()),
        PatchOp::Unset { .. } => {
            let (parent, last) = parent_mut(document, path, false)?;
            match (parent, last) {
                (Value::Object(map), Segment::Field(name)) => {
                    map.remove(name);
                }
                (Value::Array(items), Segment::Index(index)) => {
                    if let Some(slot) = items.get_mut(*index) {
                        *slot = Value::Null;
                    }
                }
                _ => return Err(ApplyError::NotAnObject(path.to_string())),
            }
            Ok(())
        }
        PatchOp::AppendEach { values, .. } => {
            let list = list_mut(document, path)?;
            list.extend(values.iter().cloned());
            Ok(())
        }
        PatchOp::RemoveAll { values, .. } => {
            let list = list_mut(document, path)?;
            for value in values {
                if let Some(position) = list.iter().position(|item| item == value) {
                    list.remove(position);
                }
            }
            Ok(())
        }
    }
}

fn write_slot(document: &mut Value, path: &FieldPath, value: Value) -> Result<(), ApplyError> {
    let (parent, last) = parent_mut(document, path, true)?;
    match (parent, last) {
        (Value::Object(map), Segment::Field(name)) => {
            map.insert(name.clone(), value);
            Ok(())
        }
        (Value::Array(items), Segment::Index(index)) => match items.get_mut(*index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(ApplyError::PathNotFound(path.to_string())),
        },
        _ => Err(ApplyError::NotAnObject(path.to_string())),
    }
}

fn list_mut<'a>(document: &'a mut Value, path: &FieldPath) -> Result<&'a mut Vec<Value>, ApplyError> {
    let (parent, last) = parent_mut(document, path, true)?;
    let slot = match (parent, last) {
        (Value::Object(map), Segment::Field(name)) => map
            .entry(name.clone())
            .or_insert_with(|| Value::Array(Vec::new())),
        (Value::Array(items), Segment::Index(index)) => items
            .get_mut(*index)
            .ok_or_else(|| ApplyError::PathNotFound(path.to_string()))?,
        _ => return Err(ApplyError::NotAnObject(path.to_string())),
    };
    if slot.is_null() {
        *slot = Value::Array(Vec::new());
    }
    slot.as_array_mut()
        .ok_or_else(|| ApplyError::NotAList(path.to_string()))
}

/// Walks to the container holding the last segment of `path`.
/// With `create`, missing intermediate fields become empty objects.
fn parent_mut<'a, 'p>(
    document: &'a mut Value,
    path: &'p FieldPath,
    create: bool,
) -> Result<(&'a mut Value, &'p Segment), ApplyError> {
    let Some((last, parents)) = path.segments().split_last() else {
        return Err(ApplyError::RootTarget);
    };

    let mut current = document;
    for segment in parents {
        current = match segment {
            Segment::Field(name) => {
                let map = current
                    .as_object_mut()
                    .ok_or_else(|| ApplyError::NotAnObject(path.to_string()))?;
                if create {
                    let slot = map
                        .entry(name.clone())
                        .or_insert_with(|| Value::Object(Map::new()));
                    if slot.is_null() {
                        *slot = Value::Object(Map::new());
                    }
                    slot
                } else {
                    map.get_mut(name)
                        .ok_or_else(|| ApplyError::PathNotFound(path.to_string()))?
                }
            }
            Segment::Index(index) => current
                .as_array_mut()
                .ok_or_else(|| ApplyError::NotAList(path.to_string()))?
                .get_mut(*index)
                .ok_or_else(|| ApplyError::PathNotFound(path.to_string()))?,
        };
    }
    Ok((current, last))
}
