//! Rendering to document-database command documents.
//!
//! Patches become update documents built from `$set`, `$unset`, `$push`
//! (with `$each`), `$pullAll` and `$currentDate`. Filters become plain
//! equality query documents. `Replace` renders as `$set` of the whole list.
//!
//! `RemoveAll` lists one value per occurrence to remove, but `$pullAll`
//! removes every stored occurrence of each listed value. For a list holding
//! duplicates the rendered update can remove more than the patch asks for:
//! `["A", "B", "B"]` patched down to `["A", "B"]` renders as
//! `{"$pullAll": {"Tags": ["B"]}}` and leaves `["A"]` in the store.
//! [`crate::apply_patch`] and [`crate::MemoryStore`] remove exactly one
//! occurrence per listed value.

use crate::filter::Filter;
use crate::operation::WriteOperation;
use crate::patch::{Patch, PatchOp};
use serde_json::{json, Map, Value};

/// Renders a patch as an update document.
///
/// Returns an empty object for the empty patch.
pub fn update_document(patch: &Patch) -> Value {
    let mut set = Map::new();
    let mut unset = Map::new();
    let mut push = Map::new();
    let mut pull_all = Map::new();
    let mut current_date = Map::new();

    for op in patch.ops() {
        let key = op.path().to_string();
        match op {
            PatchOp::Set { value, .. } => {
                set.insert(key, value.clone());
            }
            PatchOp::Replace { values, .. } => {
                set.insert(key, Value::Array(values.clone()));
            }
            PatchOp::Unset { .. } => {
                unset.insert(key, json!(""));
            }
            PatchOp::AppendEach { values, .. } => {
                push.insert(key, json!({ "$each": values }));
            }
            PatchOp::RemoveAll { values, .. } => {
                pull_all.insert(key, Value::Array(values.clone()));
            }
            PatchOp::SetCurrentTimestamp { .. } => {
                current_date.insert(key, Value::Bool(true));
            }
        }
    }

    let mut update = Map::new();
    for (operator, fields) in [
        ("$set", set),
        ("$unset", unset),
        ("$push", push),
        ("$pullAll", pull_all),
        ("$currentDate", current_date),
    ] {
        if !fields.is_empty() {
            update.insert(operator.to_string(), Value::Object(fields));
        }
    }
    Value::Object(update)
}

/// Renders a filter as a query document.
pub fn filter_document(filter: &Filter) -> Value {
    Value::Object(
        filter
            .clauses()
            .iter()
            .map(|c| (c.field.clone(), c.value.clone()))
            .collect(),
    )
}

/// Renders one write operation as a bulk-write model document
/// (`insertOne`, `deleteOne`, `updateOne`).
pub fn write_model(operation: &WriteOperation) -> Value {
    match operation {
        WriteOperation::Insert { document } => json!({ "insertOne": { "document": document } }),
        WriteOperation::Delete { filter } => {
            json!({ "deleteOne": { "filter": filter_document(filter) } })
        }
        WriteOperation::Update { filter, patch } => json!({
            "updateOne": {
                "filter": filter_document(filter),
                "update": update_document(patch),
            }
        }),
    }
}
