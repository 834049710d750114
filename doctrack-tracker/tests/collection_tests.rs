mod common;

use common::{models, ops};
use doctrack_patch::{FieldPath, PatchOp};
use doctrack_tracker::{CollectionShape, ObjectCollection, ValueCollection};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn strings(items: &[&str]) -> Vec<Value> {
    items.iter().map(|s| json!(s)).collect()
}

fn value_diff(original: &[&str], current: &[&str]) -> ValueCollection {
    let mut collection = ValueCollection::new(strings(original));
    collection.diff(&strings(current));
    collection
}

fn path() -> FieldPath {
    FieldPath::root().field("Tags")
}

// ── Value collections ────────────────────────────────────────────

#[test]
fn unchanged_values_produce_nothing() {
    let collection = value_diff(&["A", "B"], &["A", "B"]);
    assert!(!collection.is_modified());
    assert_eq!(collection.shape(), CollectionShape::Unchanged);
    assert!(collection.build_patch(&path()).is_empty());
}

#[test]
fn add_only_appends() {
    let collection = value_diff(&["A", "B"], &["A", "B", "C"]);
    assert_eq!(collection.added(), strings(&["C"]).as_slice());
    assert_eq!(
        ops(&collection.build_patch(&path())),
        vec![PatchOp::AppendEach {
            path: "Tags".into(),
            values: strings(&["C"]),
        }]
    );
}

#[test]
fn remove_only_removes_with_multiset_semantics() {
    let collection = value_diff(&["A", "B", "B"], &["A", "B"]);
    assert_eq!(collection.removed(), strings(&["B"]).as_slice());
    assert_eq!(
        ops(&collection.build_patch(&path())),
        vec![PatchOp::RemoveAll {
            path: "Tags".into(),
            values: strings(&["B"]),
        }]
    );
}

#[test]
fn mixed_add_and_remove_replaces() {
    let collection = value_diff(&["A", "B"], &["A", "C"]);
    assert_eq!(collection.shape(), CollectionShape::ReplaceWhole);
    assert_eq!(
        ops(&collection.build_patch(&path())),
        vec![PatchOp::Replace {
            path: "Tags".into(),
            values: strings(&["A", "C"]),
        }]
    );
}

#[test]
fn reordering_values_is_not_a_change() {
    let collection = value_diff(&["A", "B"], &["B", "A"]);
    assert!(!collection.is_modified());
}

#[test]
fn duplicate_append_is_detected() {
    let collection = value_diff(&["A"], &["A", "A"]);
    assert_eq!(collection.shape(), CollectionShape::AppendOnly);
    assert_eq!(collection.added(), strings(&["A"]).as_slice());
}

#[test]
fn values_compare_by_value_not_type_name() {
    let mut collection = ValueCollection::new(vec![json!(1), json!({ "k": "v" })]);
    collection.diff(&[json!({ "k": "v" }), json!(1)]);
    assert!(!collection.is_modified());

    collection.diff(&[json!({ "k": "w" }), json!(1)]);
    assert_eq!(collection.shape(), CollectionShape::ReplaceWhole);
}

#[test]
fn rediff_recomputes_from_original() {
    let mut collection = ValueCollection::new(strings(&["A"]));
    collection.diff(&strings(&["A", "B"]));
    assert!(collection.is_modified());
    collection.diff(&strings(&["A"]));
    assert!(!collection.is_modified());
    assert_eq!(collection.original(), strings(&["A"]).as_slice());
}

// ── Tracked-object collections ───────────────────────────────────

fn child(id: u32, name: &str) -> Value {
    json!({ "Id": id, "Name": name, "Child": null, "Toys": [] })
}

fn object_collection(original: Vec<Value>) -> ObjectCollection {
    let config = models();
    ObjectCollection::new(&config, config.get("child").unwrap(), original).unwrap()
}

fn children_path() -> FieldPath {
    FieldPath::root().field("Children")
}

#[test]
fn retained_element_edit_is_indexed() {
    let mut collection = object_collection(vec![child(1, "a"), child(2, "b")]);
    collection.diff(&[child(1, "a"), child(2, "renamed")]).unwrap();

    assert!(collection.elements_modified());
    assert_eq!(collection.shape(), CollectionShape::ElementPatches);
    assert_eq!(
        ops(&collection.build_patch(&children_path())),
        vec![PatchOp::Set {
            path: "Children.1.Name".into(),
            value: json!("renamed"),
        }]
    );
}

#[test]
fn appended_element_is_pushed_whole() {
    let mut collection = object_collection(vec![child(1, "a")]);
    collection.diff(&[child(1, "a"), child(2, "b")]).unwrap();

    assert_eq!(
        ops(&collection.build_patch(&children_path())),
        vec![PatchOp::AppendEach {
            path: "Children".into(),
            values: vec![child(2, "b")],
        }]
    );
}

#[test]
fn removed_element_is_pulled_by_original_value() {
    let mut collection = object_collection(vec![child(1, "a"), child(2, "b")]);
    collection.diff(&[child(2, "b")]).unwrap();

    assert_eq!(
        ops(&collection.build_patch(&children_path())),
        vec![PatchOp::RemoveAll {
            path: "Children".into(),
            values: vec![child(1, "a")],
        }]
    );
}

#[test]
fn edit_alongside_add_replaces() {
    let mut collection = object_collection(vec![child(1, "a")]);
    let current = vec![child(1, "edited"), child(2, "b")];
    collection.diff(&current).unwrap();

    assert_eq!(collection.shape(), CollectionShape::ReplaceWhole);
    assert_eq!(
        ops(&collection.build_patch(&children_path())),
        vec![PatchOp::Replace {
            path: "Children".into(),
            values: current,
        }]
    );
}

#[test]
fn edit_after_reorder_replaces() {
    let mut collection = object_collection(vec![child(1, "a"), child(2, "b")]);
    let current = vec![child(2, "b"), child(1, "edited")];
    collection.diff(&current).unwrap();

    assert!(collection.is_reordered());
    assert_eq!(collection.shape(), CollectionShape::ReplaceWhole);
    assert_eq!(
        ops(&collection.build_patch(&children_path())),
        vec![PatchOp::Replace {
            path: "Children".into(),
            values: current,
        }]
    );
}

#[test]
fn reorder_alone_replaces() {
    let mut collection = object_collection(vec![child(1, "a"), child(2, "b")]);
    let current = vec![child(2, "b"), child(1, "a")];
    collection.diff(&current).unwrap();

    assert!(collection.is_reordered());
    assert!(collection.is_modified());
    assert_eq!(
        ops(&collection.build_patch(&children_path())),
        vec![PatchOp::Replace {
            path: "Children".into(),
            values: current,
        }]
    );
}

#[test]
fn reorder_with_append_replaces() {
    let mut collection = object_collection(vec![child(1, "a"), child(2, "b")]);
    let current = vec![child(2, "b"), child(1, "a"), child(3, "c")];
    collection.diff(&current).unwrap();

    assert_eq!(collection.shape(), CollectionShape::ReplaceWhole);
    assert_eq!(
        ops(&collection.build_patch(&children_path())),
        vec![PatchOp::Replace {
            path: "Children".into(),
            values: current,
        }]
    );
}

#[test]
fn reorder_with_removal_replaces() {
    let mut collection = object_collection(vec![child(1, "a"), child(2, "b"), child(3, "c")]);
    collection.diff(&[child(3, "c"), child(1, "a")]).unwrap();

    assert!(collection.is_reordered());
    assert_eq!(collection.shape(), CollectionShape::ReplaceWhole);
}

#[test]
fn removal_shifting_positions_is_not_a_reorder() {
    let mut collection = object_collection(vec![child(1, "a"), child(2, "b"), child(3, "c")]);
    collection.diff(&[child(1, "a"), child(3, "c")]).unwrap();

    assert!(!collection.is_order_changed());
    assert_eq!(
        ops(&collection.build_patch(&children_path())),
        vec![PatchOp::RemoveAll {
            path: "Children".into(),
            values: vec![child(2, "b")],
        }]
    );
}

#[test]
fn removal_with_edit_replaces() {
    let mut collection = object_collection(vec![child(1, "a"), child(2, "b"), child(3, "c")]);
    collection.diff(&[child(1, "a"), child(3, "edited")]).unwrap();

    assert_eq!(collection.shape(), CollectionShape::ReplaceWhole);
}

#[test]
fn insertion_in_front_replaces() {
    let mut collection = object_collection(vec![child(1, "a"), child(2, "b")]);
    let current = vec![child(1, "a"), child(3, "c"), child(2, "b")];
    collection.diff(&current).unwrap();

    assert!(!collection.is_reordered());
    assert!(collection.has_interleaved_additions());
    assert_eq!(
        ops(&collection.build_patch(&children_path())),
        vec![PatchOp::Replace {
            path: "Children".into(),
            values: current,
        }]
    );
}

#[test]
fn elements_without_identifier_compare_whole() {
    let config = models();
    let original = vec![json!({ "Name": "g", "Age": 1 })];
    let mut collection =
        ObjectCollection::new(&config, config.get("grandchild").unwrap(), original).unwrap();

    collection.diff(&[json!({ "Name": "g", "Age": 2 })]).unwrap();

    assert_eq!(collection.added().len(), 1);
    assert_eq!(collection.removed().len(), 1);
    assert_eq!(collection.shape(), CollectionShape::ReplaceWhole);
}

#[test]
fn element_missing_identifier_is_an_error() {
    let mut collection = object_collection(vec![child(1, "a")]);
    let result = collection.diff(&[json!({ "Name": "anonymous", "Child": null, "Toys": [] })]);
    assert!(result.is_err());
}
