use doctrack_patch::{render, FieldPath, Filter, Patch, PatchOp, Segment, WriteOperation};
use pretty_assertions::assert_eq;
use serde_json::json;

// ── Field paths ──────────────────────────────────────────────────

#[test]
fn path_builds_and_renders_dotted() {
    let path = FieldPath::root().field("Children").index(0).field("Child").field("Name");
    assert_eq!(path.to_string(), "Children.0.Child.Name");
    assert_eq!(
        path.segments(),
        &[
            Segment::Field("Children".into()),
            Segment::Index(0),
            Segment::Field("Child".into()),
            Segment::Field("Name".into()),
        ]
    );
}

#[test]
fn path_parse_treats_numbers_as_indexes() {
    assert_eq!(FieldPath::parse("Lines.12.Sku"), FieldPath::root().field("Lines").index(12).field("Sku"));
    assert_eq!(FieldPath::from(""), FieldPath::root());
    assert!(FieldPath::root().is_root());
    assert!(!FieldPath::parse("A").is_root());
}

#[test]
fn path_extension_leaves_parent_untouched() {
    let parent = FieldPath::parse("Address");
    let child = parent.field("City");
    assert_eq!(parent.to_string(), "Address");
    assert_eq!(child.to_string(), "Address.City");
}

// ── Patch tree ───────────────────────────────────────────────────

#[test]
fn set_null_becomes_unset() {
    assert_eq!(
        Patch::set("Name".into(), json!(null)),
        Patch::Op(PatchOp::Unset { path: "Name".into() })
    );
}

#[test]
fn empty_patch_writes_nothing() {
    assert!(Patch::empty().is_empty());
    assert!(Patch::default().is_empty());
    assert_eq!(Patch::empty().len(), 0);
    assert!(Patch::Combine(vec![Patch::empty(), Patch::empty()]).is_empty());
}

#[test]
fn combine_drops_empty_parts() {
    let patch = Patch::combine([
        Patch::empty(),
        Patch::set("A".into(), json!(1)),
        Patch::combine(Vec::new()),
    ]);
    assert_eq!(patch, Patch::set("A".into(), json!(1)));
}

#[test]
fn combine_keeps_depth_first_order() {
    let inner = Patch::combine([
        Patch::set("B.X".into(), json!(2)),
        Patch::unset("B.Y".into()),
    ]);
    let patch = Patch::combine([
        Patch::set("A".into(), json!(1)),
        inner,
        Patch::set_current_timestamp("Version".into()),
    ]);

    let paths: Vec<String> = patch.ops().map(|op| op.path().to_string()).collect();
    assert_eq!(paths, vec!["A", "B.X", "B.Y", "Version"]);
    assert_eq!(patch.len(), 4);
}

#[test]
fn patch_serializes_tagged() {
    let patch = Patch::append_each("Tags".into(), vec![json!("C")]);
    assert_eq!(
        serde_json::to_value(&patch).unwrap(),
        json!({ "op": { "op": "append_each", "path": ["Tags"], "values": ["C"] } })
    );
}

// ── Rendering ────────────────────────────────────────────────────

#[test]
fn renders_every_operator() {
    let patch = Patch::combine([
        Patch::set("Name".into(), json!("n")),
        Patch::unset("Address".into()),
        Patch::append_each("Tags".into(), vec![json!("C"), json!("D")]),
        Patch::remove_all("Labels".into(), vec![json!("x")]),
        Patch::replace("Lines".into(), vec![json!({ "Id": 1 })]),
        Patch::set_current_timestamp("Version".into()),
    ]);

    assert_eq!(
        render::update_document(&patch),
        json!({
            "$set": { "Name": "n", "Lines": [{ "Id": 1 }] },
            "$unset": { "Address": "" },
            "$push": { "Tags": { "$each": ["C", "D"] } },
            "$pullAll": { "Labels": ["x"] },
            "$currentDate": { "Version": true },
        })
    );
}

#[test]
fn remove_all_renders_values_once_per_occurrence() {
    let patch = Patch::remove_all("Tags".into(), vec![json!("B")]);
    assert_eq!(
        render::update_document(&patch),
        json!({ "$pullAll": { "Tags": ["B"] } })
    );

    let mut stored = json!({ "Tags": ["A", "B", "B"] });
    doctrack_patch::apply_patch(&mut stored, &patch, chrono::Utc::now()).unwrap();
    assert_eq!(stored["Tags"], json!(["A", "B"]));
}

#[test]
fn renders_empty_patch_as_empty_document() {
    assert_eq!(render::update_document(&Patch::empty()), json!({}));
}

#[test]
fn renders_indexed_paths() {
    let patch = Patch::set(FieldPath::parse("Children.1.Name"), json!("b"));
    assert_eq!(
        render::update_document(&patch),
        json!({ "$set": { "Children.1.Name": "b" } })
    );
}

#[test]
fn renders_write_models() {
    let filter = Filter::by_field("Id", json!(7)).and_eq("Etag", json!("e1"));

    assert_eq!(
        render::write_model(&WriteOperation::Delete {
            filter: filter.clone(),
        }),
        json!({ "deleteOne": { "filter": { "Id": 7, "Etag": "e1" } } })
    );
    assert_eq!(
        render::write_model(&WriteOperation::Update {
            filter,
            patch: Patch::set("Name".into(), json!("n")),
        }),
        json!({
            "updateOne": {
                "filter": { "Id": 7, "Etag": "e1" },
                "update": { "$set": { "Name": "n" } },
            }
        })
    );
    assert_eq!(
        render::write_model(&WriteOperation::Insert {
            document: json!({ "Id": 8 }),
        }),
        json!({ "insertOne": { "document": { "Id": 8 } } })
    );
}

// ── Filters ──────────────────────────────────────────────────────

#[test]
fn filter_matches_all_clauses() {
    let filter = Filter::by_field("Id", json!(1)).and_eq("Revision", json!(3));

    assert!(filter.matches(&json!({ "Id": 1, "Revision": 3, "Name": "x" })));
    assert!(!filter.matches(&json!({ "Id": 1, "Revision": 4 })));
    assert!(!filter.matches(&json!({ "Id": 1 })));
    assert_eq!(filter.value_of("Revision"), Some(&json!(3)));
    assert_eq!(filter.value_of("Name"), None);
}

#[test]
fn operation_kind_and_filter() {
    let insert = WriteOperation::Insert { document: json!({}) };
    let delete = WriteOperation::Delete {
        filter: Filter::by_field("Id", json!(1)),
    };
    assert_eq!(insert.kind(), "insert");
    assert!(insert.filter().is_none());
    assert_eq!(delete.kind(), "delete");
    assert_eq!(delete.filter().unwrap().clauses().len(), 1);
}
