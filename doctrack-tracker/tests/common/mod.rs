//! Shared fixtures for tracker tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use doctrack_model::{
    DeclaredType, Document, EntityModel, ModelConfig, PropertyClassification as P,
};
use doctrack_patch::{Patch, PatchOp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

// ── Versioned aggregate ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parent {
    pub id: Uuid,
    pub name: String,
    pub version: DateTime<Utc>,
    pub etag: String,
    pub revision: i64,
    pub address: Option<Address>,
    pub tags: Option<Vec<String>>,
    pub children: Vec<Child>,
    pub notes: String,
}

impl Document for Parent {
    const ENTITY_TYPE: &'static str = "parent";
    type Id = Uuid;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Address {
    pub street: String,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Child {
    pub id: u32,
    pub name: String,
    pub child: Option<GrandChild>,
    pub toys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GrandChild {
    pub name: String,
    pub age: u32,
}

// ── Plain root ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memo {
    pub id: u64,
    pub title: String,
    pub body: Option<String>,
    pub tags: Vec<String>,
}

impl Document for Memo {
    const ENTITY_TYPE: &'static str = "memo";
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }
}

// ── Unversioned aggregate with an object list ─────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Basket {
    pub id: u64,
    pub items: Vec<Item>,
}

impl Document for Basket {
    const ENTITY_TYPE: &'static str = "basket";
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub name: String,
    pub labels: Vec<String>,
}

pub fn item(id: u32, name: &str) -> Item {
    Item {
        id,
        name: name.into(),
        labels: Vec::new(),
    }
}

// ── Models ───────────────────────────────────────────────────────

pub fn models() -> ModelConfig {
    ModelConfig::builder()
        .root(EntityModel::new(
            "parent",
            vec![
                P::identifier("Id", DeclaredType::Uuid),
                P::scalar("Name", DeclaredType::String),
                P::version("Version"),
                P::concurrency_token("Etag", DeclaredType::String),
                P::concurrency_token("Revision", DeclaredType::Integer),
                P::nested("Address", "address"),
                P::values("Tags", DeclaredType::String),
                P::objects("Children", "child"),
                P::ignored("Notes"),
            ],
        ))
        .entity(EntityModel::new(
            "address",
            vec![
                P::scalar("Street", DeclaredType::String),
                P::scalar("City", DeclaredType::String),
            ],
        ))
        .entity(EntityModel::new(
            "child",
            vec![
                P::identifier("Id", DeclaredType::Integer),
                P::scalar("Name", DeclaredType::String),
                P::nested("Child", "grandchild"),
                P::values("Toys", DeclaredType::String),
            ],
        ))
        .entity(EntityModel::new(
            "grandchild",
            vec![
                P::scalar("Name", DeclaredType::String),
                P::scalar("Age", DeclaredType::Integer),
            ],
        ))
        .root(EntityModel::new(
            "memo",
            vec![
                P::identifier("id", DeclaredType::Integer),
                P::scalar("title", DeclaredType::String),
                P::scalar("body", DeclaredType::String),
                P::values("tags", DeclaredType::String),
            ],
        ))
        .root(EntityModel::new(
            "basket",
            vec![
                P::identifier("id", DeclaredType::Integer),
                P::objects("items", "item"),
            ],
        ))
        .entity(EntityModel::new(
            "item",
            vec![
                P::identifier("id", DeclaredType::Integer),
                P::scalar("name", DeclaredType::String),
                P::values("labels", DeclaredType::String),
            ],
        ))
        .build()
        .expect("fixture models are valid")
}

pub fn shared_models() -> Arc<ModelConfig> {
    Arc::new(models())
}

// ── Instances ────────────────────────────────────────────────────

pub fn version_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn parent() -> Parent {
    Parent {
        id: Uuid::new_v4(),
        name: "root".into(),
        version: version_time(),
        etag: "e1".into(),
        revision: 1,
        address: Some(Address {
            street: "1 Main St".into(),
            city: "Springfield".into(),
        }),
        tags: Some(vec!["A".into(), "B".into()]),
        children: vec![
            Child {
                id: 1,
                name: "first".into(),
                child: Some(GrandChild {
                    name: "g1".into(),
                    age: 3,
                }),
                toys: vec![],
            },
            Child {
                id: 2,
                name: "second".into(),
                child: None,
                toys: vec!["ball".into()],
            },
        ],
        notes: String::new(),
    }
}

pub fn memo(id: u64) -> Memo {
    Memo {
        id,
        title: format!("memo {id}"),
        body: None,
        tags: vec!["A".into(), "B".into()],
    }
}

// ── Helpers ──────────────────────────────────────────────────────

pub fn to_doc<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap()
}

pub fn ops(patch: &Patch) -> Vec<PatchOp> {
    patch.ops().cloned().collect()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
