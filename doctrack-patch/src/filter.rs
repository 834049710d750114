//! Write predicates.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single `field == value` predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEquals {
    pub field: String,
    pub value: Value,
}

/// A conjunction of equality predicates.
///
/// Built from the identifier and, for optimistic concurrency, the version
/// and concurrency-token values captured when the entity was tracked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter {
    clauses: Vec<FieldEquals>,
}

impl Filter {
    /// A filter matching on a single field.
    #[must_use]
    pub fn by_field(field: &str, value: Value) -> Self {
        Self::default().and_eq(field, value)
    }

    /// Adds another equality clause.
    #[must_use]
    pub fn and_eq(mut self, field: &str, value: Value) -> Self {
        self.clauses.push(FieldEquals {
            field: field.into(),
            value,
        });
        self
    }

    /// Returns the clauses in the order they were added.
    pub fn clauses(&self) -> &[FieldEquals] {
        &self.clauses
    }

    /// Returns the value required for `field`, if the filter constrains it.
    pub fn value_of(&self, field: &str) -> Option<&Value> {
        self.clauses
            .iter()
            .find(|c| c.field == field)
            .map(|c| &c.value)
    }

    /// Returns true if every clause holds for the document.
    pub fn matches(&self, document: &Value) -> bool {
        self.clauses
            .iter()
            .all(|c| document.get(&c.field) == Some(&c.value))
    }
}
