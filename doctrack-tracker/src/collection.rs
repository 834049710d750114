//! Collection differencing.
//!
//! Compares the list captured at tracking time with the current list as
//! multisets under value equality, then picks the cheapest patch shape that
//! still describes the change unambiguously:
//!
//! | added | removed | elements modified | order changed | patch                       |
//! |-------|---------|-------------------|---------------|-----------------------------|
//! | none  | none    | no                | no            | nothing                     |
//! | some  | none    | no                | no            | append each added value     |
//! | none  | some    | no                | no            | remove all removed values   |
//! | some  | some    | any               | any           | replace the whole list      |
//! | none  | none    | yes               | no            | per-element indexed patches |
//! | any change      | yes               | any           | replace the whole list      |
//! | any   | any     | any               | yes           | replace the whole list      |
//!
//! Only tracked-object collections have an order. Element-level patches
//! address elements by their current index, and the tracker is rebased onto
//! the in-memory list after a commit, so the stored list must end up in the
//! in-memory order. Appends land at the tail of the stored list and removals
//! keep the relative order of what is left. Anything else (retained elements
//! swapping places, or an element added in front of a retained one) changes
//! the order and replaces the list whole.

use crate::error::{TrackError, TrackResult};
use crate::node::NodeTracker;
use doctrack_model::{EntityModel, ModelConfig};
use doctrack_patch::{FieldPath, Patch};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};

/// The patch shape chosen for a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionShape {
    Unchanged,
    AppendOnly,
    RemoveOnly,
    ReplaceWhole,
    ElementPatches,
}

impl CollectionShape {
    fn decide(added: usize, removed: usize, elements_modified: bool, order_changed: bool) -> Self {
        if order_changed {
            return Self::ReplaceWhole;
        }
        match (added > 0, removed > 0, elements_modified) {
            (false, false, false) => Self::Unchanged,
            (true, false, false) => Self::AppendOnly,
            (false, true, false) => Self::RemoveOnly,
            (false, false, true) => Self::ElementPatches,
            _ => Self::ReplaceWhole,
        }
    }
}

/// Multiset difference `left - right` under value equality, in `left` order.
pub fn multiset_difference(left: &[Value], right: &[Value]) -> Vec<Value> {
    let mut remaining: HashMap<String, usize> = HashMap::new();
    for value in right {
        *remaining.entry(value.to_string()).or_default() += 1;
    }
    left.iter()
        .filter(|value| match remaining.get_mut(&value.to_string()) {
            Some(count) if *count > 0 => {
                *count -= 1;
                false
            }
            _ => true,
        })
        .cloned()
        .collect()
}

/// Diff state of a list of plain values.
#[derive(Debug, Clone)]
pub struct ValueCollection {
    original: Vec<Value>,
    current: Vec<Value>,
    added: Vec<Value>,
    removed: Vec<Value>,
}

impl ValueCollection {
    /// Captures the original list.
    pub fn new(original: Vec<Value>) -> Self {
        Self {
            current: original.clone(),
            original,
            added: Vec::new(),
            removed: Vec::new(),
        }
    }

    /// Recomputes the added and removed values against `current`.
    pub fn diff(&mut self, current: &[Value]) {
        self.current = current.to_vec();
        self.added = multiset_difference(&self.current, &self.original);
        self.removed = multiset_difference(&self.original, &self.current);
    }

    pub fn original(&self) -> &[Value] {
        &self.original
    }

    pub fn added(&self) -> &[Value] {
        &self.added
    }

    pub fn removed(&self) -> &[Value] {
        &self.removed
    }

    pub fn is_modified(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }

    pub fn shape(&self) -> CollectionShape {
        CollectionShape::decide(self.added.len(), self.removed.len(), false, false)
    }

    /// Builds the patch for the list stored at `path`.
    pub fn build_patch(&self, path: &FieldPath) -> Patch {
        match self.shape() {
            CollectionShape::Unchanged | CollectionShape::ElementPatches => Patch::empty(),
            CollectionShape::AppendOnly => Patch::append_each(path.clone(), self.added.clone()),
            CollectionShape::RemoveOnly => Patch::remove_all(path.clone(), self.removed.clone()),
            CollectionShape::ReplaceWhole => Patch::replace(path.clone(), self.current.clone()),
        }
    }
}

/// Diff state of a list of tracked objects.
///
/// Elements are correlated by the element model's identifier when it has
/// one, and by whole-value equality otherwise. Each original object element
/// gets its own child tracker.
#[derive(Debug, Clone)]
pub struct ObjectCollection {
    entity_type: String,
    key_property: Option<String>,
    original: Vec<Value>,
    children: Vec<Option<NodeTracker>>,
    current: Vec<Value>,
    added: Vec<Value>,
    removed: Vec<Value>,
    /// `(current index, original index)` of every element present in both.
    retained: Vec<(usize, usize)>,
}

impl ObjectCollection {
    /// Captures the original list and builds one child tracker per object element.
    pub fn new(config: &ModelConfig, model: &EntityModel, original: Vec<Value>) -> TrackResult<Self> {
        let children = original
            .iter()
            .map(|element| {
                if element.is_object() {
                    NodeTracker::new(config, model, element).map(Some)
                } else {
                    Ok(None)
                }
            })
            .collect::<TrackResult<Vec<_>>>()?;

        let retained = (0..original.len()).map(|i| (i, i)).collect();
        Ok(Self {
            entity_type: model.entity_type.clone(),
            key_property: model.identifier().map(|p| p.name.clone()),
            current: original.clone(),
            original,
            children,
            added: Vec::new(),
            removed: Vec::new(),
            retained,
        })
    }

    fn element_key(&self, element: &Value) -> TrackResult<String> {
        match (&self.key_property, element.as_object()) {
            (Some(key), Some(object)) => object
                .get(key)
                .map(|id| format!("#{id}"))
                .ok_or_else(|| TrackError::PropertyNotFound {
                    entity_type: self.entity_type.clone(),
                    property: key.clone(),
                }),
            _ => Ok(format!("={element}")),
        }
    }

    /// Correlates `current` with the original elements and re-diffs every
    /// retained element.
    pub fn diff(&mut self, current: &[Value]) -> TrackResult<()> {
        let mut pool: HashMap<String, VecDeque<usize>> = HashMap::new();
        for (index, element) in self.original.iter().enumerate() {
            pool.entry(self.element_key(element)?)
                .or_default()
                .push_back(index);
        }

        let mut added = Vec::new();
        let mut retained = Vec::new();
        for (index, element) in current.iter().enumerate() {
            let key = self.element_key(element)?;
            match pool.get_mut(&key).and_then(VecDeque::pop_front) {
                Some(original_index) => {
                    if let Some(child) = &mut self.children[original_index] {
                        child.diff(element)?;
                    }
                    retained.push((index, original_index));
                }
                None => added.push(element.clone()),
            }
        }

        let mut unmatched: Vec<usize> = pool.into_values().flatten().collect();
        unmatched.sort_unstable();

        self.removed = unmatched.into_iter().map(|i| self.original[i].clone()).collect();
        self.added = added;
        self.retained = retained;
        self.current = current.to_vec();
        Ok(())
    }

    pub fn original(&self) -> &[Value] {
        &self.original
    }

    pub fn added(&self) -> &[Value] {
        &self.added
    }

    pub fn removed(&self) -> &[Value] {
        &self.removed
    }

    fn modified_children(&self) -> impl Iterator<Item = (usize, &NodeTracker)> {
        self.retained.iter().filter_map(|&(current_index, original_index)| {
            self.children[original_index]
                .as_ref()
                .filter(|child| child.is_modified())
                .map(|child| (current_index, child))
        })
    }

    /// Returns true if any retained element was modified in place.
    pub fn elements_modified(&self) -> bool {
        self.modified_children().next().is_some()
    }

    /// Returns true if retained elements changed their relative order.
    ///
    /// Removals shift positions without reordering, so this compares the
    /// original indices of retained elements in current order.
    pub fn is_reordered(&self) -> bool {
        self.retained
            .windows(2)
            .any(|pair| pair[0].1 >= pair[1].1)
    }

    /// Returns true if an added element sits in front of a retained one.
    /// Appending it would put it at the end of the stored list instead.
    pub fn has_interleaved_additions(&self) -> bool {
        self.retained
            .iter()
            .enumerate()
            .any(|(position, &(current, _))| current != position)
    }

    /// Returns true if the stored list would not end up in the in-memory
    /// order without a whole-list write.
    pub fn is_order_changed(&self) -> bool {
        self.is_reordered() || self.has_interleaved_additions()
    }

    pub fn is_modified(&self) -> bool {
        !self.added.is_empty()
            || !self.removed.is_empty()
            || self.elements_modified()
            || self.is_order_changed()
    }

    pub fn shape(&self) -> CollectionShape {
        CollectionShape::decide(
            self.added.len(),
            self.removed.len(),
            self.elements_modified(),
            self.is_order_changed(),
        )
    }

    /// Builds the patch for the list stored at `path`.
    pub fn build_patch(&self, path: &FieldPath) -> Patch {
        match self.shape() {
            CollectionShape::Unchanged => Patch::empty(),
            CollectionShape::AppendOnly => Patch::append_each(path.clone(), self.added.clone()),
            CollectionShape::RemoveOnly => Patch::remove_all(path.clone(), self.removed.clone()),
            CollectionShape::ReplaceWhole => Patch::replace(path.clone(), self.current.clone()),
            CollectionShape::ElementPatches => Patch::combine(
                self.modified_children()
                    .map(|(index, child)| child.build_patch(&path.index(index))),
            ),
        }
    }
}
