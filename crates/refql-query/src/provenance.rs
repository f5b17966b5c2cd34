//! Provenance stores: the raw text fragments and reference markers a parse encountered.
//!
//! All stores are insertion-ordered and deduplicated, and never record empty fragments.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

/// Raw fragments grouped by canonical field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldTextStore {
    /// Field to fragments.
    texts: IndexMap<String, IndexSet<String>>,
}

impl FieldTextStore {
    /// Records a fragment under a field. Returns true if it was not already present.
    pub fn add(&mut self, field: &str, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        self.texts
            .entry(field.to_string())
            .or_default()
            .insert(text.to_string())
    }

    /// Returns the fragments recorded for a field.
    pub fn get(&self, field: &str) -> Option<&IndexSet<String>> {
        self.texts.get(field)
    }

    /// Iterates over fields in the order they were first recorded.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.texts.keys().map(String::as_str)
    }

    /// Returns the union of every field's fragments, in first-seen order.
    pub fn query_texts(&self) -> IndexSet<&str> {
        self.texts
            .values()
            .flat_map(|texts| texts.iter().map(String::as_str))
            .collect()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// Raw fragments of a whole parse, regardless of field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryTextStore {
    /// Fragments.
    texts: IndexSet<String>,
}

impl QueryTextStore {
    /// Records a fragment. Returns true if it was not already present.
    pub fn add(&mut self, text: &str) -> bool {
        !text.is_empty() && self.texts.insert(text.to_string())
    }

    /// Returns true if the fragment was recorded.
    pub fn contains(&self, text: &str) -> bool {
        self.texts.contains(text)
    }

    /// Iterates over fragments in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.texts.iter().map(String::as_str)
    }

    /// Number of distinct fragments.
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// Reference markers (`#1`, `#2`, ...) in the order they were encountered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReferenceStore {
    /// Markers.
    markers: IndexSet<String>,
}

impl ReferenceStore {
    /// Records a marker. Returns true if it was not already present.
    pub fn add(&mut self, marker: &str) -> bool {
        !marker.is_empty() && self.markers.insert(marker.to_string())
    }

    /// Returns true if the marker was recorded.
    pub fn contains(&self, marker: &str) -> bool {
        self.markers.contains(marker)
    }

    /// Iterates over markers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.markers.iter().map(String::as_str)
    }

    /// Number of distinct markers.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// The three stores filled by one parse, shared with every nested reference parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Provenance {
    /// Fragments per canonical field.
    pub fields: FieldTextStore,
    /// Fragments of the whole parse.
    pub texts: QueryTextStore,
    /// Reference markers.
    pub references: ReferenceStore,
}

impl Provenance {
    /// Creates empty stores.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a literal fragment under its canonical field and in the global store.
    pub fn record_text(&mut self, field: &str, text: &str) {
        self.fields.add(field, text);
        self.texts.add(text);
    }
}
