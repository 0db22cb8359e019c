//! Class index to sentiment label resolution

use crate::classifier::ClassIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Static mapping from class index to human-readable label.
///
/// The map may cover only part of what the model emits; see [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelMap(BTreeMap<ClassIndex, String>);

impl LabelMap {
    /// Create an empty label map
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Add a label, builder style
    pub fn with_label(mut self, class: ClassIndex, label: impl Into<String>) -> Self {
        self.insert(class, label);
        self
    }

    pub fn insert(&mut self, class: ClassIndex, label: impl Into<String>) {
        self.0.insert(class, label.into());
    }

    pub fn get(&self, class: ClassIndex) -> Option<&str> {
        self.0.get(&class).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve a class index; see [`resolve`]
    pub fn resolve(&self, class: ClassIndex) -> String {
        resolve(self, class)
    }
}

/// The binary sentiment map: `0 -> negative`, `1 -> positive`
impl Default for LabelMap {
    fn default() -> Self {
        Self::new()
            .with_label(0, "negative")
            .with_label(1, "positive")
    }
}

impl<S: Into<String>> FromIterator<(ClassIndex, S)> for LabelMap {
    fn from_iter<I: IntoIterator<Item = (ClassIndex, S)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(c, l)| (c, l.into())).collect())
    }
}

/// Map a class index to its label.
///
/// Unmapped indices never fail: they come back as the decimal string of the
/// index, so a model that grew new classes keeps serving with raw labels
/// until the map is extended.
pub fn resolve(label_map: &LabelMap, class_index: ClassIndex) -> String {
    match label_map.get(class_index) {
        Some(label) => label.to_string(),
        None => {
            warn!(class_index, "No label configured for class, using raw index");
            class_index.to_string()
        }
    }
}
