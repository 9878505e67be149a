//! Read-only view over the merged tree.
//!
//! Every nested mapping becomes an [`AttrTree`] addressable by key
//! (`tree["Correlation"]["Concordance"]`) or by dotted path
//! (`tree.path("Correlation.Concordance")`). Sequences and scalars are kept as
//! plain `serde_json::Value` leaves.

use std::ops::Index;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::schema::Mapping;

/// Entry holding the ordered family and class names of a merged tree.
pub const CONTAINS: &str = "Contains";
const CONTAINS_FAMILY: &str = "Family";
const CONTAINS_CLASS: &str = "Class";

/// A node of an [`AttrTree`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Tree(AttrTree),
    Leaf(Value),
}

impl AttrValue {
    pub fn as_tree(&self) -> Option<&AttrTree> {
        match self {
            AttrValue::Tree(tree) => Some(tree),
            AttrValue::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&Value> {
        match self {
            AttrValue::Leaf(value) => Some(value),
            AttrValue::Tree(_) => None,
        }
    }

    /// Convert back to plain JSON.
    pub fn to_value(&self) -> Value {
        match self {
            AttrValue::Tree(tree) => tree.to_value(),
            AttrValue::Leaf(value) => value.clone(),
        }
    }

    fn wrap(value: Value) -> Self {
        match value {
            Value::Object(map) => AttrValue::Tree(AttrTree::wrap(map)),
            other => AttrValue::Leaf(other),
        }
    }
}

/// Panics if `self` is a leaf or `key` is absent, like `IndexMap` indexing.
impl Index<&str> for AttrValue {
    type Output = AttrValue;

    fn index(&self, key: &str) -> &AttrValue {
        match self {
            AttrValue::Tree(tree) => &tree[key],
            AttrValue::Leaf(_) => panic!("cannot index leaf value with key '{key}'"),
        }
    }
}

/// Family and class names recorded in the `Contains` entry, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Contains {
    #[serde(rename = "Family")]
    pub family: Vec<String>,
    #[serde(rename = "Class")]
    pub class: Vec<String>,
}

/// Mapping whose nested mappings are themselves `AttrTree`s.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AttrTree {
    entries: IndexMap<String, AttrValue>,
}

impl AttrTree {
    /// Recursively wrap a JSON mapping, keeping key order.
    pub fn wrap(map: Mapping) -> Self {
        Self {
            entries: map
                .into_iter()
                .map(|(k, v)| (k, AttrValue::wrap(v)))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.entries.get(key)
    }

    /// Follow a dotted path such as `"Description.Origin.Name"`.
    ///
    /// Keys that themselves contain `.` are reachable through [`at`](Self::at).
    pub fn path(&self, dotted: &str) -> Option<&AttrValue> {
        self.at(dotted.split('.'))
    }

    /// Follow a sequence of keys.
    pub fn at<'k, I>(&self, segments: I) -> Option<&AttrValue>
    where
        I: IntoIterator<Item = &'k str>,
    {
        let mut segments = segments.into_iter();
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            current = current.as_tree()?.get(segment)?;
        }
        Some(current)
    }

    pub fn subtree(&self, key: &str) -> Option<&AttrTree> {
        self.get(key).and_then(AttrValue::as_tree)
    }

    pub fn leaf(&self, key: &str) -> Option<&Value> {
        self.get(key).and_then(AttrValue::as_leaf)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read the `Contains` entry of a merged tree.
    pub fn contains(&self) -> Option<Contains> {
        let entry = self.subtree(CONTAINS)?;
        let names = |key: &str| -> Option<Vec<String>> {
            entry
                .leaf(key)?
                .as_array()?
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect()
        };
        Some(Contains {
            family: names(CONTAINS_FAMILY)?,
            class: names(CONTAINS_CLASS)?,
        })
    }

    /// Convert back to plain JSON.
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), v.to_value()))
                .collect(),
        )
    }
}

/// Panics if `key` is absent, like `IndexMap` indexing.
impl Index<&str> for AttrTree {
    type Output = AttrValue;

    fn index(&self, key: &str) -> &AttrValue {
        match self.entries.get(key) {
            Some(value) => value,
            None => panic!("key '{key}' not found in tree"),
        }
    }
}
