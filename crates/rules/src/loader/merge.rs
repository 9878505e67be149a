//! Deep-merge of fragments into the aggregate tree.

use serde_json::{json, Map, Value};

use crate::schema::Mapping;
use crate::tree::{AttrTree, Contains, CONTAINS};

use super::normalize::Fragment;

/// Deep-merge `source` into `destination`: mappings merge recursively, every
/// other value (scalars, sequences) overwrites.
///
/// A mapping merged onto an existing non-mapping value replaces it.
pub fn update(destination: &mut Mapping, source: Mapping) {
    for (key, value) in source {
        match value {
            Value::Object(child) => {
                let slot = destination
                    .entry(key)
                    .or_insert_with(|| Value::Object(Map::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Map::new());
                }
                if let Value::Object(parent) = slot {
                    update(parent, child);
                }
            }
            other => {
                destination.insert(key, other);
            }
        }
    }
}

/// Owned form of [`update`].
pub fn merge(mut destination: Mapping, source: Mapping) -> Mapping {
    update(&mut destination, source);
    destination
}

/// Running merge of every accepted fragment, in processing order.
#[derive(Debug, Clone, Default)]
pub struct AggregateTree {
    root: Mapping,
    contains: Contains,
}

impl AggregateTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one fragment and record its family and class names.
    pub fn fold(&mut self, fragment: Fragment) {
        let descriptor = fragment.descriptor();
        self.contains.family.push(descriptor.family.clone());
        self.contains.class.push(descriptor.class.clone());
        update(&mut self.root, fragment.into_mapping());
    }

    /// Names merged so far.
    pub fn contains(&self) -> &Contains {
        &self.contains
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.root
    }

    /// Set the `Contains` entry (replacing, not merging) and wrap the result.
    pub fn finish(self) -> AttrTree {
        let Self { mut root, contains } = self;
        root.insert(
            CONTAINS.to_string(),
            json!({ "Family": contains.family, "Class": contains.class }),
        );
        AttrTree::wrap(root)
    }
}
