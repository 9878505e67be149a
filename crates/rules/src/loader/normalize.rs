//! Reshape validated records into `{Family: {Class: data}}` fragments.

use serde_json::{Map, Value};

use crate::schema::{ClassDescriptor, Mapping, RawRecord};
use crate::validation::ValidatedRecord;

/// The normalized content of one accepted file.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    descriptor: ClassDescriptor,
    data: Value,
}

impl Fragment {
    pub fn new(descriptor: ClassDescriptor, data: Value) -> Self {
        Self { descriptor, data }
    }

    pub fn descriptor(&self) -> &ClassDescriptor {
        &self.descriptor
    }

    /// The value stored under `family.class`.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Nest the data as `{family: {class: data}}`.
    pub fn into_mapping(self) -> Mapping {
        let mut class = Map::new();
        class.insert(self.descriptor.class, self.data);
        let mut family = Map::new();
        family.insert(self.descriptor.family, Value::Object(class));
        family
    }
}

/// Normalize a validated record. Returns `None` for invalid records.
pub fn normalize(validated: ValidatedRecord) -> Option<Fragment> {
    if !validated.is_valid() {
        return None;
    }
    let (record, descriptor) = validated.into_parts();
    Some(normalize_record(record, descriptor?))
}

/// Normalize a record under an already resolved descriptor.
///
/// - A list is transposed into a mapping of per-field sequences.
/// - An Origin/Study singleton is unwrapped to its inner mapping.
/// - Any other singleton is kept as-is.
pub fn normalize_record(record: RawRecord, descriptor: ClassDescriptor) -> Fragment {
    let description = record.description().map(|(kind, _)| kind);
    let data = match (record, description) {
        (RawRecord::List(elements), _) => Value::Object(transpose(elements)),
        (RawRecord::Singleton(mut map), Some(kind)) => {
            map.remove(kind.as_str()).unwrap_or(Value::Null)
        }
        (RawRecord::Singleton(map), None) => Value::Object(map),
    };
    Fragment::new(descriptor, data)
}

/// Turn a list of mappings into a mapping of sequences.
///
/// Field order follows first appearance; each sequence keeps element order.
pub fn transpose(elements: Vec<Mapping>) -> Mapping {
    let mut columns = Map::new();
    for element in elements {
        for (field, value) in element {
            let slot = columns
                .entry(field)
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(items) = slot {
                items.push(value);
            }
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mappings(value: Value) -> Vec<Mapping> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    #[test]
    fn transpose_keeps_one_entry_per_element_in_order() {
        let elements = mappings(json!([
            {"Tag": {"id": 1}, "Required": {"rho": 0.1}, "Optional": {"p": 1}},
            {"Tag": {"id": 2}, "Required": {"rho": 0.2}, "Optional": {"p": 2}},
            {"Tag": {"id": 3}, "Required": {"rho": 0.3}, "Optional": {"p": 3}}
        ]));
        let columns = transpose(elements);

        assert_eq!(columns.len(), 3);
        for field in ["Tag", "Required", "Optional"] {
            assert_eq!(columns[field].as_array().unwrap().len(), 3);
        }
        assert_eq!(columns["Tag"], json!([{"id": 1}, {"id": 2}, {"id": 3}]));
        assert_eq!(columns["Required"][2], json!({"rho": 0.3}));
    }

    #[test]
    fn list_is_nested_under_family_and_class() {
        let record = RawRecord::from_value(json!([
            {"Tag": {"Class": "Correlation::Concordance"}, "Required": {"rho": 0.9}},
            {"Tag": {"Class": "Correlation::Concordance"}, "Required": {"rho": 0.8}}
        ]))
        .unwrap();
        let fragment = normalize_record(record, ClassDescriptor::new("Correlation", "Concordance"));

        let mapping = fragment.into_mapping();
        assert_eq!(
            mapping["Correlation"]["Concordance"]["Required"],
            json!([{"rho": 0.9}, {"rho": 0.8}])
        );
    }

    #[test]
    fn origin_singleton_is_unwrapped() {
        let record = RawRecord::from_value(json!({"Origin": {"Name": "X", "Version": "1"}})).unwrap();
        let fragment = normalize_record(record, ClassDescriptor::new("Description", "Origin"));
        assert_eq!(fragment.data(), &json!({"Name": "X", "Version": "1"}));
    }

    #[test]
    fn general_singleton_is_kept_as_is() {
        let body = json!({"Tag": {"Class": "Correlation::Concordance"}, "Required": {"rho": 0.9}});
        let record = RawRecord::from_value(body.clone()).unwrap();
        let fragment = normalize_record(record, ClassDescriptor::new("Correlation", "Concordance"));
        assert_eq!(fragment.data(), &body);
    }
}
