//! Parsed JSON content of one SVDS file.

use std::fmt;

use serde_json::{Map, Value};

/// A JSON object.
pub type Mapping = Map<String, Value>;

/// Content is not a mapping or a non-empty list of mappings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordShapeError {
    #[error("content is an empty list")]
    Empty,
    #[error("list element {index} is not a mapping")]
    NotAMapping { index: usize },
    #[error("content is {0}, expected a mapping or a list of mappings")]
    WrongType(&'static str),
}

/// Provenance documents whose sole top-level key names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptionKind {
    Origin,
    Study,
}

impl DescriptionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DescriptionKind::Origin => "Origin",
            DescriptionKind::Study => "Study",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Origin" => Some(DescriptionKind::Origin),
            "Study" => Some(DescriptionKind::Study),
            _ => None,
        }
    }
}

impl fmt::Display for DescriptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The body of one input file.
///
/// A top-level object, or a one-element list, is a `Singleton`. Longer lists
/// are a `List`.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    Singleton(Mapping),
    List(Vec<Mapping>),
}

impl RawRecord {
    pub fn from_value(value: Value) -> Result<Self, RecordShapeError> {
        match value {
            Value::Object(map) => Ok(RawRecord::Singleton(map)),
            Value::Array(items) => {
                let mut maps = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    match item {
                        Value::Object(map) => maps.push(map),
                        _ => return Err(RecordShapeError::NotAMapping { index }),
                    }
                }
                match maps.len() {
                    0 => Err(RecordShapeError::Empty),
                    1 => Ok(RawRecord::Singleton(maps.remove(0))),
                    _ => Ok(RawRecord::List(maps)),
                }
            }
            other => Err(RecordShapeError::WrongType(json_type_name(&other))),
        }
    }

    /// All element mappings, in file order.
    pub fn elements(&self) -> &[Mapping] {
        match self {
            RawRecord::Singleton(map) => std::slice::from_ref(map),
            RawRecord::List(maps) => maps,
        }
    }

    pub fn len(&self) -> usize {
        self.elements().len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements().is_empty()
    }

    pub fn is_singleton(&self) -> bool {
        matches!(self, RawRecord::Singleton(_))
    }

    /// For an Origin/Study singleton, its kind and the inner value.
    pub fn description(&self) -> Option<(DescriptionKind, &Value)> {
        let RawRecord::Singleton(map) = self else {
            return None;
        };
        if map.len() != 1 {
            return None;
        }
        let (key, inner) = map.iter().next()?;
        DescriptionKind::from_key(key).map(|kind| (kind, inner))
    }

    pub fn into_value(self) -> Value {
        match self {
            RawRecord::Singleton(map) => Value::Object(map),
            RawRecord::List(maps) => Value::Array(maps.into_iter().map(Value::Object).collect()),
        }
    }
}

/// JSON type name for diagnostics.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
