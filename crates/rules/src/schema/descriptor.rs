//! Family/Class names derived from record content.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::record::{json_type_name, Mapping, RawRecord};
use super::{CLASS, CLASS_SEPARATOR, DESCRIPTION_FAMILY, TAG};

/// `Tag.Class` could not be read or split.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassNameError {
    #[error("element has no Tag mapping")]
    MissingTag,
    #[error("Tag.Class is missing")]
    MissingClass,
    #[error("Tag.Class is {0}, expected a string")]
    ClassNotString(&'static str),
    #[error("Tag.Class '{0}' is not of the form 'Family::Class'")]
    Malformed(String),
}

/// The `(family, class)` pair a record is filed under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassDescriptor {
    pub family: String,
    pub class: String,
}

impl ClassDescriptor {
    pub fn new(family: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            class: class.into(),
        }
    }

    /// Split `"Family::Class"` into its two segments.
    pub fn parse(tag_class: &str) -> Result<Self, ClassNameError> {
        let mut parts = tag_class.split(CLASS_SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(family), Some(class), None) => Ok(Self::new(family, class)),
            _ => Err(ClassNameError::Malformed(tag_class.to_string())),
        }
    }

    /// Derive the descriptor for a record.
    ///
    /// Origin and Study singletons are filed under `Description`; everything
    /// else uses the first element's `Tag.Class`.
    pub fn resolve(record: &RawRecord) -> Result<Self, ClassNameError> {
        if let Some((kind, _)) = record.description() {
            return Ok(Self::new(DESCRIPTION_FAMILY, kind.as_str()));
        }
        let first = record.elements().first().ok_or(ClassNameError::MissingTag)?;
        Self::parse(tag_class(first)?)
    }
}

impl fmt::Display for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.family, CLASS_SEPARATOR, self.class)
    }
}

/// Read `Tag.Class` from one element.
pub fn tag_class(element: &Mapping) -> Result<&str, ClassNameError> {
    let tag = element
        .get(TAG)
        .and_then(|t| t.as_object())
        .ok_or(ClassNameError::MissingTag)?;
    let class = tag.get(CLASS).ok_or(ClassNameError::MissingClass)?;
    class
        .as_str()
        .ok_or_else(|| ClassNameError::ClassNotString(json_type_name(class)))
}
