//! The four fixed rule documents that drive file selection and validation.
//!
//! A [`RuleSet`] is loaded once from a rule directory and is read-only
//! afterwards. Either all four documents load or the whole load fails.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const FILE_NAMES_DOC: &str = "fixed_file_names.json";
pub const CLASS_NAMES_DOC: &str = "fixed_class_names.json";
pub const ORIGIN_RULES_DOC: &str = "fixed_origin_rules.json";
pub const CLASS_RULES_DOC: &str = "svds_class_rules.json";

/// A rule document is missing, unreadable or malformed.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("rule document not found: {}", .path.display())]
    Missing { path: PathBuf },

    #[error("failed to read rule document {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed rule document {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct FixedFileNames {
    fixed_file_names: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct FixedClassNames {
    fixed_class_names: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct FixedOriginRules {
    fixed_origin_rules: Vec<String>,
}

/// Required and Optional field names declared for one class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRule {
    #[serde(rename = "Required")]
    pub required: BTreeSet<String>,
    #[serde(rename = "Optional", default)]
    pub optional: BTreeSet<String>,
}

/// Immutable set of rules loaded from the rule directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    file_names: BTreeSet<String>,
    class_names: BTreeSet<String>,
    origin_fields: BTreeSet<String>,
    class_rules: BTreeMap<String, ClassRule>,
}

impl RuleSet {
    /// Build a rule set programmatically.
    pub fn new<F, C, O>(
        file_names: F,
        class_names: C,
        origin_fields: O,
        class_rules: BTreeMap<String, ClassRule>,
    ) -> Self
    where
        F: IntoIterator,
        F::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
    {
        Self {
            file_names: file_names.into_iter().map(Into::into).collect(),
            class_names: class_names.into_iter().map(Into::into).collect(),
            origin_fields: origin_fields.into_iter().map(Into::into).collect(),
            class_rules,
        }
    }

    /// Load all four rule documents from `dir`.
    pub fn load(dir: &Path) -> Result<Self, RuleError> {
        let file_names: FixedFileNames = read_doc(&dir.join(FILE_NAMES_DOC))?;
        let class_names: FixedClassNames = read_doc(&dir.join(CLASS_NAMES_DOC))?;
        let origin_rules: FixedOriginRules = read_doc(&dir.join(ORIGIN_RULES_DOC))?;
        let class_rules: BTreeMap<String, ClassRule> = read_doc(&dir.join(CLASS_RULES_DOC))?;

        let rules = Self::new(
            file_names.fixed_file_names,
            class_names.fixed_class_names,
            origin_rules.fixed_origin_rules,
            class_rules,
        );
        info!(
            path = %dir.display(),
            files = rules.file_names.len(),
            classes = rules.class_names.len(),
            class_rules = rules.class_rules.len(),
            "loaded SVDS rules"
        );
        Ok(rules)
    }

    /// File names eligible for loading from an SVDS directory.
    pub fn file_names(&self) -> &BTreeSet<String> {
        &self.file_names
    }

    /// Class names (the part after `::`) described by SVDS.
    pub fn class_names(&self) -> &BTreeSet<String> {
        &self.class_names
    }

    /// Exact key set required inside an Origin or Study document.
    pub fn origin_fields(&self) -> &BTreeSet<String> {
        &self.origin_fields
    }

    pub fn is_known_file(&self, name: &str) -> bool {
        self.file_names.contains(name)
    }

    pub fn is_known_class(&self, class: &str) -> bool {
        self.class_names.contains(class)
    }

    pub fn class_rule(&self, class: &str) -> Option<&ClassRule> {
        self.class_rules.get(class)
    }

    /// Iterate `(class, rule)` pairs in class-name order.
    pub fn classes(&self) -> impl Iterator<Item = (&str, &ClassRule)> {
        self.class_rules.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn read_doc<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, RuleError> {
    if !path.is_file() {
        return Err(RuleError::Missing {
            path: path.to_path_buf(),
        });
    }
    let contents = fs::read_to_string(path).map_err(|source| RuleError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "read rule document");
    serde_json::from_str(&contents).map_err(|source| RuleError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}
