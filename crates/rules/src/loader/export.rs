//! Reader for software export files.
//!
//! An export wraps SVDS content under a single root key naming the software
//! that produced it, e.g. `{"qMRLab": [...]}`.

use std::path::Path;

use serde_json::Value;

use super::core::read_json;
use super::error::{LoadError, Result};

/// SVDS content together with the software that exported it.
#[derive(Debug, Clone, PartialEq)]
pub struct SoftwareExport {
    pub software: String,
    pub content: Value,
}

/// Read an export file and split off its software root key.
pub fn read_export(path: &Path) -> Result<SoftwareExport> {
    let export_error = |reason: &str| LoadError::Export {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let Value::Object(mut root) = read_json(path)? else {
        return Err(export_error("root is not a mapping"));
    };
    if root.len() != 1 {
        return Err(export_error(&format!(
            "expected exactly one root key, found {}",
            root.len()
        )));
    }
    let Some(software) = root.keys().next().cloned() else {
        return Err(export_error("root is empty"));
    };
    let content = root.remove(&software).unwrap_or(Value::Null);
    tracing::debug!(path = %path.display(), software = %software, "read software export");
    Ok(SoftwareExport { software, content })
}
