//! Core [`SvdsLoader`] struct: rule-driven loading of SVDS files and directories.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::repository::RuleSet;
use crate::tree::AttrTree;
use crate::validation::Validator;

use super::error::{LoadError, LoadResult, LoadStatus, Result};
use super::merge::AggregateTree;
use super::normalize::normalize;

const JSON_EXTENSION: &str = "json";

/// Result of loading a path: a merged tree for a directory, raw content for a file.
#[derive(Debug)]
pub enum Loaded {
    Tree(LoadOutcome),
    Content(Value),
}

impl Loaded {
    pub fn into_tree(self) -> Option<AttrTree> {
        match self {
            Loaded::Tree(outcome) => Some(outcome.tree),
            Loaded::Content(_) => None,
        }
    }

    pub fn into_content(self) -> Option<Value> {
        match self {
            Loaded::Content(value) => Some(value),
            Loaded::Tree(_) => None,
        }
    }
}

/// Merged tree of a directory plus a per-file report.
#[derive(Debug)]
pub struct LoadOutcome {
    pub tree: AttrTree,
    /// One entry per file in the read set, in processing order.
    pub results: Vec<LoadResult>,
}

impl LoadOutcome {
    pub fn loaded(&self) -> impl Iterator<Item = &LoadResult> {
        self.results.iter().filter(|r| r.status.is_loaded())
    }

    pub fn dropped(&self) -> impl Iterator<Item = &LoadResult> {
        self.results.iter().filter(|r| !r.status.is_loaded())
    }
}

/// Loads SVDS files and directories against a fixed [`RuleSet`].
///
/// The rule set is read-only and may be reused across sequential loads.
pub struct SvdsLoader {
    rules: RuleSet,
}

impl SvdsLoader {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Load the rule documents from `rules_dir`; fails before any input is touched.
    pub fn from_rules_dir(rules_dir: &Path) -> Result<Self> {
        Ok(Self::new(RuleSet::load(rules_dir)?))
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Load a directory (validated and merged) or a single file (raw content).
    pub fn load(&self, path: &Path, diags: &mut Diagnostics) -> Result<Loaded> {
        if path.is_dir() {
            self.load_dir(path, diags).map(Loaded::Tree)
        } else if path.is_file() {
            self.load_file(path).map(Loaded::Content)
        } else {
            Err(LoadError::NotFound(path.to_path_buf()))
        }
    }

    /// Read and parse one JSON file without validating it.
    pub fn load_file(&self, path: &Path) -> Result<Value> {
        read_json(path)
    }

    /// Files in `dir` whose names appear in the rule set, sorted by name.
    pub fn read_set(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(dir).map_err(|source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut names = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(|source| LoadError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if self.rules.is_known_file(name) {
                names.insert(name.to_string());
            } else {
                debug!(path = %entry.path().display(), "not a fixed SVDS file name, skipping");
            }
        }

        Ok(names.into_iter().map(|name| dir.join(name)).collect())
    }

    /// Validate, normalize and merge every file of the read set.
    ///
    /// Invalid or unreadable files are reported and skipped. A directory
    /// listing failure or a member with a non-JSON extension aborts the load.
    pub fn load_dir(&self, dir: &Path, diags: &mut Diagnostics) -> Result<LoadOutcome> {
        let previous = diags.set_recovered(true);
        let outcome = self.walk_dir(dir, diags);
        diags.set_recovered(previous);
        diags.scoped(String::new());
        outcome
    }

    fn walk_dir(&self, dir: &Path, diags: &mut Diagnostics) -> Result<LoadOutcome> {
        let mut aggregate = AggregateTree::new();
        let mut results = Vec::new();

        for path in self.read_set(dir)? {
            let name = file_label(&path);
            diags.scoped(name.clone());
            let mark = diags.len();

            let content = match self.load_file(&path) {
                Ok(content) => content,
                Err(e @ LoadError::Format(_)) => return Err(e),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to read SVDS file");
                    diags.error(DiagnosticKind::Unreadable, e.to_string());
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Unreadable {
                            error: e.to_string(),
                        },
                    });
                    continue;
                }
            };

            let mut validator = Validator::new(&self.rules, diags);
            validator.load(content);
            validator.validate();

            match validator.into_validated().and_then(normalize) {
                Some(fragment) => {
                    let descriptor = fragment.descriptor().clone();
                    info!(
                        path = %path.display(),
                        family = %descriptor.family,
                        class = %descriptor.class,
                        "loaded SVDS file"
                    );
                    diags.info(DiagnosticKind::Accepted, format!("{name} is a valid SVDS file"));
                    aggregate.fold(fragment);
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Loaded {
                            family: descriptor.family,
                            class: descriptor.class,
                        },
                    });
                }
                None => {
                    let reasons: Vec<String> = diags
                        .since(mark)
                        .iter()
                        .filter(|d| d.kind.is_violation())
                        .map(|d| d.message.clone())
                        .collect();
                    warn!(path = %path.display(), reasons = ?reasons, "SVDS file rejected");
                    diags.error(DiagnosticKind::Rejected, format!("{name} is NOT a valid SVDS file"));
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Rejected { reasons },
                    });
                }
            }
        }

        let tree = aggregate.finish();
        info!(
            path = %dir.display(),
            loaded = results.iter().filter(|r| r.status.is_loaded()).count(),
            total = results.len(),
            "loaded SVDS directory"
        );
        Ok(LoadOutcome { tree, results })
    }

    /// Validate a single file and report whether it is valid.
    pub fn validate_file(&self, path: &Path, diags: &mut Diagnostics) -> Result<bool> {
        let content = self.load_file(path)?;
        diags.scoped(file_label(path));
        let mut validator = Validator::new(&self.rules, diags);
        validator.load(content);
        Ok(validator.validate())
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read a `.json` file; any other extension is a format error.
pub(super) fn read_json(path: &Path) -> Result<Value> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e == JSON_EXTENSION)
        .unwrap_or(false);
    if !is_json {
        return Err(LoadError::Format(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
