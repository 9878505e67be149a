//! Tests for the SVDS loader module.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::json;
use tempfile::TempDir;

use super::*;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::repository::{ClassRule, RuleSet};

const ORIGIN_JSON: &str = r#"{"Origin": {"Name": "X", "Version": "1"}}"#;

const CONCORDANCE_JSON: &str = r#"[
  {"Tag": {"Class": "Correlation::Concordance", "Label": "a"}, "Required": {"rho": 0.91}},
  {"Tag": {"Class": "Correlation::Concordance", "Label": "b"}, "Required": {"rho": 0.87}}
]"#;

const SPEARMAN_JSON: &str = r#"{
  "Tag": {"Class": "Correlation::Spearman"},
  "Required": {"r": 0.5, "n": 12},
  "Optional": {"pValue": 0.03}
}"#;

fn rules() -> RuleSet {
    let mut class_rules = BTreeMap::new();
    class_rules.insert(
        "Concordance".to_string(),
        ClassRule {
            required: ["rho".to_string()].into_iter().collect(),
            optional: Default::default(),
        },
    );
    class_rules.insert(
        "Spearman".to_string(),
        ClassRule {
            required: ["r".to_string(), "n".to_string()].into_iter().collect(),
            optional: ["pValue".to_string()].into_iter().collect(),
        },
    );
    RuleSet::new(
        ["Origin.json", "Study.json", "Concordance.json", "Spearman.json", "Notes.txt"],
        ["Concordance", "Spearman"],
        ["Name", "Version"],
        class_rules,
    )
}

fn temp_loader() -> (TempDir, SvdsLoader) {
    let dir = TempDir::new().expect("create tempdir");
    (dir, SvdsLoader::new(rules()))
}

fn write(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).unwrap();
}

#[test]
fn origin_only_directory() {
    let (dir, loader) = temp_loader();
    write(dir.path(), "Origin.json", ORIGIN_JSON);

    let mut diags = Diagnostics::new();
    let outcome = loader.load_dir(dir.path(), &mut diags).unwrap();

    assert_eq!(
        outcome.tree.path("Description.Origin").unwrap().to_value(),
        json!({"Name": "X", "Version": "1"})
    );
    assert_eq!(outcome.loaded().count(), 1);
    assert!(!diags.has_errors());
}

#[test]
fn list_document_is_transposed() {
    let (dir, loader) = temp_loader();
    write(dir.path(), "Concordance.json", CONCORDANCE_JSON);

    let mut diags = Diagnostics::new();
    let tree = loader.load_dir(dir.path(), &mut diags).unwrap().tree;

    let tags = tree["Correlation"]["Concordance"]["Tag"].as_leaf().unwrap();
    assert_eq!(
        tags,
        &json!([
            {"Class": "Correlation::Concordance", "Label": "a"},
            {"Class": "Correlation::Concordance", "Label": "b"}
        ])
    );
    let required = tree.path("Correlation.Concordance.Required").unwrap();
    assert_eq!(required.to_value(), json!([{"rho": 0.91}, {"rho": 0.87}]));
}

#[test]
fn files_outside_fixed_names_are_silently_skipped() {
    let (dir, loader) = temp_loader();
    write(dir.path(), "Origin.json", ORIGIN_JSON);
    write(dir.path(), "Scratch.json", "this is not even json");

    let mut diags = Diagnostics::new();
    let outcome = loader.load_dir(dir.path(), &mut diags).unwrap();

    assert_eq!(outcome.results.len(), 1);
    assert!(outcome.results[0].path.ends_with("Origin.json"));
    assert_eq!(diags.for_source("Scratch.json").count(), 0);
}

#[test]
fn invalid_file_is_dropped_and_walk_continues() {
    let (dir, loader) = temp_loader();
    write(dir.path(), "Origin.json", ORIGIN_JSON);
    write(dir.path(), "Spearman.json", SPEARMAN_JSON);
    write(
        dir.path(),
        "Concordance.json",
        r#"[
          {"Tag": {"Class": "Correlation::Concordance"}, "Required": {"rho": 0.9}},
          {"Tag": {"Class": "Correlation::Concordance"}, "Required": {"tau": 0.8}}
        ]"#,
    );

    let mut diags = Diagnostics::new();
    let outcome = loader.load_dir(dir.path(), &mut diags).unwrap();

    let rejected: Vec<_> = outcome.dropped().collect();
    assert_eq!(rejected.len(), 1);
    assert!(rejected[0].path.ends_with("Concordance.json"));
    match &rejected[0].status {
        LoadStatus::Rejected { reasons } => {
            assert!(reasons.iter().any(|r| r.contains("rho")));
        }
        other => panic!("expected rejection, got {other:?}"),
    }

    let missing = diags
        .for_source("Concordance.json")
        .find(|d| d.kind == DiagnosticKind::MissingRequired)
        .unwrap();
    assert_eq!(missing.details.as_ref().unwrap()["missing"], json!(["rho"]));

    assert!(outcome.tree.path("Correlation.Concordance").is_none());
    assert!(outcome.tree.path("Correlation.Spearman.Optional.pValue").is_some());
    assert!(outcome.tree.path("Description.Origin").is_some());
}

#[test]
fn contains_follows_sorted_file_order() {
    let (dir, loader) = temp_loader();
    write(dir.path(), "Spearman.json", SPEARMAN_JSON);
    write(dir.path(), "Origin.json", ORIGIN_JSON);
    write(dir.path(), "Concordance.json", CONCORDANCE_JSON);

    let mut diags = Diagnostics::new();
    let first = loader.load_dir(dir.path(), &mut diags).unwrap();
    let second = loader.load_dir(dir.path(), &mut diags).unwrap();

    let contains = first.tree.contains().unwrap();
    assert_eq!(contains.family, vec!["Correlation", "Description", "Correlation"]);
    assert_eq!(contains.class, vec!["Concordance", "Origin", "Spearman"]);

    assert_eq!(
        serde_json::to_string(&first.tree["Contains"]).unwrap(),
        serde_json::to_string(&second.tree["Contains"]).unwrap()
    );
}

#[test]
fn classes_of_one_family_are_merged() {
    let (dir, loader) = temp_loader();
    write(dir.path(), "Spearman.json", SPEARMAN_JSON);
    write(dir.path(), "Concordance.json", CONCORDANCE_JSON);

    let mut diags = Diagnostics::new();
    let tree = loader.load_dir(dir.path(), &mut diags).unwrap().tree;

    let family = tree.subtree("Correlation").unwrap();
    assert_eq!(family.keys().collect::<Vec<_>>(), vec!["Concordance", "Spearman"]);
}

#[test]
fn unreadable_member_is_reported_not_fatal() {
    let (dir, loader) = temp_loader();
    write(dir.path(), "Origin.json", ORIGIN_JSON);
    write(dir.path(), "Study.json", "{ not json");

    let mut diags = Diagnostics::new();
    let outcome = loader.load_dir(dir.path(), &mut diags).unwrap();

    let unreadable: Vec<_> = outcome
        .results
        .iter()
        .filter(|r| matches!(r.status, LoadStatus::Unreadable { .. }))
        .collect();
    assert_eq!(unreadable.len(), 1);
    assert!(unreadable[0].path.ends_with("Study.json"));
    assert_eq!(outcome.loaded().count(), 1);
    assert!(diags
        .for_source("Study.json")
        .any(|d| d.kind == DiagnosticKind::Unreadable));
    assert!(!diags.set_recovered(false));
}

#[test]
fn non_json_member_aborts_directory_load() {
    let (dir, loader) = temp_loader();
    write(dir.path(), "Origin.json", ORIGIN_JSON);
    write(dir.path(), "Notes.txt", "plain text");

    let mut diags = Diagnostics::new();
    let err = loader.load(dir.path(), &mut diags).unwrap_err();
    assert!(matches!(err, LoadError::Format(ref path) if path.ends_with("Notes.txt")));
    assert!(!diags.set_recovered(false));
    assert_eq!(diags.source(), "");
}

#[test]
fn study_is_filed_under_description() {
    let (dir, loader) = temp_loader();
    write(dir.path(), "Study.json", r#"{"Study": {"Name": "Phantom", "Version": "2"}}"#);

    let mut diags = Diagnostics::new();
    let tree = loader.load_dir(dir.path(), &mut diags).unwrap().tree;
    assert_eq!(
        tree.path("Description.Study.Name").unwrap().as_leaf(),
        Some(&json!("Phantom"))
    );
}

#[test]
fn empty_directory_yields_empty_contains() {
    let (dir, loader) = temp_loader();
    let mut diags = Diagnostics::new();
    let outcome = loader.load_dir(dir.path(), &mut diags).unwrap();

    assert!(outcome.results.is_empty());
    let contains = outcome.tree.contains().unwrap();
    assert!(contains.family.is_empty());
    assert!(contains.class.is_empty());
}

#[test]
fn load_file_returns_raw_content_unvalidated() {
    let (dir, loader) = temp_loader();
    write(dir.path(), "Anything.json", r#"{"not": "svds"}"#);

    let mut diags = Diagnostics::new();
    let loaded = loader.load(&dir.path().join("Anything.json"), &mut diags).unwrap();
    assert_eq!(loaded.into_content(), Some(json!({"not": "svds"})));
    assert!(diags.is_empty());
}

#[test]
fn load_dispatches_directories_to_tree() {
    let (dir, loader) = temp_loader();
    write(dir.path(), "Origin.json", ORIGIN_JSON);

    let mut diags = Diagnostics::new();
    let tree = loader.load(dir.path(), &mut diags).unwrap().into_tree().unwrap();
    assert!(tree.contains_key("Description"));
}

#[test]
fn non_json_extension_is_a_format_error() {
    let (dir, loader) = temp_loader();
    write(dir.path(), "Origin.yaml", ORIGIN_JSON);

    let mut diags = Diagnostics::new();
    let err = loader.load(&dir.path().join("Origin.yaml"), &mut diags).unwrap_err();
    assert!(matches!(err, LoadError::Format(_)));
}

#[test]
fn missing_path_is_not_found() {
    let (dir, loader) = temp_loader();
    let mut diags = Diagnostics::new();
    let err = loader.load(&dir.path().join("nope"), &mut diags).unwrap_err();
    assert!(matches!(err, LoadError::NotFound(_)));
}

#[test]
fn missing_rules_abort_before_loading() {
    let dir = TempDir::new().unwrap();
    let err = SvdsLoader::from_rules_dir(dir.path()).err().unwrap();
    assert!(matches!(err, LoadError::Rules(_)));
}

#[test]
fn validate_file_reports_verdict() {
    let (dir, loader) = temp_loader();
    write(dir.path(), "Spearman.json", SPEARMAN_JSON);
    write(dir.path(), "Bad.json", r#"{"Tag": {"Class": "Correlation::Kendall"}, "Required": {}}"#);

    let mut diags = Diagnostics::new();
    assert!(loader.validate_file(&dir.path().join("Spearman.json"), &mut diags).unwrap());
    assert!(!loader.validate_file(&dir.path().join("Bad.json"), &mut diags).unwrap());
    assert!(diags
        .for_source("Bad.json")
        .any(|d| d.kind == DiagnosticKind::UnknownClass));
}
