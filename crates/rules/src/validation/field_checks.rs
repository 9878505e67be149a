//! Required-field and Origin/Study field checks.

use std::collections::BTreeSet;

use serde_json::{json, Value};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::repository::RuleSet;
use crate::schema::{json_type_name, ClassDescriptor, DescriptionKind, Mapping, REQUIRED};

/// Missing and unexpected names between a declared and an actual key set.
fn key_diff(declared: &BTreeSet<String>, actual: &BTreeSet<&str>) -> (Vec<String>, Vec<String>) {
    let missing = declared
        .iter()
        .filter(|k| !actual.contains(k.as_str()))
        .cloned()
        .collect();
    let unexpected = actual
        .iter()
        .filter(|k| !declared.contains(**k))
        .map(|k| k.to_string())
        .collect();
    (missing, unexpected)
}

fn required_keys(element: &Mapping) -> Option<BTreeSet<&str>> {
    element
        .get(REQUIRED)
        .and_then(Value::as_object)
        .map(|m| m.keys().map(String::as_str).collect())
}

// ── Required fields ─────────────────────────────────────────────────

/// Check every element's `Required` key set against the class rule.
///
/// When the Optional group is stored, at least one element's `Required` key
/// set must also be a subset of the declared Required set. The Optional
/// mapping's own keys are not inspected.
pub(super) fn check_required(
    elements: &[Mapping],
    descriptor: &ClassDescriptor,
    optional_stored: bool,
    rules: &RuleSet,
    diags: &mut Diagnostics,
) -> bool {
    let Some(rule) = rules.class_rule(&descriptor.class) else {
        diags.error(
            DiagnosticKind::MissingRule,
            format!("cannot validate {descriptor}, which has no class rule"),
        );
        return false;
    };

    let mut key_sets = Vec::with_capacity(elements.len());
    for (index, element) in elements.iter().enumerate() {
        match required_keys(element) {
            Some(keys) => key_sets.push(keys),
            None => {
                let found = element.get(REQUIRED).map(json_type_name).unwrap_or("absent");
                diags.error_with_details(
                    DiagnosticKind::IllTyped,
                    format!("Required is {found}, expected a mapping"),
                    json!({ "element": index }),
                );
                return false;
            }
        }
    }

    let mut all_match = true;
    for (index, keys) in key_sets.iter().enumerate() {
        let (missing, unexpected) = key_diff(&rule.required, keys);
        if missing.is_empty() && unexpected.is_empty() {
            continue;
        }
        all_match = false;
        diags.error_with_details(
            DiagnosticKind::MissingRequired,
            format!(
                "{descriptor} does not contain all required fields described by SVDS; missing required field(s): {missing:?}"
            ),
            json!({ "element": index, "missing": missing, "unexpected": unexpected }),
        );
    }

    let optional_compatible = !optional_stored
        || key_sets
            .iter()
            .any(|keys| keys.iter().all(|k| rule.required.contains(*k)));
    if !optional_compatible {
        diags.error(
            DiagnosticKind::MissingRequired,
            format!("no entry of {descriptor} has Required fields compatible with its class rule"),
        );
    }

    all_match && optional_compatible
}

// ── Origin / Study ──────────────────────────────────────────────────

/// Check that a description document's inner key set equals the origin rules.
pub(super) fn check_description(
    kind: DescriptionKind,
    inner: &Value,
    rules: &RuleSet,
    diags: &mut Diagnostics,
) -> bool {
    let Some(map) = inner.as_object() else {
        diags.error(
            DiagnosticKind::IllTyped,
            format!("{kind} is {}, expected a mapping", json_type_name(inner)),
        );
        return false;
    };

    let keys: BTreeSet<&str> = map.keys().map(String::as_str).collect();
    let (missing, unexpected) = key_diff(rules.origin_fields(), &keys);
    if missing.is_empty() && unexpected.is_empty() {
        diags.info(DiagnosticKind::Accepted, format!("{kind} record is valid"));
        return true;
    }

    diags.error_with_details(
        DiagnosticKind::OriginFields,
        format!("{kind} record is not valid; missing field(s): {missing:?}"),
        json!({ "missing": missing, "unexpected": unexpected }),
    );
    false
}
