//! Key-shape and Tag.Class checks shared by every non-description document.

use std::collections::BTreeSet;

use serde_json::json;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::repository::RuleSet;
use crate::schema::{tag_class, ClassDescriptor, Mapping, OPTIONAL, REQUIRED, TAG};

use super::fuzzy::fuzzy_match;

// ── Key shape ───────────────────────────────────────────────────────

/// Check that every element carries `{Tag, Required, Optional}` or every
/// element carries `{Tag, Required}`.
///
/// Returns whether the Optional group is stored, or `None` on a mixed or
/// foreign key set.
pub(super) fn check_key_shape(elements: &[Mapping], diags: &mut Diagnostics) -> Option<bool> {
    let with_optional: BTreeSet<&str> = [TAG, REQUIRED, OPTIONAL].into_iter().collect();
    let without_optional: BTreeSet<&str> = [TAG, REQUIRED].into_iter().collect();

    let key_sets: Vec<BTreeSet<&str>> = elements
        .iter()
        .map(|e| e.keys().map(String::as_str).collect())
        .collect();

    if key_sets.iter().all(|keys| *keys == with_optional) {
        diags.info(DiagnosticKind::Accepted, "content contains key: Optional");
        return Some(true);
    }
    if key_sets.iter().all(|keys| *keys == without_optional) {
        diags.warn(DiagnosticKind::OptionalAbsent, "content does not contain key: Optional");
        return Some(false);
    }

    diags.error_with_details(
        DiagnosticKind::BaseStructure,
        "content does not attain base SVDS structure",
        json!({ "keys": key_sets }),
    );
    None
}

// ── Tag.Class ───────────────────────────────────────────────────────

/// Check that `Tag.Class` is identical across elements and names a declared class.
pub(super) fn check_class(
    elements: &[Mapping],
    rules: &RuleSet,
    diags: &mut Diagnostics,
) -> Option<ClassDescriptor> {
    let mut classes: Vec<&str> = Vec::with_capacity(elements.len());
    for (index, element) in elements.iter().enumerate() {
        match tag_class(element) {
            Ok(class) => classes.push(class),
            Err(e) => {
                diags.error_with_details(
                    DiagnosticKind::IllTyped,
                    format!("cannot read Tag.Class: {e}"),
                    json!({ "element": index }),
                );
                return None;
            }
        }
    }

    let first = *classes.first()?;
    if classes.iter().any(|c| *c != first) {
        let distinct: BTreeSet<&str> = classes.iter().copied().collect();
        diags.error_with_details(
            DiagnosticKind::InconsistentClass,
            "Tag.Class is inconsistent across entries",
            json!({ "classes": distinct }),
        );
        return None;
    }

    let descriptor = match ClassDescriptor::parse(first) {
        Ok(d) => d,
        Err(e) => {
            diags.error(DiagnosticKind::UnknownClass, format!("{first} is not described by SVDS: {e}"));
            return None;
        }
    };

    if !rules.is_known_class(&descriptor.class) {
        let candidates: Vec<&str> = rules.class_names().iter().map(String::as_str).collect();
        let message = format!("{first} is not described by SVDS");
        match fuzzy_match(&descriptor.class, &candidates) {
            Some(suggestion) => diags.error_with_details(
                DiagnosticKind::UnknownClass,
                message,
                json!({ "suggestion": suggestion }),
            ),
            None => diags.error(DiagnosticKind::UnknownClass, message),
        }
        return None;
    }

    diags.info(DiagnosticKind::Accepted, format!("Tag.Class is consistent: {first}"));
    Some(descriptor)
}
