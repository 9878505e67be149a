//! SVDS document loading, validation and normalization.
//!
//! This crate provides:
//! - The four fixed rule documents as a typed [`RuleSet`]
//! - A per-document structural [`Validator`] (key shape, Tag.Class, Required fields)
//! - A directory [`SvdsLoader`] that validates, normalizes and deep-merges documents
//! - An [`AttrTree`] view addressable by key or dotted path
//!
//! Only the existence of key fields is validated; field values are not checked.

pub mod diagnostics;
pub mod loader;
pub mod repository;
pub mod schema;
pub mod tree;
pub mod validation;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Level};
pub use loader::{LoadError, LoadOutcome, LoadResult, LoadStatus, Loaded, SvdsLoader};
pub use repository::{ClassRule, RuleError, RuleSet};
pub use schema::{ClassDescriptor, DescriptionKind, RawRecord};
pub use tree::{AttrTree, AttrValue};
pub use validation::{ValidatedRecord, ValidationState, Validator};
