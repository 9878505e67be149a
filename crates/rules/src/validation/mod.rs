//! Per-document structural validation.
//!
//! A [`Validator`] walks one document through
//! `Loaded → KeyShapeChecked → ClassChecked → FieldsChecked → Valid | Invalid`.
//! Origin and Study documents take a separate branch that only checks their
//! field names against the origin rules. Failures never surface as errors:
//! they end in `Invalid` and leave diagnostics in the injected collector.

mod field_checks;
mod structure_checks;

pub mod fuzzy;

use serde_json::Value;

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::repository::RuleSet;
use crate::schema::{ClassDescriptor, RawRecord, RecordShapeError};

/// Position of a document in the validation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationState {
    /// Nothing has been loaded yet.
    Empty,
    Loaded,
    KeyShapeChecked,
    ClassChecked,
    FieldsChecked,
    Valid,
    Invalid,
}

impl ValidationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ValidationState::Valid | ValidationState::Invalid)
    }
}

/// A record together with the outcome of validating it.
#[derive(Debug, Clone)]
pub struct ValidatedRecord {
    record: RawRecord,
    descriptor: Option<ClassDescriptor>,
    valid: bool,
    diagnostics: Vec<Diagnostic>,
}

impl ValidatedRecord {
    pub fn record(&self) -> &RawRecord {
        &self.record
    }

    /// The resolved `(family, class)`; always present when valid.
    pub fn descriptor(&self) -> Option<&ClassDescriptor> {
        self.descriptor.as_ref()
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Diagnostics produced while validating this record.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_parts(self) -> (RawRecord, Option<ClassDescriptor>) {
        (self.record, self.descriptor)
    }
}

/// Structural checker for one SVDS document.
pub struct Validator<'a> {
    rules: &'a RuleSet,
    diagnostics: &'a mut Diagnostics,
    /// Collector length when this validator started.
    mark: usize,
    content: Option<Result<RawRecord, RecordShapeError>>,
    state: ValidationState,
    optional_stored: Option<bool>,
    descriptor: Option<ClassDescriptor>,
}

impl<'a> Validator<'a> {
    pub fn new(rules: &'a RuleSet, diagnostics: &'a mut Diagnostics) -> Self {
        let mark = diagnostics.len();
        Self {
            rules,
            diagnostics,
            mark,
            content: None,
            state: ValidationState::Empty,
            optional_stored: None,
            descriptor: None,
        }
    }

    /// Load parsed JSON content, deciding once whether it is a singleton or a list.
    pub fn load(&mut self, content: Value) {
        self.content = Some(RawRecord::from_value(content));
        self.state = ValidationState::Loaded;
        self.optional_stored = None;
        self.descriptor = None;
    }

    /// Run the state machine to a terminal state and return whether the content is valid.
    pub fn validate(&mut self) -> bool {
        let valid = self.run();
        self.state = if valid {
            ValidationState::Valid
        } else {
            ValidationState::Invalid
        };
        valid
    }

    fn run(&mut self) -> bool {
        let record = match &self.content {
            Some(Ok(record)) => record,
            Some(Err(e)) => {
                self.diagnostics.error(DiagnosticKind::IllTyped, e.to_string());
                return false;
            }
            None => {
                self.diagnostics.error(DiagnosticKind::IllTyped, "no content loaded");
                return false;
            }
        };

        if let Some((kind, inner)) = record.description() {
            let valid = field_checks::check_description(kind, inner, self.rules, self.diagnostics);
            if valid {
                self.descriptor = ClassDescriptor::resolve(record).ok();
            }
            return valid;
        }

        let elements = record.elements();

        let Some(optional_stored) = structure_checks::check_key_shape(elements, self.diagnostics)
        else {
            return false;
        };
        self.optional_stored = Some(optional_stored);
        self.state = ValidationState::KeyShapeChecked;

        let Some(descriptor) = structure_checks::check_class(elements, self.rules, self.diagnostics)
        else {
            return false;
        };
        self.state = ValidationState::ClassChecked;

        let fields_ok = field_checks::check_required(
            elements,
            &descriptor,
            optional_stored,
            self.rules,
            self.diagnostics,
        );
        self.descriptor = Some(descriptor);
        self.state = ValidationState::FieldsChecked;
        fields_ok
    }

    pub fn state(&self) -> ValidationState {
        self.state
    }

    /// Whether the loaded content carries an Optional group; known after the key-shape check.
    pub fn optional_stored(&self) -> Option<bool> {
        self.optional_stored
    }

    pub fn descriptor(&self) -> Option<&ClassDescriptor> {
        self.descriptor.as_ref()
    }

    /// Diagnostics appended by this validator.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.diagnostics.since(self.mark)
    }

    /// Consume the validator, yielding the record and its verdict.
    ///
    /// Returns `None` when no well-shaped content was loaded.
    pub fn into_validated(self) -> Option<ValidatedRecord> {
        let diagnostics = self.diagnostics.since(self.mark).to_vec();
        let valid = self.state == ValidationState::Valid;
        match self.content {
            Some(Ok(record)) => Some(ValidatedRecord {
                record,
                descriptor: self.descriptor,
                valid,
                diagnostics,
            }),
            _ => None,
        }
    }
}
