//! Declarative per-step validation schemas.
//!
//! Each step schema is a flat, fixed-order list of [`Rule`]s over that
//! step's slice of the booking state. Rules are independent predicates;
//! the interpreter records at most one message per field path (the first
//! failing rule wins) and attributes pathless failures to the synthetic
//! `"form"` key. Validation is deterministic and performs no I/O.

pub mod client_info;
pub mod confirmation;
pub mod date;
pub mod service;

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Field path -> human-readable message, at most one message per path.
pub type FieldErrors = BTreeMap<String, String>;

/// Synthetic path used for failures not attributable to a single field.
pub const FORM_KEY: &str = "form";

/// Internal failure of the schema machinery itself, as opposed to a field
/// failing a rule. Callers surface this through the "unexpected" error
/// channel, never as a field message.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to build candidate for field check: {0}")]
    Candidate(#[source] serde_json::Error),
}

/// One validation rule: a predicate over the candidate, the field path the
/// failure is attributed to, and the message shown on failure.
///
/// Predicates are plain function pointers so a schema can live in a
/// `static`. A rule guarding a cross-field requirement should pass when its
/// precondition does not hold, leaving the base rule for that field to
/// report the generic message.
pub struct Rule<T> {
    path: &'static str,
    message: &'static str,
    check: fn(&T) -> bool,
}

impl<T> Rule<T> {
    /// A rule attributed to a named field.
    pub const fn field(path: &'static str, message: &'static str, check: fn(&T) -> bool) -> Self {
        Self {
            path,
            message,
            check,
        }
    }

    /// A rule with no single responsible field; failures land on
    /// [`FORM_KEY`].
    pub const fn form(message: &'static str, check: fn(&T) -> bool) -> Self {
        Self {
            path: FORM_KEY,
            message,
            check,
        }
    }
}

/// A fixed-order rule list for one step's candidate type.
pub struct Schema<T> {
    rules: Vec<Rule<T>>,
}

impl<T> Schema<T>
where
    T: Default + Serialize + DeserializeOwned,
{
    pub fn new(rules: Vec<Rule<T>>) -> Self {
        Self { rules }
    }

    /// Run every rule against the candidate.
    ///
    /// Returns `Ok(())` when all rules pass, or the collected field errors.
    /// Rules run in declaration order; the first failing rule for a path
    /// determines that path's message.
    pub fn validate(&self, candidate: &T) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        for rule in &self.rules {
            if !(rule.check)(candidate) {
                errors
                    .entry(rule.path.to_owned())
                    .or_insert_with(|| rule.message.to_owned());
            }
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Validate a single field in isolation.
    ///
    /// Substitutes `value` into an otherwise-default-valued candidate,
    /// re-runs the full schema, and reports only errors whose path starts
    /// with `field`. Lets a UI show live per-field feedback before the rest
    /// of the form is filled in.
    ///
    /// A value that cannot deserialize into the candidate's field type
    /// (e.g. an unknown enum string) is reported as an invalid value for
    /// that field rather than an internal error.
    pub fn validate_field(
        &self,
        field: &str,
        value: serde_json::Value,
    ) -> Result<Option<String>, SchemaError> {
        let mut candidate = serde_json::to_value(T::default()).map_err(SchemaError::Candidate)?;
        match &mut candidate {
            serde_json::Value::Object(map) => {
                map.insert(field.to_owned(), value);
            }
            _ => {
                // Step slices are always JSON objects.
                return Err(SchemaError::Candidate(serde::ser::Error::custom(
                    "candidate did not serialize to an object",
                )));
            }
        }

        let parsed: T = match serde_json::from_value(candidate) {
            Ok(parsed) => parsed,
            Err(_) => return Ok(Some(format!("{field} is invalid"))),
        };

        match self.validate(&parsed) {
            Ok(()) => Ok(None),
            Err(errors) => Ok(errors
                .into_iter()
                .find(|(path, _)| path == field || path.starts_with(&format!("{field}.")))
                .map(|(_, message)| message)),
        }
    }
}
