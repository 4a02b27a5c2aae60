//! Validation rules for the service-selection step.

use std::sync::LazyLock;

use regex::Regex;

use crate::booking::ServiceSelection;

use super::{Rule, Schema};

/// Catalog slugs: alphanumeric plus hyphen and underscore.
static SERVICE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("service id regex"));

/// Bounds on the number of sessions in a recurring series.
pub const MIN_SESSIONS: u32 = 2;
pub const MAX_SESSIONS: u32 = 12;

/// The service-selection schema.
///
/// `frequency` and `sessions` are only inspected when `isRecurring` is set;
/// a one-off booking ignores whatever is in them.
pub fn schema() -> &'static Schema<ServiceSelection> {
    static SCHEMA: LazyLock<Schema<ServiceSelection>> = LazyLock::new(|| {
        Schema::new(vec![
            Rule::field("serviceId", "Please select a service", |s| {
                !s.service_id.is_empty()
            }),
            Rule::field("serviceId", "Service selection is invalid", |s| {
                s.service_id.is_empty() || SERVICE_ID_RE.is_match(&s.service_id)
            }),
            Rule::field(
                "frequency",
                "Please choose a frequency for recurring bookings",
                |s| !s.is_recurring || s.frequency.is_some(),
            ),
            Rule::field("sessions", "Please choose the number of sessions", |s| {
                !s.is_recurring || s.sessions.is_some()
            }),
            Rule::field(
                "sessions",
                "Number of sessions must be between 2 and 12",
                |s| {
                    !s.is_recurring
                        || s.sessions
                            .is_none_or(|n| (MIN_SESSIONS..=MAX_SESSIONS).contains(&n))
                },
            ),
        ])
    });
    &SCHEMA
}
