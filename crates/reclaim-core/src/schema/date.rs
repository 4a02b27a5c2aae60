//! Validation rules for the date-selection step.

use std::sync::LazyLock;

use chrono::{Local, NaiveDate};
use regex::Regex;

use crate::booking::DateSelection;

use super::{Rule, Schema};

/// Wire format for booking dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Exactly `YYYY-MM-DD`. chrono alone is too lenient here: it accepts
/// non-zero-padded input like `2031-1-5`, which would store a
/// non-canonical string that later miscompares against canonical keys.
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date regex"));

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if !DATE_RE.is_match(raw) {
        return None;
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

/// The date-selection schema.
///
/// A time slot is meaningless without a date, so the slot is required even
/// when only the date was filled in; the caller supplies both together.
/// "Not in the past" is evaluated against the local calendar date at
/// validation time; today passes.
pub fn schema() -> &'static Schema<DateSelection> {
    static SCHEMA: LazyLock<Schema<DateSelection>> = LazyLock::new(|| {
        Schema::new(vec![
            Rule::field("selectedDate", "Please select a date", |d| {
                !d.selected_date.is_empty()
            }),
            Rule::field("selectedDate", "Date must be in YYYY-MM-DD format", |d| {
                d.selected_date.is_empty() || parse_date(&d.selected_date).is_some()
            }),
            Rule::field("selectedDate", "Date cannot be in the past", |d| {
                match parse_date(&d.selected_date) {
                    Some(date) => date >= Local::now().date_naive(),
                    // Missing or malformed dates are reported by the rules
                    // above.
                    None => true,
                }
            }),
            Rule::field("selectedTimeSlot", "Please select a time slot", |d| {
                !d.selected_time_slot.is_empty()
            }),
        ])
    });
    &SCHEMA
}
