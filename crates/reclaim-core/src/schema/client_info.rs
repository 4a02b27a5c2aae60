//! Validation rules for the client-information step.

use std::sync::LazyLock;

use regex::Regex;

use crate::booking::{ClientInfo, ContactMethod};

use super::{Rule, Schema};

/// Letters, spaces, hyphens, and apostrophes.
static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z' -]*$").expect("name regex"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

/// Tolerant international phone pattern: optional leading `+`, then digits
/// with common separators.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9().\- ]{5,18}[0-9]$").expect("phone regex"));

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 50;

fn name_ok(name: &str) -> bool {
    (NAME_MIN..=NAME_MAX).contains(&name.chars().count()) && NAME_RE.is_match(name)
}

/// The client-information schema.
///
/// The contact-method cross rules come before the generic required rules so
/// that a missing phone under `preferredContactMethod = phone` reports the
/// method-specific message. Email is validated as supplied; the session
/// update API has already trimmed and lower-cased it.
pub fn schema() -> &'static Schema<ClientInfo> {
    static SCHEMA: LazyLock<Schema<ClientInfo>> = LazyLock::new(|| {
        Schema::new(vec![
            Rule::field("firstName", "First name is required", |c| {
                !c.first_name.is_empty()
            }),
            Rule::field(
                "firstName",
                "First name must be 2-50 letters, spaces, hyphens, or apostrophes",
                |c| c.first_name.is_empty() || name_ok(&c.first_name),
            ),
            Rule::field("lastName", "Last name is required", |c| {
                !c.last_name.is_empty()
            }),
            Rule::field(
                "lastName",
                "Last name must be 2-50 letters, spaces, hyphens, or apostrophes",
                |c| c.last_name.is_empty() || name_ok(&c.last_name),
            ),
            Rule::field(
                "email",
                "Email is required for your chosen contact method",
                |c| c.preferred_contact_method != Some(ContactMethod::Email) || !c.email.is_empty(),
            ),
            Rule::field("email", "Email is required", |c| !c.email.is_empty()),
            Rule::field("email", "Please enter a valid email address", |c| {
                c.email.is_empty() || EMAIL_RE.is_match(&c.email)
            }),
            Rule::field(
                "phone",
                "Phone number is required for your chosen contact method",
                |c| {
                    !matches!(
                        c.preferred_contact_method,
                        Some(ContactMethod::Phone) | Some(ContactMethod::Text)
                    ) || !c.phone.is_empty()
                },
            ),
            Rule::field("phone", "Phone number is required", |c| !c.phone.is_empty()),
            Rule::field("phone", "Please enter a valid phone number", |c| {
                c.phone.is_empty() || PHONE_RE.is_match(&c.phone)
            }),
            Rule::field(
                "preferredContactMethod",
                "Please choose a preferred contact method",
                |c| c.preferred_contact_method.is_some(),
            ),
            Rule::field(
                "privacyPolicyAccepted",
                "You must accept the privacy policy to continue",
                |c| c.privacy_policy_accepted,
            ),
        ])
    });
    &SCHEMA
}
