//! Domain types for a booking session.
//!
//! A [`BookingState`] aggregates the data collected across the wizard steps:
//! service selection, date selection, client information, and confirmation.
//! Each step owns its own slice; validators never look at another step's
//! fields. All wire forms are camelCase to match the web client.

pub mod session;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Step identifiers
// ---------------------------------------------------------------------------

/// One stage of the booking wizard, in wizard order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    ServiceSelection,
    DateSelection,
    ClientInformation,
    Confirmation,
    Success,
}

impl StepId {
    /// All steps in wizard order.
    pub const ALL: [StepId; 5] = [
        StepId::ServiceSelection,
        StepId::DateSelection,
        StepId::ClientInformation,
        StepId::Confirmation,
        StepId::Success,
    ];

    /// Zero-based position in the wizard sequence.
    pub fn index(self) -> usize {
        match self {
            Self::ServiceSelection => 0,
            Self::DateSelection => 1,
            Self::ClientInformation => 2,
            Self::Confirmation => 3,
            Self::Success => 4,
        }
    }

    /// The next step, or `None` from the terminal step.
    pub fn next(self) -> Option<StepId> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// The previous step, or `None` from the first step.
    pub fn prev(self) -> Option<StepId> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    /// Check whether moving from `from` to `to` is a legal wizard
    /// transition.
    ///
    /// Forward movement is only ever one step at a time; backward movement
    /// is always permitted so a client can revisit earlier data. `success`
    /// is terminal: nothing moves out of it.
    pub fn is_valid_transition(from: StepId, to: StepId) -> bool {
        if from == Self::Success {
            return false;
        }
        to.index() < from.index() || from.next() == Some(to)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ServiceSelection => "service_selection",
            Self::DateSelection => "date_selection",
            Self::ClientInformation => "client_information",
            Self::Confirmation => "confirmation",
            Self::Success => "success",
        };
        f.write_str(s)
    }
}

impl FromStr for StepId {
    type Err = StepIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "service_selection" => Ok(Self::ServiceSelection),
            "date_selection" => Ok(Self::DateSelection),
            "client_information" => Ok(Self::ClientInformation),
            "confirmation" => Ok(Self::Confirmation),
            "success" => Ok(Self::Success),
            other => Err(StepIdParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`StepId`] string.
#[derive(Debug, Clone)]
pub struct StepIdParseError(pub String);

impl fmt::Display for StepIdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid step id: {:?}", self.0)
    }
}

impl std::error::Error for StepIdParseError {}

// ---------------------------------------------------------------------------
// Closed enums
// ---------------------------------------------------------------------------

/// The kind of consultation being booked.
///
/// Used when deriving the payment-intent request; an incomplete service
/// selection falls back to [`ServiceType::InitialConsultation`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    #[default]
    InitialConsultation,
    AssetTrace,
    RecoveryPlanning,
    FollowUp,
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InitialConsultation => "initial_consultation",
            Self::AssetTrace => "asset_trace",
            Self::RecoveryPlanning => "recovery_planning",
            Self::FollowUp => "follow_up",
        };
        f.write_str(s)
    }
}

impl FromStr for ServiceType {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initial_consultation" => Ok(Self::InitialConsultation),
            "asset_trace" => Ok(Self::AssetTrace),
            "recovery_planning" => Ok(Self::RecoveryPlanning),
            "follow_up" => Ok(Self::FollowUp),
            other => Err(EnumParseError::new("service type", other)),
        }
    }
}

/// How often a recurring booking repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceFrequency {
    Weekly,
    Biweekly,
    Monthly,
}

impl fmt::Display for RecurrenceFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
        };
        f.write_str(s)
    }
}

impl FromStr for RecurrenceFrequency {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Self::Weekly),
            "biweekly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(EnumParseError::new("recurrence frequency", other)),
        }
    }
}

/// The channel a client prefers to be contacted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactMethod {
    Email,
    Phone,
    Text,
}

impl fmt::Display for ContactMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Text => "text",
        };
        f.write_str(s)
    }
}

impl FromStr for ContactMethod {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(Self::Email),
            "phone" => Ok(Self::Phone),
            "text" => Ok(Self::Text),
            other => Err(EnumParseError::new("contact method", other)),
        }
    }
}

/// Accepted payment methods for the confirmation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    BankTransfer,
    Paypal,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Card => "card",
            Self::BankTransfer => "bank_transfer",
            Self::Paypal => "paypal",
        };
        f.write_str(s)
    }
}

impl FromStr for PaymentMethod {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(Self::Card),
            "bank_transfer" => Ok(Self::BankTransfer),
            "paypal" => Ok(Self::Paypal),
            other => Err(EnumParseError::new("payment method", other)),
        }
    }
}

/// Error returned when parsing an invalid enum string.
#[derive(Debug, Clone)]
pub struct EnumParseError {
    kind: &'static str,
    value: String,
}

impl EnumParseError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

impl fmt::Display for EnumParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {:?}", self.kind, self.value)
    }
}

impl std::error::Error for EnumParseError {}

// ---------------------------------------------------------------------------
// Step slices
// ---------------------------------------------------------------------------

/// Data collected on the service-selection step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceSelection {
    /// Identifier of the chosen service (catalog slug).
    pub service_id: String,
    /// Service category, when the catalog entry carries one.
    pub service_type: Option<ServiceType>,
    /// Session length in minutes, when the catalog entry carries one.
    pub duration_minutes: Option<u32>,
    /// Whether the client is booking a recurring series.
    pub is_recurring: bool,
    /// Required when `is_recurring` is set.
    pub frequency: Option<RecurrenceFrequency>,
    /// Number of sessions in the series; required when `is_recurring`.
    pub sessions: Option<u32>,
}

/// Data collected on the date-selection step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DateSelection {
    /// Calendar date in `YYYY-MM-DD` form.
    pub selected_date: String,
    /// Identifier of the chosen time slot.
    pub selected_time_slot: String,
}

/// Data collected on the client-information step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientInfo {
    pub first_name: String,
    pub last_name: String,
    /// Stored trimmed and lower-cased; normalization happens in the
    /// session update API, not in the schema.
    pub email: String,
    pub phone: String,
    pub preferred_contact_method: Option<ContactMethod>,
    /// Must literally be `true` to pass validation.
    pub privacy_policy_accepted: bool,
}

/// Data collected on the confirmation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Confirmation {
    /// Must literally be `true` to pass validation.
    pub details_confirmed: bool,
    /// Must literally be `true` to pass validation.
    pub cancellation_policy_agreed: bool,
    pub payment_method: Option<PaymentMethod>,
    pub promo_code: Option<String>,
    pub special_requests: Option<String>,
    pub receive_reminders: bool,
}

impl Default for Confirmation {
    fn default() -> Self {
        Self {
            details_confirmed: false,
            cancellation_policy_agreed: false,
            payment_method: None,
            promo_code: None,
            special_requests: None,
            // Clients get reminders unless they opt out.
            receive_reminders: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregate state
// ---------------------------------------------------------------------------

/// All data collected for one booking session.
///
/// Created once per session, mutated through
/// [`session::apply`](session::apply), and destroyed on submission or
/// abandonment. Never shared across sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingState {
    pub service: ServiceSelection,
    pub schedule: DateSelection,
    pub client: ClientInfo,
    pub confirmation: Confirmation,
    /// External payment-intent reference. Present once the side-effect
    /// coordinator has created the intent; acts as the idempotency marker.
    pub booking_reference: Option<String>,
}
