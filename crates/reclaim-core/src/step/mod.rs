//! Step validator: maps a [`StepId`] to its schema and runs it against the
//! relevant slice of the booking state.
//!
//! Every operation that needs to know whether a step is valid -- the pure
//! probe, the effectful "Continue" validation, and the pre-submission sweep
//! -- goes through [`check_step`], so there is exactly one source of truth
//! per step and the three call sites cannot drift apart.

pub mod navigator;

use thiserror::Error;

use crate::booking::{BookingState, StepId};
use crate::payment::coordinator::ensure_payment_intent;
use crate::payment::{PaymentError, PaymentGateway};
use crate::schema::{self, FieldErrors};

/// How a step validation can fail.
///
/// The three variants are distinct channels and callers must not conflate
/// them when rendering: field errors are shown inline per field, a payment
/// setup failure is a banner that keeps the client on the confirmation
/// step, and unexpected errors get a generic "try again" with the detail
/// going to the logs only.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("one or more fields failed validation")]
    Fields(FieldErrors),
    #[error("payment setup failed")]
    PaymentSetup(#[source] PaymentError),
    /// The wizard is at the terminal step and cannot move forward. A
    /// client-state problem, not a server fault.
    #[error("the booking wizard is already complete")]
    Complete,
    #[error("unexpected validation error")]
    Unexpected(#[source] anyhow::Error),
}

impl StepError {
    /// The field error map, when this is a field-validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Fields(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Run the schema for `step` against its slice of `state`.
///
/// Pure and side-effect free: safe to call from UI-enablement probes. The
/// confirmation check here is schema-only; the payment-intent requirement
/// is enforced by [`validate_step`]. `success` has no schema and is always
/// valid.
pub fn check_step(step: StepId, state: &BookingState) -> Result<(), FieldErrors> {
    match step {
        StepId::ServiceSelection => schema::service::schema().validate(&state.service),
        StepId::DateSelection => schema::date::schema().validate(&state.schedule),
        StepId::ClientInformation => schema::client_info::schema().validate(&state.client),
        StepId::Confirmation => schema::confirmation::schema().validate(&state.confirmation),
        StepId::Success => Ok(()),
    }
}

/// Validate a single field of `step` in isolation, for live feedback.
///
/// Schema-machinery failures surface as [`StepError::Unexpected`]; a field
/// message (or none) is the normal outcome either way.
pub fn check_step_field(
    step: StepId,
    field: &str,
    value: serde_json::Value,
) -> Result<Option<String>, StepError> {
    let result = match step {
        StepId::ServiceSelection => schema::service::schema().validate_field(field, value),
        StepId::DateSelection => schema::date::schema().validate_field(field, value),
        StepId::ClientInformation => schema::client_info::schema().validate_field(field, value),
        StepId::Confirmation => schema::confirmation::schema().validate_field(field, value),
        StepId::Success => Ok(None),
    };
    result.map_err(|e| StepError::Unexpected(anyhow::Error::new(e)))
}

/// Validate `step` with side effects permitted.
///
/// For the confirmation step this first ensures a payment intent exists
/// (creating one through the gateway if absent) and only then evaluates the
/// schema; a creation failure is reported as [`StepError::PaymentSetup`]
/// and leaves the state untouched. All other steps behave exactly like
/// [`check_step`].
pub async fn validate_step(
    step: StepId,
    state: &mut BookingState,
    gateway: &dyn PaymentGateway,
) -> Result<(), StepError> {
    if step == StepId::Confirmation {
        ensure_payment_intent(state, gateway)
            .await
            .map_err(StepError::PaymentSetup)?;
    }
    check_step(step, state).map_err(StepError::Fields)
}
