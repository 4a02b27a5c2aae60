//! Reducer-style update API for [`BookingState`].
//!
//! All mutation of a booking session flows through [`apply`], so the step
//! schemas stay pure functions of their input and every normalization rule
//! (e.g. email casing) lives in exactly one place.

use serde::{Deserialize, Serialize};

use super::{BookingState, ClientInfo, Confirmation, DateSelection, ServiceSelection};

/// A single mutation of the booking session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "command", content = "payload", rename_all = "snake_case")]
pub enum BookingCommand {
    SelectService(ServiceSelection),
    SelectSchedule(DateSelection),
    SetClientInfo(ClientInfo),
    SetConfirmation(Confirmation),
    /// Recorded by the side-effect coordinator once a payment intent
    /// exists. Overwriting an existing reference is not permitted.
    SetBookingReference(String),
    /// Discard all collected data and start over.
    Reset,
}

/// Apply one command to the session state.
pub fn apply(state: &mut BookingState, command: BookingCommand) {
    match command {
        BookingCommand::SelectService(service) => {
            state.service = service;
        }
        BookingCommand::SelectSchedule(schedule) => {
            state.schedule = schedule;
        }
        BookingCommand::SetClientInfo(mut client) => {
            client.email = normalize_email(&client.email);
            state.client = client;
        }
        BookingCommand::SetConfirmation(confirmation) => {
            state.confirmation = confirmation;
        }
        BookingCommand::SetBookingReference(reference) => {
            if state.booking_reference.is_some() {
                tracing::warn!(
                    reference = %reference,
                    "ignoring booking reference: session already has one"
                );
                return;
            }
            state.booking_reference = Some(reference);
        }
        BookingCommand::Reset => {
            *state = BookingState::default();
        }
    }
}

/// Trim and lower-case an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
