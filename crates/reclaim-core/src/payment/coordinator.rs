//! Create-if-absent coordination of the payment intent.
//!
//! Guarantees at most one intent creation per booking session: the stored
//! `booking_reference` is the idempotency marker. The check is not atomic
//! against concurrent calls on the same session; callers debounce the
//! triggering control.

use crate::booking::BookingState;

use super::{PaymentError, PaymentGateway, PaymentIntentRequest};

/// Ensure the session has a payment intent, creating one if absent.
///
/// No-op when `state.booking_reference` is already set. On creation
/// failure the state is left untouched and the error propagates; the
/// session stays on the confirmation step.
pub async fn ensure_payment_intent(
    state: &mut BookingState,
    gateway: &dyn PaymentGateway,
) -> Result<(), PaymentError> {
    if let Some(reference) = &state.booking_reference {
        tracing::debug!(reference = %reference, "payment intent already exists");
        return Ok(());
    }

    let request = PaymentIntentRequest::from_service(&state.service);
    tracing::info!(
        gateway = gateway.name(),
        service_type = %request.service_type,
        duration_minutes = request.duration_minutes,
        "creating payment intent"
    );

    let intent = gateway.create_payment_intent(&request).await?;
    tracing::info!(reference = %intent.booking_reference, "payment intent created");
    state.booking_reference = Some(intent.booking_reference);
    Ok(())
}
