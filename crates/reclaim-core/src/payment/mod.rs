//! Payment-intent gateway interface.
//!
//! The gateway is the only place the wizard core touches the network. It is
//! an object-safe trait so the serving layer can hand the navigator a
//! `&dyn PaymentGateway` backed by a real provider or a test double.

pub mod coordinator;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::booking::{ServiceSelection, ServiceType};

/// Session length used when the selected service carries no duration.
pub const DEFAULT_DURATION_MINUTES: u32 = 60;

/// Errors from the external payment provider.
///
/// Kept distinct from field-validation errors: a payment failure keeps the
/// client on the confirmation step with a banner, not a field message.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment provider request failed: {0}")]
    Provider(String),
    #[error("payment provider returned a malformed response: {0}")]
    MalformedResponse(String),
}

/// What the wizard asks the provider to set up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRequest {
    pub service_type: ServiceType,
    pub duration_minutes: u32,
}

impl PaymentIntentRequest {
    /// Derive a request from the selected service, falling back to the
    /// documented defaults when the selection is incomplete.
    pub fn from_service(service: &ServiceSelection) -> Self {
        Self {
            service_type: service.service_type.unwrap_or_default(),
            duration_minutes: service.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES),
        }
    }
}

/// The provider's record of an initiated payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    /// Reference the booking is tracked under; stored on the session as
    /// the idempotency marker.
    pub booking_reference: String,
    /// Provider secret the web client needs to complete the payment.
    pub client_secret: Option<String>,
}

/// Adapter interface for payment providers.
///
/// Errors are propagated, not swallowed; the coordinator decides what a
/// failure means for the booking session.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Human-readable provider name for logs.
    fn name(&self) -> &str;

    /// Create a payment intent for one booking.
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentError>;
}

// Compile-time assertion: PaymentGateway must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn PaymentGateway) {}
};
