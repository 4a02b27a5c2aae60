//! Core engine for the consultation-booking wizard.
//!
//! The wizard collects a booking across four steps (service, date, client
//! information, confirmation) and gates forward navigation on per-step
//! validation. This crate owns the step schemas, the step validator, the
//! navigator, and the payment-intent coordinator; rendering and transport
//! live elsewhere.

pub mod booking;
pub mod payment;
pub mod schema;
pub mod step;

pub use booking::session::BookingCommand;
pub use booking::{BookingState, StepId};
pub use payment::{PaymentError, PaymentGateway, PaymentIntent, PaymentIntentRequest};
pub use schema::FieldErrors;
pub use step::navigator::{BookingWizard, SweepFailure};
pub use step::StepError;
