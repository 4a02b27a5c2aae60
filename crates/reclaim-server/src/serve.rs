//! JSON API for the booking wizard.
//!
//! A thin adapter over `reclaim-core`: handlers translate HTTP into wizard
//! operations and wizard errors into structured JSON bodies. No validation
//! logic lives here. Error bodies carry a `kind` discriminator so the web
//! client can render field errors inline, payment failures as a banner,
//! and unexpected errors as a generic retry prompt.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use reclaim_core::booking::session::BookingCommand;
use reclaim_core::booking::{
    BookingState, ClientInfo, Confirmation, DateSelection, ServiceSelection,
};
use reclaim_core::payment::PaymentGateway;
use reclaim_core::schema::FieldErrors;
use reclaim_core::step::{self, StepError};
use reclaim_core::StepId;

use crate::store::SessionStore;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SessionStore>,
    pub gateway: Arc<dyn PaymentGateway>,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    kind: &'static str,
    message: String,
    errors: Option<FieldErrors>,
    step: Option<StepId>,
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            kind: "not_found",
            message: msg.into(),
            errors: None,
            step: None,
        }
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            kind: "invalid_state",
            message: msg.into(),
            errors: None,
            step: None,
        }
    }

    fn validation(errors: FieldErrors, step: Option<StepId>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            kind: "validation",
            message: "Please correct the highlighted fields".to_owned(),
            errors: Some(errors),
            step,
        }
    }

    /// Map a wizard error onto the three rendering channels. The payment
    /// and unexpected variants log their detail; the client only sees a
    /// generic message.
    fn from_step_error(err: StepError) -> Self {
        match err {
            StepError::Fields(errors) => Self::validation(errors, None),
            StepError::PaymentSetup(source) => {
                tracing::warn!(error = %source, "payment setup failed");
                Self {
                    status: StatusCode::BAD_GATEWAY,
                    kind: "payment_setup",
                    message: "We could not set up your payment. Please try again.".to_owned(),
                    errors: None,
                    step: None,
                }
            }
            StepError::Complete => {
                Self::invalid_state("this booking is already complete")
            }
            StepError::Unexpected(source) => {
                tracing::error!(error = %source, "unexpected validation error");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    kind: "internal",
                    message: "Something went wrong. Please try again.".to_owned(),
                    errors: None,
                    step: None,
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let mut body = serde_json::json!({
            "kind": self.kind,
            "message": self.message,
        });
        if let Some(errors) = self.errors {
            body["errors"] = serde_json::to_value(errors).unwrap_or_default();
        }
        if let Some(step) = self.step {
            body["step"] = serde_json::json!(step);
        }
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOpened {
    pub session_id: Uuid,
    pub step: StepId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSnapshot {
    pub step: StepId,
    pub step_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    pub state: BookingState,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepStatus {
    pub step: StepId,
    pub step_valid: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldCheckRequest {
    pub step: StepId,
    pub field: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct FieldCheckResponse {
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoToRequest {
    pub step: StepId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceResponse {
    pub step: StepId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_reference: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub step: StepId,
    pub booking_reference: String,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/bookings", post(create_booking))
        .route("/api/bookings/{id}", get(get_booking))
        .route("/api/bookings/{id}/service", put(put_service))
        .route("/api/bookings/{id}/schedule", put(put_schedule))
        .route("/api/bookings/{id}/client", put(put_client))
        .route("/api/bookings/{id}/confirmation", put(put_confirmation))
        .route("/api/bookings/{id}/field-check", post(field_check))
        .route("/api/bookings/{id}/advance", post(advance))
        .route("/api/bookings/{id}/back", post(back))
        .route("/api/bookings/{id}/go-to", post(go_to))
        .route("/api/bookings/{id}/submit", post(submit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(state: AppState, bind: &str, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("reclaim serving on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("reclaim shut down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn create_booking(State(state): State<AppState>) -> Json<SessionOpened> {
    let session_id = state.store.create().await;
    Json(SessionOpened {
        session_id,
        step: StepId::ServiceSelection,
    })
}

async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingSnapshot>, AppError> {
    let wizard = state
        .store
        .get(id)
        .await
        .ok_or_else(|| AppError::not_found(format!("booking session {id} not found")))?;

    Ok(Json(BookingSnapshot {
        step: wizard.current_step(),
        step_valid: wizard.is_current_step_valid(),
        errors: wizard.current_step_errors(),
        state: wizard.state().clone(),
    }))
}

async fn apply_command(
    state: &AppState,
    id: Uuid,
    command: BookingCommand,
) -> Result<Json<StepStatus>, AppError> {
    state
        .store
        .update(id, |wizard| {
            wizard.apply(command);
            StepStatus {
                step: wizard.current_step(),
                step_valid: wizard.is_current_step_valid(),
            }
        })
        .await
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("booking session {id} not found")))
}

async fn put_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(slice): Json<ServiceSelection>,
) -> Result<Json<StepStatus>, AppError> {
    apply_command(&state, id, BookingCommand::SelectService(slice)).await
}

async fn put_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(slice): Json<DateSelection>,
) -> Result<Json<StepStatus>, AppError> {
    apply_command(&state, id, BookingCommand::SelectSchedule(slice)).await
}

async fn put_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(slice): Json<ClientInfo>,
) -> Result<Json<StepStatus>, AppError> {
    apply_command(&state, id, BookingCommand::SetClientInfo(slice)).await
}

async fn put_confirmation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(slice): Json<Confirmation>,
) -> Result<Json<StepStatus>, AppError> {
    apply_command(&state, id, BookingCommand::SetConfirmation(slice)).await
}

async fn field_check(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<FieldCheckRequest>,
) -> Result<Json<FieldCheckResponse>, AppError> {
    // The check itself is stateless, but an unknown session is still a 404
    // so clients notice expired sessions early.
    if state.store.get(id).await.is_none() {
        return Err(AppError::not_found(format!(
            "booking session {id} not found"
        )));
    }

    let message = step::check_step_field(request.step, &request.field, request.value)
        .map_err(AppError::from_step_error)?;
    Ok(Json(FieldCheckResponse { message }))
}

async fn advance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AdvanceResponse>, AppError> {
    // Lock only this session across the gateway call; other sessions and
    // the store stay responsive while the provider is slow.
    let session = state
        .store
        .session(id)
        .await
        .ok_or_else(|| AppError::not_found(format!("booking session {id} not found")))?;
    let mut wizard = session.lock().await;

    let step = wizard
        .advance(state.gateway.as_ref())
        .await
        .map_err(AppError::from_step_error)?;

    Ok(Json(AdvanceResponse {
        step,
        booking_reference: wizard.state().booking_reference.clone(),
    }))
}

async fn back(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StepStatus>, AppError> {
    state
        .store
        .update(id, |wizard| {
            let step = wizard.back();
            StepStatus {
                step,
                step_valid: wizard.is_current_step_valid(),
            }
        })
        .await
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("booking session {id} not found")))
}

/// Jump directly to an already-visited step, e.g. from a progress bar.
/// Forward jumps would bypass the step gate, so they are refused.
async fn go_to(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<GoToRequest>,
) -> Result<Json<StepStatus>, AppError> {
    state
        .store
        .update(id, |wizard| {
            if wizard.go_back_to(request.step) {
                Ok(StepStatus {
                    step: wizard.current_step(),
                    step_valid: wizard.is_current_step_valid(),
                })
            } else {
                Err(AppError::invalid_state(
                    "only steps you have already completed can be jumped to",
                ))
            }
        })
        .await
        .ok_or_else(|| AppError::not_found(format!("booking session {id} not found")))?
        .map(Json)
}

async fn submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubmitResponse>, AppError> {
    let session = state
        .store
        .session(id)
        .await
        .ok_or_else(|| AppError::not_found(format!("booking session {id} not found")))?;
    let mut wizard = session.lock().await;

    // Pre-submission sweep: catch earlier data that went stale. On
    // failure the wizard is already parked at the first invalid step.
    if !wizard.validate_and_navigate_to_first_invalid_step() {
        let step = wizard.current_step();
        let errors = wizard.current_step_errors().unwrap_or_default();
        tracing::warn!(session_id = %id, step = %step, "submission blocked by invalid step");
        return Err(AppError::validation(errors, Some(step)));
    }

    if wizard.current_step() != StepId::Confirmation {
        return Err(AppError::invalid_state(
            "submission is only possible from the confirmation step",
        ));
    }

    wizard
        .advance(state.gateway.as_ref())
        .await
        .map_err(AppError::from_step_error)?;

    let booking_reference = wizard
        .state()
        .booking_reference
        .clone()
        .ok_or_else(|| {
            AppError::from_step_error(StepError::Unexpected(anyhow::anyhow!(
                "completed booking has no reference"
            )))
        })?;

    // The session is done; drop it.
    drop(wizard);
    state.store.remove(id).await;
    tracing::info!(session_id = %id, reference = %booking_reference, "booking submitted");

    Ok(Json(SubmitResponse {
        step: StepId::Success,
        booking_reference,
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use chrono::{Days, Local};
    use tower::ServiceExt;

    use reclaim_core::payment::{
        PaymentError, PaymentIntent, PaymentIntentRequest,
    };

    use crate::gateway::MockPaymentGateway;

    use super::*;

    struct FailingGateway;

    #[async_trait]
    impl PaymentGateway for FailingGateway {
        fn name(&self) -> &str {
            "failing"
        }

        async fn create_payment_intent(
            &self,
            _request: &PaymentIntentRequest,
        ) -> Result<PaymentIntent, PaymentError> {
            Err(PaymentError::Provider("simulated outage".to_owned()))
        }
    }

    fn test_state(gateway: Arc<dyn PaymentGateway>) -> AppState {
        AppState {
            store: Arc::new(SessionStore::new()),
            gateway,
        }
    }

    // -----------------------------------------------------------------------
    // HTTP helpers
    // -----------------------------------------------------------------------

    async fn send(
        state: &AppState,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let app = build_router(state.clone());
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1_048_576)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn open_session(state: &AppState) -> String {
        let (status, json) = send(state, "POST", "/api/bookings", None).await;
        assert_eq!(status, StatusCode::OK);
        json["sessionId"].as_str().unwrap().to_owned()
    }

    fn future_date() -> String {
        (Local::now().date_naive() + Days::new(3))
            .format("%Y-%m-%d")
            .to_string()
    }

    fn valid_client_json() -> serde_json::Value {
        serde_json::json!({
            "firstName": "Maria",
            "lastName": "Keller",
            "email": "maria.keller@example.com",
            "phone": "+49 30 901820",
            "preferredContactMethod": "email",
            "privacyPolicyAccepted": true,
        })
    }

    fn valid_confirmation_json() -> serde_json::Value {
        serde_json::json!({
            "detailsConfirmed": true,
            "cancellationPolicyAgreed": true,
            "paymentMethod": "card",
        })
    }

    /// Drive a session to the confirmation step with valid data.
    async fn session_at_confirmation(state: &AppState) -> String {
        let id = open_session(state).await;

        let (status, _) = send(
            state,
            "PUT",
            &format!("/api/bookings/{id}/service"),
            Some(serde_json::json!({"serviceId": "initial-consultation"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(state, "POST", &format!("/api/bookings/{id}/advance"), None).await;
        assert_eq!(status, StatusCode::OK);

        send(
            state,
            "PUT",
            &format!("/api/bookings/{id}/schedule"),
            Some(serde_json::json!({
                "selectedDate": future_date(),
                "selectedTimeSlot": "slot-1030",
            })),
        )
        .await;
        send(state, "POST", &format!("/api/bookings/{id}/advance"), None).await;

        send(
            state,
            "PUT",
            &format!("/api/bookings/{id}/client"),
            Some(valid_client_json()),
        )
        .await;
        send(state, "POST", &format!("/api/bookings/{id}/advance"), None).await;

        send(
            state,
            "PUT",
            &format!("/api/bookings/{id}/confirmation"),
            Some(valid_confirmation_json()),
        )
        .await;

        id
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn open_and_snapshot_a_session() {
        let state = test_state(Arc::new(MockPaymentGateway));
        let id = open_session(&state).await;

        let (status, json) = send(&state, "GET", &format!("/api/bookings/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["step"], "service_selection");
        assert_eq!(json["stepValid"], false);
        assert!(json["errors"].get("serviceId").is_some());
    }

    #[tokio::test]
    async fn unknown_session_is_404_with_kind() {
        let state = test_state(Arc::new(MockPaymentGateway));
        let id = Uuid::new_v4();
        let (status, json) = send(&state, "GET", &format!("/api/bookings/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["kind"], "not_found");
    }

    #[tokio::test]
    async fn advance_with_invalid_step_returns_field_errors() {
        let state = test_state(Arc::new(MockPaymentGateway));
        let id = open_session(&state).await;

        let (status, json) =
            send(&state, "POST", &format!("/api/bookings/{id}/advance"), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["kind"], "validation");
        assert_eq!(json["errors"]["serviceId"], "Please select a service");
    }

    #[tokio::test]
    async fn field_check_gives_live_feedback() {
        let state = test_state(Arc::new(MockPaymentGateway));
        let id = open_session(&state).await;

        let (status, json) = send(
            &state,
            "POST",
            &format!("/api/bookings/{id}/field-check"),
            Some(serde_json::json!({
                "step": "confirmation",
                "field": "promoCode",
                "value": "X".repeat(22),
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Promo code must be at most 21 characters");

        let (_, json) = send(
            &state,
            "POST",
            &format!("/api/bookings/{id}/field-check"),
            Some(serde_json::json!({
                "step": "confirmation",
                "field": "promoCode",
                "value": "X".repeat(21),
            })),
        )
        .await;
        assert_eq!(json["message"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn full_flow_submits_and_closes_the_session() {
        let state = test_state(Arc::new(MockPaymentGateway));
        let id = session_at_confirmation(&state).await;

        let (status, json) =
            send(&state, "POST", &format!("/api/bookings/{id}/submit"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["step"], "success");
        assert!(
            json["bookingReference"]
                .as_str()
                .unwrap()
                .starts_with("RC-")
        );

        // Session is destroyed on submission.
        let (status, _) = send(&state, "GET", &format!("/api/bookings/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn submit_with_stale_earlier_step_redirects_to_it() {
        let state = test_state(Arc::new(MockPaymentGateway));
        let id = session_at_confirmation(&state).await;

        // Invalidate the schedule after the fact.
        send(
            &state,
            "PUT",
            &format!("/api/bookings/{id}/schedule"),
            Some(serde_json::json!({"selectedDate": "", "selectedTimeSlot": ""})),
        )
        .await;

        let (status, json) =
            send(&state, "POST", &format!("/api/bookings/{id}/submit"), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["kind"], "validation");
        assert_eq!(json["step"], "date_selection");
        assert!(json["errors"].get("selectedDate").is_some());

        // The session pointer moved to the failing step.
        let (_, json) = send(&state, "GET", &format!("/api/bookings/{id}"), None).await;
        assert_eq!(json["step"], "date_selection");
    }

    #[tokio::test]
    async fn payment_outage_is_a_distinct_error_kind() {
        let state = test_state(Arc::new(FailingGateway));
        let id = session_at_confirmation(&state).await;

        let (status, json) =
            send(&state, "POST", &format!("/api/bookings/{id}/submit"), None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["kind"], "payment_setup");

        // Still on confirmation; the session survives for a retry.
        let (_, json) = send(&state, "GET", &format!("/api/bookings/{id}"), None).await;
        assert_eq!(json["step"], "confirmation");
    }

    #[tokio::test]
    async fn advance_past_completion_is_a_conflict() {
        let state = test_state(Arc::new(MockPaymentGateway));
        let id = session_at_confirmation(&state).await;

        let (status, json) =
            send(&state, "POST", &format!("/api/bookings/{id}/advance"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["step"], "success");

        let (status, json) =
            send(&state, "POST", &format!("/api/bookings/{id}/advance"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["kind"], "invalid_state");
    }

    #[tokio::test]
    async fn go_to_jumps_back_but_never_forward() {
        let state = test_state(Arc::new(MockPaymentGateway));
        let id = session_at_confirmation(&state).await;

        let (status, json) = send(
            &state,
            "POST",
            &format!("/api/bookings/{id}/go-to"),
            Some(serde_json::json!({"step": "service_selection"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["step"], "service_selection");
        assert_eq!(json["stepValid"], true);

        // Jumping ahead again would skip the gate.
        let (status, json) = send(
            &state,
            "POST",
            &format!("/api/bookings/{id}/go-to"),
            Some(serde_json::json!({"step": "client_information"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["kind"], "invalid_state");

        // The refused jump left the pointer alone.
        let (_, json) = send(&state, "GET", &format!("/api/bookings/{id}"), None).await;
        assert_eq!(json["step"], "service_selection");
    }

    #[tokio::test]
    async fn back_navigates_without_validation() {
        let state = test_state(Arc::new(MockPaymentGateway));
        let id = session_at_confirmation(&state).await;

        let (status, json) =
            send(&state, "POST", &format!("/api/bookings/{id}/back"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["step"], "client_information");
    }

    #[tokio::test]
    async fn email_is_normalized_on_write() {
        let state = test_state(Arc::new(MockPaymentGateway));
        let id = open_session(&state).await;

        let mut client = valid_client_json();
        client["email"] = serde_json::json!("  Maria.Keller@Example.COM ");
        send(
            &state,
            "PUT",
            &format!("/api/bookings/{id}/client"),
            Some(client),
        )
        .await;

        let (_, json) = send(&state, "GET", &format!("/api/bookings/{id}"), None).await;
        assert_eq!(
            json["state"]["client"]["email"],
            "maria.keller@example.com"
        );
    }
}
