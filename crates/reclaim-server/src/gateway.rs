//! Payment gateway implementations.
//!
//! [`HttpPaymentGateway`] talks to a real provider over JSON;
//! [`MockPaymentGateway`] fabricates references for local development and
//! tests. Both are handed to the core as `Arc<dyn PaymentGateway>`.

use async_trait::async_trait;
use reqwest::StatusCode;
use uuid::Uuid;

use reclaim_core::payment::{
    PaymentError, PaymentGateway, PaymentIntent, PaymentIntentRequest,
};

// ---------------------------------------------------------------------------
// HTTP provider
// ---------------------------------------------------------------------------

/// Gateway backed by the payment provider's HTTP API.
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpPaymentGateway {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key,
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    fn name(&self) -> &str {
        "http"
    }

    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentError> {
        let url = format!("{}/v1/payment-intents", self.base_url);
        let mut builder = self.client.post(&url).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| PaymentError::Provider(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %body, "payment provider rejected intent");
            return Err(PaymentError::Provider(format!(
                "provider returned {status}"
            )));
        }

        response
            .json::<PaymentIntent>()
            .await
            .map_err(|e| PaymentError::MalformedResponse(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Mock provider
// ---------------------------------------------------------------------------

/// Gateway that fabricates booking references without any network I/O.
#[derive(Debug, Default)]
pub struct MockPaymentGateway;

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    fn name(&self) -> &str {
        "mock"
    }

    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentError> {
        let token = Uuid::new_v4().simple().to_string();
        let reference = format!("RC-{}", token[..8].to_uppercase());
        tracing::debug!(
            reference = %reference,
            service_type = %request.service_type,
            "mock payment intent created"
        );
        Ok(PaymentIntent {
            booking_reference: reference,
            client_secret: None,
        })
    }
}
