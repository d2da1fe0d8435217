use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{
    CheckoutRequest, CheckoutSession, PaymentError, PaymentIntent, PaymentIntentRequest,
    PaymentProvider,
};
use crate::config::PaymentConfig;

/// HTTP client for a Stripe-compatible payments API (form-encoded requests,
/// bearer secret key).
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    config: PaymentConfig,
}

#[derive(Deserialize)]
struct CheckoutSessionResponse {
    id: String,
    url: Option<String>,
    payment_intent: Option<String>,
}

#[derive(Deserialize)]
struct PaymentIntentResponse {
    id: String,
    client_secret: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl StripeClient {
    pub fn new(config: PaymentConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    async fn post_form<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, PaymentError> {
        let url = format!("{}{}", self.config.api_base.trim_end_matches('/'), path);
        debug!("POST {url}");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.secret_key)
            .form(params)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or(text);
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| PaymentError::InvalidResponse(e.to_string()))
    }

    fn checkout_params(&self, request: &CheckoutRequest) -> Vec<(String, String)> {
        let base = self.config.app_base_url.trim_end_matches('/');
        let return_to = format!("{base}/contracts/{}", request.contract_id);

        vec![
            ("mode".into(), "payment".into()),
            (
                "line_items[0][price_data][currency]".into(),
                self.config.currency.clone(),
            ),
            (
                "line_items[0][price_data][unit_amount]".into(),
                request.amount_minor.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".into(),
                request.description.clone(),
            ),
            ("line_items[0][quantity]".into(), "1".into()),
            (
                "metadata[milestone_id]".into(),
                request.milestone_id.to_string(),
            ),
            (
                "metadata[contract_id]".into(),
                request.contract_id.to_string(),
            ),
            (
                "success_url".into(),
                format!("{return_to}?payment=success"),
            ),
            (
                "cancel_url".into(),
                format!("{return_to}?payment=cancelled"),
            ),
        ]
    }

    fn intent_params(&self, request: &PaymentIntentRequest) -> Vec<(String, String)> {
        let mut params = vec![
            ("amount".to_string(), request.amount_minor.to_string()),
            ("currency".to_string(), self.config.currency.clone()),
            (
                "capture_method".to_string(),
                request.capture.as_str().to_string(),
            ),
            (
                "automatic_payment_methods[enabled]".to_string(),
                "true".to_string(),
            ),
        ];
        for (key, value) in &request.metadata {
            params.push((format!("metadata[{key}]"), value.clone()));
        }
        params
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let params = self.checkout_params(&request);
        let session: CheckoutSessionResponse =
            self.post_form("/v1/checkout/sessions", &params).await?;

        let url = session.url.ok_or_else(|| {
            PaymentError::InvalidResponse("checkout session has no url".to_string())
        })?;

        Ok(CheckoutSession {
            id: session.id,
            url,
            payment_intent: session.payment_intent,
        })
    }

    async fn create_payment_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentError> {
        let params = self.intent_params(&request);
        let intent: PaymentIntentResponse = self.post_form("/v1/payment_intents", &params).await?;

        let client_secret = intent.client_secret.ok_or_else(|| {
            PaymentError::InvalidResponse("payment intent has no client_secret".to_string())
        })?;

        Ok(PaymentIntent {
            id: intent.id,
            client_secret,
        })
    }
}
