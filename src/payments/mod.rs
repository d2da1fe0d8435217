//! Port to the hosted escrow payment provider.
//!
//! The lifecycle services only see [`PaymentProvider`]; production wires in
//! [`stripe::StripeClient`], tests wire in a fake.

pub mod stripe;
pub mod webhook;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("request to payment provider failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("payment provider returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("unexpected payment provider response: {0}")]
    InvalidResponse(String),
}

/// A hosted checkout page for paying one milestone.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub amount_minor: i64,
    pub description: String,
    pub contract_id: Uuid,
    pub milestone_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
    /// Present when the provider allocates the intent up front.
    pub payment_intent: Option<String>,
}

impl CheckoutSession {
    /// The identifier webhooks will later refer to.
    pub fn tracking_id(&self) -> String {
        self.payment_intent.clone().unwrap_or_else(|| self.id.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMethod {
    /// Charge as soon as the customer confirms.
    Automatic,
    /// Authorize and hold the funds until captured.
    Manual,
}

impl CaptureMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureMethod::Automatic => "automatic",
            CaptureMethod::Manual => "manual",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaymentIntentRequest {
    pub amount_minor: i64,
    pub capture: CaptureMethod,
    pub metadata: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError>;

    async fn create_payment_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentError>;
}

/// Convert a decimal currency amount into integer minor units (cents).
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}
