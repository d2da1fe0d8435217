use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

use crate::models::payments::PaymentStatus;

/// Header carrying `t=<unix>,v1=<hex hmac>[,v1=...]`.
pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Maximum age of a signed event.
pub const TOLERANCE_SECS: i64 = 300;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("signature header has no timestamp")]
    MissingTimestamp,
    #[error("signature header has no v1 signatures")]
    MissingSignature,
    #[error("signature does not match payload")]
    Mismatch,
    #[error("signature timestamp outside tolerance")]
    Expired,
}

/// Verify a signature header against the raw request body.
///
/// The signed message is `"{timestamp}.{body}"`; any one matching `v1`
/// entry is enough.
pub fn verify_signature(
    secret: &str,
    payload: &[u8],
    header: &str,
    now: i64,
) -> Result<(), WebhookError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(WebhookError::MissingTimestamp)?;
    if signatures.is_empty() {
        return Err(WebhookError::MissingSignature);
    }

    let matched = signatures.iter().any(|sig| {
        let Ok(expected) = hex::decode(sig) else {
            return false;
        };
        match signed_mac(secret, timestamp, payload) {
            Ok(mac) => mac.verify_slice(&expected).is_ok(),
            Err(_) => false,
        }
    });

    if !matched {
        return Err(WebhookError::Mismatch);
    }

    if (now - timestamp).abs() > TOLERANCE_SECS {
        return Err(WebhookError::Expired);
    }

    Ok(())
}

/// Build a signature header for `payload`, the way the provider does.
pub fn signature_header(
    secret: &str,
    payload: &[u8],
    timestamp: i64,
) -> Result<String, InvalidLength> {
    let mac = signed_mac(secret, timestamp, payload)?;
    let signature = hex::encode(mac.finalize().into_bytes());
    Ok(format!("t={timestamp},v1={signature}"))
}

fn signed_mac(secret: &str, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: EventObject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventObject {
    pub id: String,
    /// Set on checkout sessions once an intent exists.
    pub payment_intent: Option<String>,
}

/// A payment status change reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderUpdate {
    /// Identifiers the payment may be stored under, most specific first.
    pub handles: Vec<String>,
    pub status: PaymentStatus,
}

/// Map a provider event to a payment status change; `None` for events this
/// service does not track.
pub fn classify(event: &WebhookEvent) -> Option<ProviderUpdate> {
    let object = &event.data.object;
    match event.event_type.as_str() {
        "payment_intent.processing" => Some(ProviderUpdate {
            handles: vec![object.id.clone()],
            status: PaymentStatus::Processing,
        }),
        "payment_intent.succeeded" => Some(ProviderUpdate {
            handles: vec![object.id.clone()],
            status: PaymentStatus::Completed,
        }),
        "checkout.session.completed" => {
            let mut handles = Vec::with_capacity(2);
            if let Some(intent) = &object.payment_intent {
                handles.push(intent.clone());
            }
            handles.push(object.id.clone());
            Some(ProviderUpdate {
                handles,
                status: PaymentStatus::Completed,
            })
        }
        _ => None,
    }
}
