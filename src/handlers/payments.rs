use actix_web::{HttpRequest, HttpResponse, web};
use sea_orm::DatabaseConnection;

use crate::auth::AuthenticatedUser;
use crate::config::PaymentConfig;
use crate::error::AppError;
use crate::models::payments::CreateIntentRequest;
use crate::payments::PaymentProvider;
use crate::payments::webhook::{self, SIGNATURE_HEADER, WebhookEvent};
use crate::services::payments;

/// POST /api/payments/create-intent — create a provider intent for a
/// milestone's payment.
pub async fn create_intent(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    provider: web::Data<dyn PaymentProvider>,
    body: web::Json<CreateIntentRequest>,
) -> Result<HttpResponse, AppError> {
    let CreateIntentRequest {
        milestone_id,
        amount,
    } = body.into_inner();

    let secret = payments::create_payment_intent(
        db.get_ref(),
        provider.get_ref(),
        &user.actor(),
        milestone_id,
        amount,
    )
    .await?;
    Ok(HttpResponse::Ok().json(secret))
}

/// POST /api/payments/webhook — payment provider callbacks.
///
/// Unauthenticated; trust comes from the signature header. Events this
/// service does not track are acknowledged so the provider stops retrying.
pub async fn webhook(
    req: HttpRequest,
    db: web::Data<DatabaseConnection>,
    config: web::Data<PaymentConfig>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let header = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Validation(format!("Missing {SIGNATURE_HEADER} header")))?;

    let now = chrono::Utc::now().timestamp();
    webhook::verify_signature(&config.webhook_secret, &body, header, now).map_err(|e| {
        tracing::warn!("Rejected webhook: {e}");
        AppError::Validation("Invalid webhook signature".to_string())
    })?;

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("Invalid webhook payload: {e}")))?;

    match webhook::classify(&event) {
        Some(update) => {
            payments::confirm_payment(db.get_ref(), &update.handles, update.status).await?;
        }
        None => tracing::debug!(event_type = %event.event_type, "Ignoring webhook event"),
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({ "received": true })))
}
