use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use uuid::Uuid;

use crate::auth::Actor;
use crate::auth::authorization::verify_contract_client;
use crate::db::{
    contracts as contract_db, invoices as invoice_db, milestones as milestone_db,
    payments as payment_db,
};
use crate::error::{AppError, AppResult};
use crate::models::payments::{self, EscrowSecret, IntentSecret, PaymentRedirect, PaymentStatus};
use crate::payments::{
    CaptureMethod, CheckoutRequest, PaymentIntentRequest, PaymentProvider, to_minor_units,
};

use super::invoices::invoice_number;
use super::notifications::notify;
use super::positive_amount;

/// Start a hosted checkout for a milestone. Client only.
///
/// The payment row always carries the milestone's amount. A Pending payment
/// is pointed at the new checkout session; a Processing one has a provider
/// charge in flight and is refused.
pub async fn request_payment<C: ConnectionTrait>(
    db: &C,
    provider: &dyn PaymentProvider,
    actor: &Actor,
    milestone_id: Uuid,
) -> AppResult<PaymentRedirect> {
    let milestone = milestone_db::get_milestone_by_id(db, milestone_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Milestone {milestone_id} not found")))?;
    let contract = verify_contract_client(db, milestone.contract_id, actor).await?;

    let existing = payment_db::get_payment_by_milestone(db, milestone_id).await?;
    match existing.as_ref().map(|p| p.status) {
        Some(PaymentStatus::Completed) => {
            return Err(AppError::Conflict(
                "This milestone has already been paid".to_string(),
            ));
        }
        Some(PaymentStatus::Processing) => {
            return Err(AppError::Conflict(
                "A payment for this milestone is already processing".to_string(),
            ));
        }
        _ => {}
    }

    let amount_minor = to_minor_units(milestone.amount);
    if amount_minor <= 0 {
        return Err(AppError::Validation(
            "Milestone amount must be greater than zero".to_string(),
        ));
    }

    let session = provider
        .create_checkout_session(CheckoutRequest {
            amount_minor,
            description: format!("Milestone: {}", milestone.title),
            contract_id: contract.id,
            milestone_id,
        })
        .await?;

    let payment = match existing {
        Some(payment) => {
            payment_db::reset_payment(db, payment, milestone.amount, session.tracking_id()).await?
        }
        None => {
            payment_db::insert_payment(
                db,
                milestone_id,
                contract.id,
                milestone.amount,
                session.tracking_id(),
            )
            .await?
        }
    };

    tracing::info!(payment_id = %payment.id, %milestone_id, amount_minor, "Checkout session created");

    Ok(PaymentRedirect {
        url: session.url.clone(),
        redirect_url: session.url,
    })
}

/// Create a provider intent for an existing milestone payment and mark it
/// Processing. Client only. `amount` must match the payment's amount to the
/// minor unit.
pub async fn create_payment_intent<C: ConnectionTrait>(
    db: &C,
    provider: &dyn PaymentProvider,
    actor: &Actor,
    milestone_id: Uuid,
    amount: f64,
) -> AppResult<IntentSecret> {
    let payment = payment_db::get_payment_by_milestone(db, milestone_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No payment found for milestone {milestone_id}"))
        })?;
    verify_contract_client(db, payment.contract_id, actor).await?;

    let amount = positive_amount(Some(amount), "amount")?;
    if payment.status == PaymentStatus::Completed {
        return Err(AppError::Conflict(
            "This milestone has already been paid".to_string(),
        ));
    }
    let amount_minor = to_minor_units(amount);
    if amount_minor != to_minor_units(payment.amount) {
        return Err(AppError::Validation(format!(
            "amount must equal the milestone payment of {:.2}",
            payment.amount
        )));
    }

    let intent = provider
        .create_payment_intent(PaymentIntentRequest {
            amount_minor,
            capture: CaptureMethod::Automatic,
            metadata: vec![
                ("payment_id".to_string(), payment.id.to_string()),
                ("milestone_id".to_string(), milestone_id.to_string()),
            ],
        })
        .await?;

    let payment = payment_db::update_payment_status(
        db,
        payment,
        PaymentStatus::Processing,
        Some(intent.id),
    )
    .await?;

    tracing::info!(payment_id = %payment.id, %milestone_id, "Payment intent created");

    Ok(IntentSecret {
        client_secret: intent.client_secret,
        payment_id: payment.id,
    })
}

/// Place a hold of `amount` against a whole contract. Client only; the
/// supplied freelancer must be the contract's freelancer.
pub async fn create_escrow<C: ConnectionTrait>(
    db: &C,
    provider: &dyn PaymentProvider,
    actor: &Actor,
    contract_id: Uuid,
    amount: f64,
    freelancer_id: Uuid,
) -> AppResult<EscrowSecret> {
    let contract = verify_contract_client(db, contract_id, actor).await?;

    if contract.freelancer_id != freelancer_id {
        return Err(AppError::Validation(
            "freelancerId does not match this contract".to_string(),
        ));
    }
    let amount = positive_amount(Some(amount), "amount")?;

    let intent = provider
        .create_payment_intent(PaymentIntentRequest {
            amount_minor: to_minor_units(amount),
            capture: CaptureMethod::Manual,
            metadata: vec![
                ("contract_id".to_string(), contract_id.to_string()),
                ("freelancer_id".to_string(), freelancer_id.to_string()),
            ],
        })
        .await?;

    tracing::info!(%contract_id, intent_id = %intent.id, "Escrow hold created");

    Ok(EscrowSecret {
        client_secret: intent.client_secret,
    })
}

/// Apply a provider-reported status to the payment stored under any of
/// `handles`.
///
/// Completion is terminal: later events never move a payment back. The
/// first transition to Completed issues the invoice inside the transaction
/// and notifies both parties once it has committed. Returns `None` when no
/// payment matches.
pub async fn confirm_payment(
    db: &DatabaseConnection,
    handles: &[String],
    status: PaymentStatus,
) -> AppResult<Option<payments::Model>> {
    let txn = db.begin().await?;

    let mut found = None;
    for handle in handles {
        if let Some(payment) = payment_db::get_payment_by_provider_ref(&txn, handle).await? {
            found = Some(payment);
            break;
        }
    }

    let Some(payment) = found else {
        tracing::warn!(?handles, "Provider event for unknown payment");
        return Ok(None);
    };

    if payment.status == PaymentStatus::Completed || payment.status == status {
        return Ok(Some(payment));
    }

    let payment = payment_db::update_payment_status(&txn, payment, status, None).await?;

    let mut parties = None;
    if status == PaymentStatus::Completed {
        let contract = contract_db::get_contract_by_id(&txn, payment.contract_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!("Payment {} has no contract", payment.id))
            })?;

        if invoice_db::get_invoice_by_payment(&txn, payment.id).await?.is_none() {
            let number = invoice_number(&payment);
            invoice_db::insert_invoice(
                &txn,
                number,
                &payment,
                contract.client_id,
                contract.freelancer_id,
            )
            .await?;
        }

        parties = Some([contract.client_id, contract.freelancer_id]);
    }

    txn.commit().await?;

    for user_id in parties.into_iter().flatten() {
        notify(
            db,
            user_id,
            "Payment received",
            format!("A milestone payment of {:.2} has been completed", payment.amount),
        )
        .await;
    }

    tracing::info!(payment_id = %payment.id, status = ?payment.status, "Payment status updated by provider");
    Ok(Some(payment))
}
