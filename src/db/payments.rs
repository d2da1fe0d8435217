use sea_orm::*;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::payment_attempts;
use crate::models::payments::{self, PaymentStatus};

/// Insert a new Pending payment for a milestone.
pub async fn insert_payment<C: ConnectionTrait>(
    db: &C,
    milestone_id: Uuid,
    contract_id: Uuid,
    amount: f64,
    payment_intent_id: String,
) -> Result<payments::Model, DbErr> {
    let new_payment = payments::ActiveModel {
        id: Set(Uuid::new_v4()),
        milestone_id: Set(milestone_id),
        contract_id: Set(contract_id),
        amount: Set(amount),
        status: Set(PaymentStatus::Pending),
        payment_intent_id: Set(payment_intent_id),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    let payment = new_payment.insert(db).await?;
    record_attempt(db, payment.id, &payment.payment_intent_id).await?;
    Ok(payment)
}

/// Remember a provider handle issued for a payment. Re-recording a handle
/// already stored for the payment is a no-op.
pub async fn record_attempt<C: ConnectionTrait>(
    db: &C,
    payment_id: Uuid,
    provider_ref: &str,
) -> Result<(), DbErr> {
    let existing = payment_attempts::Entity::find()
        .filter(payment_attempts::Column::ProviderRef.eq(provider_ref))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    payment_attempts::ActiveModel {
        id: Set(Uuid::new_v4()),
        payment_id: Set(payment_id),
        provider_ref: Set(provider_ref.to_string()),
        created_at: Set(chrono::Utc::now()),
    }
    .insert(db)
    .await?;

    Ok(())
}

/// Fetch the payment belonging to a milestone, if any.
pub async fn get_payment_by_milestone<C: ConnectionTrait>(
    db: &C,
    milestone_id: Uuid,
) -> Result<Option<payments::Model>, DbErr> {
    payments::Entity::find()
        .filter(payments::Column::MilestoneId.eq(milestone_id))
        .one(db)
        .await
}

/// Fetch the payment that was ever issued `provider_ref` (an intent or a
/// checkout session id), not only its latest handle.
pub async fn get_payment_by_provider_ref<C: ConnectionTrait>(
    db: &C,
    provider_ref: &str,
) -> Result<Option<payments::Model>, DbErr> {
    let attempt = payment_attempts::Entity::find()
        .filter(payment_attempts::Column::ProviderRef.eq(provider_ref))
        .one(db)
        .await?;

    match attempt {
        Some(attempt) => payments::Entity::find_by_id(attempt.payment_id).one(db).await,
        None => Ok(None),
    }
}

/// Fetch payments for many milestones in one query and return a
/// milestone_id -> payment map.
pub async fn get_payments_by_milestones<C: ConnectionTrait>(
    db: &C,
    milestone_ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, payments::Model>, DbErr> {
    if milestone_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = payments::Entity::find()
        .filter(payments::Column::MilestoneId.is_in(milestone_ids))
        .all(db)
        .await?;

    Ok(rows.into_iter().map(|p| (p.milestone_id, p)).collect())
}

/// Point a payment at a new provider handle and reset its amount/status.
/// Earlier handles stay matchable through `payment_attempts`.
pub async fn reset_payment<C: ConnectionTrait>(
    db: &C,
    payment: payments::Model,
    amount: f64,
    payment_intent_id: String,
) -> Result<payments::Model, DbErr> {
    let mut active: payments::ActiveModel = payment.into();
    active.amount = Set(amount);
    active.payment_intent_id = Set(payment_intent_id);
    active.status = Set(PaymentStatus::Pending);
    active.updated_at = Set(Some(chrono::Utc::now()));

    let payment = active.update(db).await?;
    record_attempt(db, payment.id, &payment.payment_intent_id).await?;
    Ok(payment)
}

/// Set a payment's status, and optionally its provider handle.
pub async fn update_payment_status<C: ConnectionTrait>(
    db: &C,
    payment: payments::Model,
    status: PaymentStatus,
    payment_intent_id: Option<String>,
) -> Result<payments::Model, DbErr> {
    let payment_id = payment.id;
    let mut active: payments::ActiveModel = payment.into();
    active.status = Set(status);
    if let Some(intent) = &payment_intent_id {
        active.payment_intent_id = Set(intent.clone());
    }
    active.updated_at = Set(Some(chrono::Utc::now()));

    let payment = active.update(db).await?;
    if let Some(intent) = payment_intent_id {
        record_attempt(db, payment_id, &intent).await?;
    }
    Ok(payment)
}
