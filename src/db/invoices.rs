use sea_orm::*;
use uuid::Uuid;

use crate::models::{invoices, payments};

/// Insert the invoice for a completed payment.
pub async fn insert_invoice<C: ConnectionTrait>(
    db: &C,
    invoice_number: String,
    payment: &payments::Model,
    client_id: Uuid,
    freelancer_id: Uuid,
) -> Result<invoices::Model, DbErr> {
    let new_invoice = invoices::ActiveModel {
        id: Set(Uuid::new_v4()),
        invoice_number: Set(invoice_number),
        payment_id: Set(payment.id),
        contract_id: Set(payment.contract_id),
        milestone_id: Set(payment.milestone_id),
        client_id: Set(client_id),
        freelancer_id: Set(freelancer_id),
        amount: Set(payment.amount),
        created_at: Set(chrono::Utc::now()),
    };

    new_invoice.insert(db).await
}

/// Fetch a single invoice by ID.
pub async fn get_invoice_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<invoices::Model>, DbErr> {
    invoices::Entity::find_by_id(id).one(db).await
}

/// Fetch the invoice issued for a payment, if any.
pub async fn get_invoice_by_payment<C: ConnectionTrait>(
    db: &C,
    payment_id: Uuid,
) -> Result<Option<invoices::Model>, DbErr> {
    invoices::Entity::find()
        .filter(invoices::Column::PaymentId.eq(payment_id))
        .one(db)
        .await
}

/// Fetch invoices where `user_id` is the client or the freelancer.
pub async fn get_invoices_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Vec<invoices::Model>, DbErr> {
    invoices::Entity::find()
        .filter(
            Condition::any()
                .add(invoices::Column::ClientId.eq(user_id))
                .add(invoices::Column::FreelancerId.eq(user_id)),
        )
        .order_by_desc(invoices::Column::CreatedAt)
        .all(db)
        .await
}
