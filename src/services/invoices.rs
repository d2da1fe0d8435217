use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::auth::Actor;
use crate::db::{
    contracts as contract_db, invoices as invoice_db, milestones as milestone_db,
    projects as project_db, users as user_db,
};
use crate::error::{AppError, AppResult};
use crate::invoices::InvoiceDocument;
use crate::models::{invoices, payments, users};

/// `INV-<YYYYMMDD>-<first 8 hex digits of the payment id>`.
pub fn invoice_number(payment: &payments::Model) -> String {
    let date = payment
        .updated_at
        .unwrap_or(payment.created_at)
        .format("%Y%m%d");
    let suffix: String = payment.id.simple().to_string().chars().take(8).collect();
    format!("INV-{date}-{}", suffix.to_uppercase())
}

pub async fn list_invoices<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
) -> AppResult<Vec<invoices::Model>> {
    Ok(invoice_db::get_invoices_for_user(db, actor.id).await?)
}

/// Load an invoice the actor is party to and render it.
pub async fn download_invoice<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    invoice_id: Uuid,
    currency: &str,
) -> AppResult<(invoices::Model, Vec<u8>)> {
    let invoice = invoice_db::get_invoice_by_id(db, invoice_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Invoice {invoice_id} not found")))?;

    if !invoice.is_party(actor.id) {
        return Err(AppError::Forbidden(
            "You are not a party to this invoice".to_string(),
        ));
    }

    let milestone = milestone_db::get_milestone_by_id(db, invoice.milestone_id).await?;
    let project = match contract_db::get_contract_by_id(db, invoice.contract_id).await? {
        Some(contract) => project_db::get_project_by_id(db, contract.project_id).await?,
        None => None,
    };
    let client = user_db::get_user_by_id(db, invoice.client_id).await?;
    let freelancer = user_db::get_user_by_id(db, invoice.freelancer_id).await?;

    let document = InvoiceDocument {
        invoice_number: invoice.invoice_number.clone(),
        issued_at: invoice.created_at,
        project_title: project.map(|p| p.title).unwrap_or_default(),
        milestone_title: milestone.map(|m| m.title).unwrap_or_default(),
        client_name: display_name(client),
        freelancer_name: display_name(freelancer),
        amount: invoice.amount,
        currency: currency.to_string(),
    };

    tracing::debug!(invoice_id = %invoice.id, user_id = %actor.id, "Rendering invoice");
    let pdf = document
        .render()
        .map_err(|e| AppError::Internal(format!("Failed to render invoice: {e}")))?;
    Ok((invoice, pdf))
}

fn display_name(user: Option<users::Model>) -> String {
    user.map(|u| u.display_name.unwrap_or(u.email))
        .unwrap_or_else(|| "Unknown".to_string())
}
