use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::config::PaymentConfig;
use crate::error::AppError;
use crate::services::invoices;

/// GET /api/invoices
pub async fn get_invoices(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let list = invoices::list_invoices(db.get_ref(), &user.actor()).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// GET /api/invoices/{id}/download — the invoice as a PDF attachment.
pub async fn download_invoice(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    config: web::Data<PaymentConfig>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let (invoice, pdf) = invoices::download_invoice(
        db.get_ref(),
        &user.actor(),
        path.into_inner(),
        &config.currency,
    )
    .await?;

    let disposition = ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(format!(
            "invoice-{}.pdf",
            invoice.invoice_number
        ))],
    };

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(disposition)
        .body(pdf))
}
