use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::models::milestones::UpdateMilestoneStatus;
use crate::payments::PaymentProvider;
use crate::services::{milestones, payments};

/// PATCH /api/milestones/{id} — set a milestone's status.
pub async fn update_status(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateMilestoneStatus>,
) -> Result<HttpResponse, AppError> {
    let milestone = milestones::update_milestone_status(
        db.get_ref(),
        &user.actor(),
        path.into_inner(),
        body.into_inner().status,
    )
    .await?;
    Ok(HttpResponse::Ok().json(milestone))
}

/// POST /api/milestones/{id}/request-payment — start a hosted checkout and
/// return where to send the client.
pub async fn request_payment(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    provider: web::Data<dyn PaymentProvider>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let redirect = payments::request_payment(
        db.get_ref(),
        provider.get_ref(),
        &user.actor(),
        path.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(redirect))
}
