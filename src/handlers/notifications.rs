use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::models::PaginationQuery;
use crate::services::notifications;

/// GET /api/notifications — newest first, with the unread count.
pub async fn get_notifications(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    query: web::Query<PaginationQuery>,
) -> Result<HttpResponse, AppError> {
    let list = notifications::list_notifications(
        db.get_ref(),
        &user.actor(),
        query.page(),
        query.limit(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(list))
}

/// PATCH /api/notifications/{id}
pub async fn mark_read(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let notification =
        notifications::mark_read(db.get_ref(), &user.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(notification))
}

/// PATCH /api/notifications/mark-all-read
pub async fn mark_all_read(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let updated = notifications::mark_all_read(db.get_ref(), &user.actor()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "updated": updated })))
}
