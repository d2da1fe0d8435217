use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::models::bids::{CreateBidRequest, UpdateBidStatus};
use crate::services::bids;

/// GET /api/bids — the authenticated freelancer's own bids.
pub async fn get_my_bids(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let list = bids::list_my_bids(db.get_ref(), &user.actor()).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// POST /api/bids — a freelancer bids on an open project.
pub async fn create_bid(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateBidRequest>,
) -> Result<HttpResponse, AppError> {
    let bid = bids::create_bid(db.get_ref(), &user.actor(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(bid))
}

/// GET /api/client/bids — bids on the authenticated client's projects.
pub async fn get_client_bids(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let list = bids::list_client_bids(db.get_ref(), &user.actor()).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// PATCH /api/client/bids — accept or reject a bid.
///
/// Accepting creates the contract and moves the project to `IN_PROGRESS`;
/// the response carries both the bid and the new contract.
pub async fn update_bid_status(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<UpdateBidStatus>,
) -> Result<HttpResponse, AppError> {
    let UpdateBidStatus { bid_id, status } = body.into_inner();
    let decision = bids::update_bid_status(db.get_ref(), &user.actor(), bid_id, status).await?;
    Ok(HttpResponse::Ok().json(decision))
}
