use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::models::contracts::{CreateEscrowRequest, UpdateContractStage};
use crate::models::milestones::CreateMilestone;
use crate::payments::PaymentProvider;
use crate::services::{contracts, milestones, payments};

/// GET /api/contracts — contracts where the authenticated user is the client
/// or the freelancer.
pub async fn get_contracts(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let list = contracts::list_contracts(db.get_ref(), &user.actor()).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// GET /api/contracts/{id} — the contract with its milestones and payments.
pub async fn get_contract(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let details =
        contracts::get_contract_details(db.get_ref(), &user.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(details))
}

/// PUT /api/contracts/{id}/accept — accept the contract terms.
pub async fn accept_terms(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let contract = contracts::accept_terms(db.get_ref(), &user.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(contract))
}

/// PUT /api/contracts/{id}/stage — move the contract to another stage.
pub async fn update_stage(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateContractStage>,
) -> Result<HttpResponse, AppError> {
    let contract = contracts::advance_stage(
        db.get_ref(),
        &user.actor(),
        path.into_inner(),
        body.into_inner().stage,
    )
    .await?;
    Ok(HttpResponse::Ok().json(contract))
}

/// POST /api/contracts/{id}/complete — complete the contract and its project.
///
/// Refused with 409 while any milestone is not `COMPLETED`.
pub async fn complete_contract(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let completion = contracts::complete(db.get_ref(), &user.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(completion))
}

/// POST /api/contracts/{id}/payment — place an escrow hold for the contract.
pub async fn create_escrow(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    provider: web::Data<dyn PaymentProvider>,
    path: web::Path<Uuid>,
    body: web::Json<CreateEscrowRequest>,
) -> Result<HttpResponse, AppError> {
    let CreateEscrowRequest {
        amount,
        freelancer_id,
    } = body.into_inner();

    let secret = payments::create_escrow(
        db.get_ref(),
        provider.get_ref(),
        &user.actor(),
        path.into_inner(),
        amount,
        freelancer_id,
    )
    .await?;
    Ok(HttpResponse::Ok().json(secret))
}

/// GET /api/contracts/{id}/milestones
pub async fn get_milestones(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let list = milestones::list_milestones(db.get_ref(), &user.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// POST /api/contracts/{id}/milestones — the client adds a milestone.
pub async fn create_milestone(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<CreateMilestone>,
) -> Result<HttpResponse, AppError> {
    let milestone = milestones::create_milestone(
        db.get_ref(),
        &user.actor(),
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Created().json(milestone))
}
