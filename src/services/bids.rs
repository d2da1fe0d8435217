use sea_orm::{ConnectionTrait, DatabaseConnection, SqlErr, TransactionTrait};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::Actor;
use crate::auth::authorization::{require_role, verify_project_owner};
use crate::db::{bids as bid_db, contracts as contract_db, projects as project_db};
use crate::error::{AppError, AppResult};
use crate::models::bids::{self, BidStatus, CreateBid, CreateBidRequest};
use crate::models::contracts::{self, CreateContract};
use crate::models::projects::ProjectStatus;
use crate::models::users::Roles;

use super::notifications::notify;
use super::{positive_amount, required_text};

/// Outcome of a client's decision on a bid. `contract` is set when the bid
/// was accepted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidDecision {
    pub bid: bids::Model,
    pub contract: Option<contracts::Model>,
}

/// Submit a bid on an open project.
///
/// The open-status check and the insert are separate statements, so a project
/// closing in between is not guarded against.
pub async fn create_bid<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    input: CreateBidRequest,
) -> AppResult<bids::Model> {
    require_role(actor, Roles::Freelancer, "Only freelancers can place bids")?;

    let project_id = input
        .project_id
        .ok_or_else(|| AppError::Validation("projectId is required".to_string()))?;
    let amount = positive_amount(input.amount, "amount")?;
    let delivery_time = match input.delivery_time {
        Some(days) if days > 0 => days,
        Some(_) => {
            return Err(AppError::Validation(
                "deliveryTime must be at least one day".to_string(),
            ));
        }
        None => return Err(AppError::Validation("deliveryTime is required".to_string())),
    };
    let cover_letter = required_text(input.cover_letter, "coverLetter")?;

    let project = project_db::get_project_by_id(db, project_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {project_id} not found")))?;

    if project.status != ProjectStatus::Open {
        return Err(AppError::Conflict(
            "Project is no longer accepting bids".to_string(),
        ));
    }

    let bid = bid_db::insert_bid(
        db,
        CreateBid {
            project_id,
            freelancer_id: actor.id,
            amount,
            delivery_time,
            cover_letter,
        },
    )
    .await?;

    tracing::info!(bid_id = %bid.id, %project_id, freelancer_id = %actor.id, "Bid submitted");

    notify(
        db,
        project.client_id,
        "New bid",
        format!("You received a new bid of {amount:.2} on \"{}\"", project.title),
    )
    .await;

    Ok(bid)
}

/// Bids the acting freelancer has submitted.
pub async fn list_my_bids<C: ConnectionTrait>(db: &C, actor: &Actor) -> AppResult<Vec<bids::Model>> {
    Ok(bid_db::get_bids_by_freelancer(db, actor.id).await?)
}

/// Bids placed on the acting client's projects.
pub async fn list_client_bids<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
) -> AppResult<Vec<bids::Model>> {
    require_role(actor, Roles::Client, "Only clients can review bids")?;
    Ok(bid_db::get_bids_for_client(db, actor.id).await?)
}

/// Accept or reject a pending bid.
///
/// Acceptance claims the project (Open to InProgress), writes the bid status
/// and creates the contract in one transaction. Only one bid per project can
/// win; the loser gets a Conflict.
pub async fn update_bid_status(
    db: &DatabaseConnection,
    actor: &Actor,
    bid_id: Uuid,
    status: BidStatus,
) -> AppResult<BidDecision> {
    if status == BidStatus::Pending {
        return Err(AppError::Validation(
            "status must be ACCEPTED or REJECTED".to_string(),
        ));
    }

    let bid = bid_db::get_bid_by_id(db, bid_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Bid {bid_id} not found")))?;

    let project = verify_project_owner(db, bid.project_id, actor).await?;

    if bid.status != BidStatus::Pending {
        return Err(AppError::Conflict(format!(
            "Bid is already {:?}. Only pending bids can be updated.",
            bid.status
        )));
    }

    if status == BidStatus::Rejected {
        let bid = bid_db::update_bid_status(db, bid_id, BidStatus::Rejected).await?;
        tracing::info!(%bid_id, "Bid rejected");
        notify(
            db,
            bid.freelancer_id,
            "Bid rejected",
            format!("Your bid on \"{}\" was not accepted", project.title),
        )
        .await;
        return Ok(BidDecision {
            bid,
            contract: None,
        });
    }

    let txn = db.begin().await?;

    // The conditional update decides between concurrent acceptances.
    if !project_db::claim_open_project(&txn, project.id).await? {
        return Err(AppError::Conflict(
            "Project is no longer open; another bid may already be accepted".to_string(),
        ));
    }

    let bid = bid_db::update_bid_status(&txn, bid_id, BidStatus::Accepted).await?;
    let contract = contract_db::insert_contract(
        &txn,
        CreateContract {
            bid_id: bid.id,
            project_id: project.id,
            client_id: project.client_id,
            freelancer_id: bid.freelancer_id,
            amount: bid.amount,
        },
    )
    .await
    .map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("A contract already exists for this project".to_string())
        }
        _ => AppError::Database(e),
    })?;

    txn.commit().await?;

    notify(
        db,
        bid.freelancer_id,
        "Bid accepted",
        format!(
            "Your bid on \"{}\" was accepted. A contract is awaiting your approval.",
            project.title
        ),
    )
    .await;

    tracing::info!(%bid_id, contract_id = %contract.id, "Bid accepted, contract created");

    Ok(BidDecision {
        bid,
        contract: Some(contract),
    })
}
