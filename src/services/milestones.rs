use sea_orm::{ConnectionTrait, SqlErr};
use uuid::Uuid;

use crate::auth::Actor;
use crate::auth::authorization::{verify_contract_client, verify_contract_party};
use crate::db::milestones as milestone_db;
use crate::error::{AppError, AppResult};
use crate::models::contracts::{self, Stage};
use crate::models::milestones::{self, CreateMilestone, MilestoneStatus};

use super::notifications::notify;
use super::{positive_amount, required_text};

const POSITION_RETRIES: u32 = 3;

/// Append a milestone to a contract. Client only.
pub async fn create_milestone<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    contract_id: Uuid,
    input: CreateMilestone,
) -> AppResult<milestones::Model> {
    let contract = verify_contract_client(db, contract_id, actor).await?;

    if contract.stage == Stage::Completed {
        return Err(AppError::Conflict(
            "Milestones cannot be added to a completed contract".to_string(),
        ));
    }

    let title = required_text(input.title, "title")?;
    let amount = positive_amount(input.amount, "amount")?;
    let description = input
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    let mut attempt = 1;
    let milestone = loop {
        match milestone_db::insert_milestone(
            db,
            contract_id,
            title.clone(),
            description.clone(),
            amount,
        )
        .await
        {
            Ok(milestone) => break milestone,
            Err(e)
                if attempt < POSITION_RETRIES
                    && matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
            {
                tracing::debug!(%contract_id, attempt, "Milestone position taken, retrying");
                attempt += 1;
            }
            Err(e) => return Err(e.into()),
        }
    };

    tracing::info!(milestone_id = %milestone.id, %contract_id, "Milestone created");
    notify(
        db,
        contract.freelancer_id,
        "New milestone",
        format!("Milestone \"{}\" ({amount:.2}) was added", milestone.title),
    )
    .await;

    Ok(milestone)
}

pub async fn list_milestones<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    contract_id: Uuid,
) -> AppResult<Vec<milestones::Model>> {
    verify_contract_party(db, contract_id, actor).await?;
    Ok(milestone_db::get_milestones_by_contract(db, contract_id).await?)
}

/// Load a milestone and its contract, checking the actor is a party.
pub async fn load_for_party<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    milestone_id: Uuid,
) -> AppResult<(milestones::Model, contracts::Model)> {
    let milestone = milestone_db::get_milestone_by_id(db, milestone_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Milestone {milestone_id} not found")))?;
    let contract = verify_contract_party(db, milestone.contract_id, actor).await?;
    Ok((milestone, contract))
}

/// Set a milestone's status. Like contract stages, any known status may be
/// written; transition order is not enforced.
pub async fn update_milestone_status<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    milestone_id: Uuid,
    status: MilestoneStatus,
) -> AppResult<milestones::Model> {
    let (milestone, contract) = load_for_party(db, actor, milestone_id).await?;

    if contract.stage == Stage::Completed {
        return Err(AppError::Conflict(
            "Milestones of a completed contract cannot change".to_string(),
        ));
    }

    let updated = milestone_db::update_milestone_status(db, milestone_id, status).await?;

    tracing::info!(%milestone_id, from = ?milestone.status, to = ?status, "Milestone status changed");
    notify(
        db,
        contract.counterparty(actor.id),
        "Milestone updated",
        format!("Milestone \"{}\" is now {status:?}", updated.title),
    )
    .await;

    Ok(updated)
}
