use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::Actor;
use crate::auth::authorization::verify_contract_party;
use crate::db::{contracts as contract_db, projects as project_db};
use crate::error::{AppError, AppResult};
use crate::models::contracts::{self, ContractDetails, Stage};
use crate::models::projects::{self, ProjectStatus};

use super::notifications::notify;

/// Result of a successful completion: both rows as committed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractCompletion {
    pub contract: contracts::Model,
    pub project: projects::Model,
}

/// Contracts where the actor is the client or the freelancer.
pub async fn list_contracts<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
) -> AppResult<Vec<contracts::Model>> {
    Ok(contract_db::get_contracts_for_user(db, actor.id).await?)
}

/// The contract aggregate (milestones and payments), parties only.
pub async fn get_contract_details<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    contract_id: Uuid,
) -> AppResult<ContractDetails> {
    verify_contract_party(db, contract_id, actor).await?;

    contract_db::get_contract_details(db, contract_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Contract {contract_id} not found")))
}

/// Record that the actor accepted the contract terms.
pub async fn accept_terms<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    contract_id: Uuid,
) -> AppResult<contracts::Model> {
    let contract = verify_contract_party(db, contract_id, actor).await?;
    let updated = contract_db::set_terms_accepted(db, contract.id).await?;

    tracing::info!(%contract_id, actor_id = %actor.id, "Contract terms accepted");
    notify(
        db,
        contract.counterparty(actor.id),
        "Contract terms accepted",
        "The other party accepted the contract terms".to_string(),
    )
    .await;

    Ok(updated)
}

/// Move a contract to `stage`.
///
/// Any known stage may be written from any other; the order is not enforced.
/// `Completed` is the exception: it is only reachable through [`complete`],
/// which checks the milestones.
pub async fn advance_stage<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    contract_id: Uuid,
    stage: Stage,
) -> AppResult<contracts::Model> {
    let contract = verify_contract_party(db, contract_id, actor).await?;

    if stage == Stage::Completed {
        return Err(AppError::Conflict(
            "Contracts are completed through the completion endpoint".to_string(),
        ));
    }

    let updated = contract_db::update_contract_stage(db, contract.id, stage).await?;

    tracing::info!(%contract_id, from = ?contract.stage, to = ?stage, "Contract stage changed");
    notify(
        db,
        contract.counterparty(actor.id),
        "Contract stage changed",
        format!("The contract moved to the {stage:?} stage"),
    )
    .await;

    Ok(updated)
}

/// Complete a contract whose milestones are all Completed.
///
/// The contract stage and the project status are written in one transaction;
/// both parties are notified after it commits.
pub async fn complete(
    db: &DatabaseConnection,
    actor: &Actor,
    contract_id: Uuid,
) -> AppResult<ContractCompletion> {
    let txn = db.begin().await?;

    let contract = verify_contract_party(&txn, contract_id, actor).await?;

    if contract.stage == Stage::Completed {
        return Err(AppError::Conflict("Contract is already completed".to_string()));
    }

    let details = contract_db::get_contract_details(&txn, contract_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Contract {contract_id} not found")))?;
    if !details.all_milestones_completed() {
        return Err(AppError::Conflict(
            "All milestones must be completed first".to_string(),
        ));
    }

    let contract = contract_db::update_contract_stage(&txn, contract_id, Stage::Completed).await?;
    let project =
        project_db::update_project_status(&txn, contract.project_id, ProjectStatus::Completed)
            .await?;

    txn.commit().await?;

    for user_id in [contract.client_id, contract.freelancer_id] {
        notify(
            db,
            user_id,
            "Contract completed",
            format!("The contract for \"{}\" is complete", project.title),
        )
        .await;
    }

    tracing::info!(%contract_id, project_id = %project.id, "Contract completed");

    Ok(ContractCompletion { contract, project })
}
