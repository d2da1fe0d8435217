use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::auth::Actor;
use crate::db::contracts as contract_db;
use crate::db::projects as project_db;
use crate::error::AppError;
use crate::models::users::Roles;
use crate::models::{contracts, projects};

/// Load a contract and check that `actor` is its client or freelancer.
pub async fn verify_contract_party<C: ConnectionTrait>(
    db: &C,
    contract_id: Uuid,
    actor: &Actor,
) -> Result<contracts::Model, AppError> {
    let contract = contract_db::get_contract_by_id(db, contract_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Contract {contract_id} not found")))?;

    if !contract.is_party(actor.id) {
        return Err(AppError::Forbidden(
            "You are not a party to this contract".to_string(),
        ));
    }

    Ok(contract)
}

/// Load a contract and check that `actor` is its client.
pub async fn verify_contract_client<C: ConnectionTrait>(
    db: &C,
    contract_id: Uuid,
    actor: &Actor,
) -> Result<contracts::Model, AppError> {
    let contract = contract_db::get_contract_by_id(db, contract_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Contract {contract_id} not found")))?;

    if contract.client_id != actor.id {
        return Err(AppError::Forbidden(
            "Only the client on this contract can do that".to_string(),
        ));
    }

    Ok(contract)
}

/// Load a project and check that `actor` owns it.
pub async fn verify_project_owner<C: ConnectionTrait>(
    db: &C,
    project_id: Uuid,
    actor: &Actor,
) -> Result<projects::Model, AppError> {
    match project_db::get_project_by_id(db, project_id).await? {
        Some(project) if project.client_id == actor.id => Ok(project),
        Some(_) => Err(AppError::Forbidden(
            "You do not own this project".to_string(),
        )),
        None => Err(AppError::NotFound(format!("Project {project_id} not found"))),
    }
}

pub fn require_role(actor: &Actor, role: Roles, message: &str) -> Result<(), AppError> {
    if actor.role == role {
        Ok(())
    } else {
        Err(AppError::Forbidden(message.to_string()))
    }
}
