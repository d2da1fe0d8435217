use sea_orm::*;
use std::collections::HashMap;
use uuid::Uuid;

use crate::db::{milestones as milestone_db, payments as payment_db};
use crate::models::contracts::{self, ContractDetails, CreateContract, Stage};
use crate::models::milestones::MilestoneWithPayment;

/// Insert a new contract (starts in Approval with terms not yet accepted).
pub async fn insert_contract<C: ConnectionTrait>(
    db: &C,
    input: CreateContract,
) -> Result<contracts::Model, DbErr> {
    let new_contract = contracts::ActiveModel {
        id: Set(Uuid::new_v4()),
        bid_id: Set(input.bid_id),
        project_id: Set(input.project_id),
        client_id: Set(input.client_id),
        freelancer_id: Set(input.freelancer_id),
        amount: Set(input.amount),
        stage: Set(Stage::Approval),
        terms_accepted: Set(false),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_contract.insert(db).await
}

/// Fetch a single contract by ID.
pub async fn get_contract_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<contracts::Model>, DbErr> {
    contracts::Entity::find_by_id(id).one(db).await
}

/// Fetch every contract where `user_id` is the client or the freelancer.
pub async fn get_contracts_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Vec<contracts::Model>, DbErr> {
    contracts::Entity::find()
        .filter(
            Condition::any()
                .add(contracts::Column::ClientId.eq(user_id))
                .add(contracts::Column::FreelancerId.eq(user_id)),
        )
        .order_by_desc(contracts::Column::CreatedAt)
        .all(db)
        .await
}

/// Write a new stage. No ordering check is applied here.
pub async fn update_contract_stage<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    stage: Stage,
) -> Result<contracts::Model, DbErr> {
    let contract = contracts::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("Contract not found".to_string()))?;

    let mut active: contracts::ActiveModel = contract.into();
    active.stage = Set(stage);
    active.updated_at = Set(Some(chrono::Utc::now()));

    active.update(db).await
}

/// Mark the contract's terms as accepted.
pub async fn set_terms_accepted<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<contracts::Model, DbErr> {
    let contract = contracts::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("Contract not found".to_string()))?;

    let mut active: contracts::ActiveModel = contract.into();
    active.terms_accepted = Set(true);
    active.updated_at = Set(Some(chrono::Utc::now()));

    active.update(db).await
}

/// Load the contract-with-milestones-with-payments aggregate.
pub async fn get_contract_details<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<ContractDetails>, DbErr> {
    let Some(contract) = get_contract_by_id(db, id).await? else {
        return Ok(None);
    };

    let milestones = milestone_db::get_milestones_by_contract(db, id).await?;
    let ids: Vec<Uuid> = milestones.iter().map(|m| m.id).collect();
    let mut payments: HashMap<Uuid, _> = payment_db::get_payments_by_milestones(db, ids).await?;

    let milestones = milestones
        .into_iter()
        .map(|milestone| MilestoneWithPayment {
            payment: payments.remove(&milestone.id),
            milestone,
        })
        .collect();

    Ok(Some(ContractDetails {
        contract,
        milestones,
    }))
}
