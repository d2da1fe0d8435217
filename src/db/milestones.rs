use sea_orm::*;
use uuid::Uuid;

use crate::models::milestones::{self, MilestoneStatus};

/// Append a milestone after the contract's highest position.
///
/// Positions are unique per contract; a concurrent append taking the same
/// slot fails with a unique violation and can be retried.
pub async fn insert_milestone<C: ConnectionTrait>(
    db: &C,
    contract_id: Uuid,
    title: String,
    description: Option<String>,
    amount: f64,
) -> Result<milestones::Model, DbErr> {
    let last = milestones::Entity::find()
        .filter(milestones::Column::ContractId.eq(contract_id))
        .order_by_desc(milestones::Column::Position)
        .one(db)
        .await?;
    let position = last.map_or(0, |m| m.position + 1);

    let new_milestone = milestones::ActiveModel {
        id: Set(Uuid::new_v4()),
        contract_id: Set(contract_id),
        title: Set(title),
        description: Set(description),
        amount: Set(amount),
        position: Set(position),
        status: Set(MilestoneStatus::Pending),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_milestone.insert(db).await
}

/// Fetch a single milestone by ID.
pub async fn get_milestone_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<milestones::Model>, DbErr> {
    milestones::Entity::find_by_id(id).one(db).await
}

/// Fetch a contract's milestones in position order.
pub async fn get_milestones_by_contract<C: ConnectionTrait>(
    db: &C,
    contract_id: Uuid,
) -> Result<Vec<milestones::Model>, DbErr> {
    milestones::Entity::find()
        .filter(milestones::Column::ContractId.eq(contract_id))
        .order_by_asc(milestones::Column::Position)
        .all(db)
        .await
}

/// Update the status of a milestone.
pub async fn update_milestone_status<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    status: MilestoneStatus,
) -> Result<milestones::Model, DbErr> {
    let milestone = milestones::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("Milestone not found".to_string()))?;

    let mut active: milestones::ActiveModel = milestone.into();
    active.status = Set(status);
    active.updated_at = Set(Some(chrono::Utc::now()));

    active.update(db).await
}
