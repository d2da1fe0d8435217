use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::milestones::MilestoneWithPayment;

/// Contract stage stored as a lowercase string in the database.
///
/// Observed order is `Approval -> Payment -> Review -> Completed`; writes are
/// not checked against that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    #[sea_orm(string_value = "approval")]
    Approval,
    #[sea_orm(string_value = "payment")]
    Payment,
    #[sea_orm(string_value = "review")]
    Review,
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// SeaORM entity for the `contracts` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "contracts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub bid_id: Uuid,
    pub project_id: Uuid,
    pub client_id: Uuid,
    pub freelancer_id: Uuid,
    #[sea_orm(column_type = "Double")]
    pub amount: f64,
    pub stage: Stage,
    pub terms_accepted: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

impl Model {
    /// True when `user_id` is the client or the freelancer on this contract.
    pub fn is_party(&self, user_id: Uuid) -> bool {
        self.client_id == user_id || self.freelancer_id == user_id
    }

    /// The party on the other side of `user_id`.
    pub fn counterparty(&self, user_id: Uuid) -> Uuid {
        if self.client_id == user_id {
            self.freelancer_id
        } else {
            self.client_id
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id"
    )]
    Project,
    #[sea_orm(
        belongs_to = "super::bids::Entity",
        from = "Column::BidId",
        to = "super::bids::Column::Id"
    )]
    Bid,
    #[sea_orm(has_many = "super::milestones::Entity")]
    Milestones,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::bids::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bid.def()
    }
}

impl Related<super::milestones::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Milestones.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// Input for creating a contract from an accepted bid.
#[derive(Debug, Clone)]
pub struct CreateContract {
    pub bid_id: Uuid,
    pub project_id: Uuid,
    pub client_id: Uuid,
    pub freelancer_id: Uuid,
    pub amount: f64,
}

/// Request body for `PUT /api/contracts/{id}/stage`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContractStage {
    pub stage: Stage,
}

/// Request body for `POST /api/contracts/{id}/payment`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEscrowRequest {
    pub amount: f64,
    pub freelancer_id: Uuid,
}

/// A contract together with its milestones (ordered by position) and each
/// milestone's payment, if one exists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDetails {
    #[serde(flatten)]
    pub contract: Model,
    pub milestones: Vec<MilestoneWithPayment>,
}

impl ContractDetails {
    pub fn all_milestones_completed(&self) -> bool {
        self.milestones
            .iter()
            .all(|m| m.milestone.status == super::milestones::MilestoneStatus::Completed)
    }
}
