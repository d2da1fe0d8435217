use sea_orm::*;
use uuid::Uuid;

use crate::models::bids::{self, BidStatus, CreateBid};
use crate::models::projects;

/// Insert a new bid (defaults to Pending status).
pub async fn insert_bid<C: ConnectionTrait>(db: &C, input: CreateBid) -> Result<bids::Model, DbErr> {
    let new_bid = bids::ActiveModel {
        id: Set(Uuid::new_v4()),
        project_id: Set(input.project_id),
        freelancer_id: Set(input.freelancer_id),
        amount: Set(input.amount),
        delivery_time: Set(input.delivery_time),
        cover_letter: Set(input.cover_letter),
        status: Set(BidStatus::Pending),
        created_at: Set(chrono::Utc::now()),
    };

    new_bid.insert(db).await
}

/// Fetch a single bid by ID.
pub async fn get_bid_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<bids::Model>, DbErr> {
    bids::Entity::find_by_id(id).one(db).await
}

/// Fetch all bids submitted by a freelancer, newest first.
pub async fn get_bids_by_freelancer<C: ConnectionTrait>(
    db: &C,
    freelancer_id: Uuid,
) -> Result<Vec<bids::Model>, DbErr> {
    bids::Entity::find()
        .filter(bids::Column::FreelancerId.eq(freelancer_id))
        .order_by_desc(bids::Column::CreatedAt)
        .all(db)
        .await
}

/// Fetch all bids placed on projects owned by `client_id`, newest first.
pub async fn get_bids_for_client<C: ConnectionTrait>(
    db: &C,
    client_id: Uuid,
) -> Result<Vec<bids::Model>, DbErr> {
    bids::Entity::find()
        .inner_join(projects::Entity)
        .filter(projects::Column::ClientId.eq(client_id))
        .order_by_desc(bids::Column::CreatedAt)
        .all(db)
        .await
}

/// Update the status of a bid.
pub async fn update_bid_status<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    status: BidStatus,
) -> Result<bids::Model, DbErr> {
    let bid = bids::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("Bid not found".to_string()))?;

    let mut active: bids::ActiveModel = bid.into();
    active.status = Set(status);

    active.update(db).await
}
