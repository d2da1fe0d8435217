use sea_orm::prelude::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::notifications::{self, CreateNotification};

/// Insert a new (unread) notification.
pub async fn insert_notification<C: ConnectionTrait>(
    db: &C,
    input: CreateNotification,
) -> Result<notifications::Model, DbErr> {
    let new_notification = notifications::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(input.user_id),
        title: Set(input.title),
        message: Set(input.message),
        is_read: Set(false),
        created_at: Set(chrono::Utc::now()),
    };

    new_notification.insert(db).await
}

/// Fetch a user's notifications, newest first, with pagination.
pub async fn get_notifications_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    page: u64,
    limit: u64,
) -> Result<Vec<notifications::Model>, DbErr> {
    notifications::Entity::find()
        .filter(notifications::Column::UserId.eq(user_id))
        .order_by_desc(notifications::Column::CreatedAt)
        .order_by_desc(notifications::Column::Id)
        .offset((page - 1) * limit)
        .limit(limit)
        .all(db)
        .await
}

/// Fetch a single notification by ID.
pub async fn get_notification_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<notifications::Model>, DbErr> {
    notifications::Entity::find_by_id(id).one(db).await
}

/// Count a user's unread notifications.
pub async fn count_unread<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<u64, DbErr> {
    notifications::Entity::find()
        .filter(notifications::Column::UserId.eq(user_id))
        .filter(notifications::Column::IsRead.eq(false))
        .count(db)
        .await
}

/// Mark a single notification as read.
pub async fn mark_notification_as_read<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<notifications::Model, DbErr> {
    let notification = notifications::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("Notification not found".to_string()))?;

    let mut active: notifications::ActiveModel = notification.into();
    active.is_read = Set(true);

    active.update(db).await
}

/// Mark every unread notification of a user as read. Returns the number updated.
pub async fn mark_all_read_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<u64, DbErr> {
    let result = notifications::Entity::update_many()
        .col_expr(notifications::Column::IsRead, Expr::value(true))
        .filter(notifications::Column::UserId.eq(user_id))
        .filter(notifications::Column::IsRead.eq(false))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
