use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::auth::Actor;
use crate::db::notifications as notification_db;
use crate::error::{AppError, AppResult};
use crate::models::notifications::{self, CreateNotification, NotificationList};

/// Record a notification for `user_id`. A failure is logged, not returned:
/// notifications never undo the transition that triggered them.
pub async fn notify<C: ConnectionTrait>(db: &C, user_id: Uuid, title: &str, message: String) {
    let input = CreateNotification {
        user_id,
        title: title.to_string(),
        message,
    };

    if let Err(e) = notification_db::insert_notification(db, input).await {
        tracing::warn!(%user_id, "Failed to record notification: {e}");
    }
}

pub async fn list_notifications<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    page: u64,
    limit: u64,
) -> AppResult<NotificationList> {
    let notifications =
        notification_db::get_notifications_for_user(db, actor.id, page, limit).await?;
    let unread_count = notification_db::count_unread(db, actor.id).await?;

    Ok(NotificationList {
        notifications,
        unread_count,
    })
}

pub async fn mark_read<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    notification_id: Uuid,
) -> AppResult<notifications::Model> {
    match notification_db::get_notification_by_id(db, notification_id).await? {
        Some(n) if n.user_id == actor.id => {
            Ok(notification_db::mark_notification_as_read(db, notification_id).await?)
        }
        Some(_) => Err(AppError::Forbidden(
            "You can only update your own notifications".to_string(),
        )),
        None => Err(AppError::NotFound(format!(
            "Notification {notification_id} not found"
        ))),
    }
}

pub async fn mark_all_read<C: ConnectionTrait>(db: &C, actor: &Actor) -> AppResult<u64> {
    Ok(notification_db::mark_all_read_for_user(db, actor.id).await?)
}
