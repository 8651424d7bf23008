//! Per-user notification inbox

use tracing::warn;
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};
use crate::models::notification::Notification;
use crate::models::user::UserIdentity;
use crate::store::Store;

/// Records a notification for `user_id`
///
/// Notifications are a side effect of an already committed change, so a
/// failure here is logged and swallowed instead of failing the caller.
pub async fn notify(store: &dyn Store, user_id: Uuid, message: &str) -> Option<Notification> {
    match store.create_notification(user_id, message).await {
        Ok(notification) => Some(notification),
        Err(e) => {
            warn!(%user_id, error = %e, "Failed to create notification");
            None
        }
    }
}

/// The caller's notifications, newest first
pub async fn list_notifications(
    store: &dyn Store,
    actor: &UserIdentity,
) -> ServiceResult<Vec<Notification>> {
    Ok(store.list_notifications(actor.id).await?)
}

/// Marks one of the caller's notifications read
///
/// Someone else's notification is reported as `NotFound`, the same as a
/// missing one.
pub async fn mark_read(
    store: &dyn Store,
    actor: &UserIdentity,
    notification_id: Uuid,
) -> ServiceResult<Notification> {
    store
        .mark_notification_read(notification_id, actor.id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Notification"))
}
