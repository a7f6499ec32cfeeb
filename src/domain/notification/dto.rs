use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use super::entity::notification::{self, NotificationRole};
use super::entity::notification_delivery::{self, DeliveryStatus};

// ============== 내 알림 목록 ==============

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationItem {
    pub notification_id: i64,
    pub notification_type: String,
    pub subtype: String,
    pub role: NotificationRole,
    #[schema(value_type = Object)]
    pub payload: Value,
    pub delivery_status: DeliveryStatus,
    pub created_at: String,
}

impl NotificationItem {
    pub fn from_parts(
        notification: notification::Model,
        delivery: &notification_delivery::Model,
    ) -> Self {
        Self {
            notification_id: notification.notification_id,
            notification_type: notification.notification_type,
            subtype: notification.subtype,
            role: notification.role,
            payload: notification.payload,
            delivery_status: delivery.status,
            created_at: notification.created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessNotificationListResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: Vec<NotificationItem>,
}
