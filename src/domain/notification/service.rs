use std::collections::BTreeSet;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde_json::Value;
use tracing::{debug, info};

use crate::domain::notification::entity::notification::{self, NotificationRole};
use crate::domain::notification::entity::notification_delivery::{
    self, DeliveryChannel, DeliveryStatus,
};
use crate::domain::notification::template::NotificationKind;
use crate::domain::user::entity::user;
use crate::utils::error::AppError;

use super::dto::NotificationItem;

pub struct NotificationService;

impl NotificationService {
    /// Persist a notification and one PENDING delivery per recipient.
    ///
    /// Runs in its own transaction, or a savepoint when `conn` is already a
    /// transaction, so callers can make it atomic with their own writes.
    /// Returns `None` when there is nobody to notify.
    pub async fn dispatch<C>(
        conn: &C,
        kind: NotificationKind,
        role: NotificationRole,
        recipients: &[i64],
        payload: Value,
    ) -> Result<Option<i64>, AppError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let recipients: BTreeSet<i64> = recipients.iter().copied().collect();
        if recipients.is_empty() {
            debug!(?kind, "No recipients, notification skipped");
            return Ok(None);
        }

        let (notification_type, subtype) = kind.type_and_subtype();
        let now = Utc::now().naive_utc();
        let txn = conn.begin().await?;

        let saved = notification::ActiveModel {
            notification_type: Set(notification_type.to_string()),
            subtype: Set(subtype.to_string()),
            role: Set(role),
            targeted_users: Set(Value::from(recipients.iter().copied().collect::<Vec<_>>())),
            payload: Set(payload),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let deliveries = recipients
            .iter()
            .map(|user_id| notification_delivery::ActiveModel {
                notification_id: Set(saved.notification_id),
                user_id: Set(*user_id),
                channel: Set(DeliveryChannel::Email),
                status: Set(DeliveryStatus::Pending),
                attempts: Set(0),
                last_error: Set(None),
                next_attempt_at: Set(now),
                sent_at: Set(None),
                created_at: Set(now),
                ..Default::default()
            });
        notification_delivery::Entity::insert_many(deliveries)
            .exec(&txn)
            .await?;

        txn.commit().await?;

        info!(
            notification_id = saved.notification_id,
            notification_type,
            subtype,
            recipients = recipients.len(),
            "Notification queued"
        );

        Ok(Some(saved.notification_id))
    }

    /// 내 알림 목록 (최신순, 역할이 맞는 알림만)
    pub async fn list_my_notifications<C: ConnectionTrait>(
        conn: &C,
        me: &user::Model,
    ) -> Result<Vec<NotificationItem>, AppError> {
        let rows = notification_delivery::Entity::find()
            .filter(notification_delivery::Column::UserId.eq(me.user_id))
            .find_also_related(notification::Entity)
            .order_by_desc(notification_delivery::Column::CreatedAt)
            .order_by_desc(notification_delivery::Column::NotificationDeliveryId)
            .all(conn)
            .await?;

        let items = rows
            .into_iter()
            .filter_map(|(delivery, notification)| {
                notification
                    .filter(|n| n.role.matches(me.role))
                    .map(|n| NotificationItem::from_parts(n, &delivery))
            })
            .collect();

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use sea_orm::{DatabaseBackend, MockDatabase, Statement, Value as DbValue};
    use serde_json::json;

    use super::*;

    fn saved_notification(notification_id: i64) -> notification::Model {
        notification::Model {
            notification_id,
            notification_type: "offer".to_string(),
            subtype: "created".to_string(),
            role: NotificationRole::Founder,
            targeted_users: json!([3, 5]),
            payload: json!({ "pitchName": "Chai" }),
            created_at: Utc::now().naive_utc(),
        }
    }

    fn delivery_insert(statements: &[Statement]) -> Option<&Statement> {
        statements
            .iter()
            .find(|s| s.sql.starts_with(r#"INSERT INTO "notification_delivery""#))
    }

    #[tokio::test]
    async fn dispatch_should_queue_one_pending_delivery_per_distinct_recipient() {
        // Arrange
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![saved_notification(100)]])
            .append_query_results([vec![BTreeMap::from([(
                "notification_delivery_id",
                DbValue::from(1_i64),
            )])]])
            .into_connection();

        // Act
        let result = NotificationService::dispatch(
            &db,
            NotificationKind::OfferCreated,
            NotificationRole::Founder,
            &[5, 3, 5],
            json!({ "pitchName": "Chai" }),
        )
        .await;

        // Assert
        assert_eq!(result.unwrap(), Some(100));
        let log = db.into_transaction_log();
        let statements: Vec<Statement> = log
            .iter()
            .flat_map(|txn| txn.statements().to_vec())
            .collect();
        let insert = delivery_insert(&statements).expect("delivery insert");
        let values = &insert.values.as_ref().expect("bound values").0;
        let pending = values.iter().filter(|v| **v == DbValue::from("PENDING")).count();
        assert_eq!(pending, 2);
        assert!(values.contains(&DbValue::from(3_i64)));
        assert!(values.contains(&DbValue::from(5_i64)));
    }

    #[tokio::test]
    async fn dispatch_without_recipients_should_write_nothing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = NotificationService::dispatch(
            &db,
            NotificationKind::OfferCreated,
            NotificationRole::Founder,
            &[],
            json!({}),
        )
        .await;

        assert_eq!(result.unwrap(), None);
        assert!(db.into_transaction_log().is_empty());
    }
}
