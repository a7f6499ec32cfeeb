//! Notification delivery worker
//!
//! Polls due deliveries (PENDING, or FAILED whose `next_attempt_at` has
//! passed), sends them through the configured `Mailer` and records the
//! outcome on the delivery row. Failed attempts are retried with
//! exponential backoff until `max_attempts`, then marked DEAD.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDateTime, Utc};
use rand::Rng;
use sea_orm::sea_query::{LockBehavior, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::domain::notification::entity::notification;
use crate::domain::notification::entity::notification_delivery::{self, DeliveryStatus};
use crate::domain::notification::mailer::{EmailMessage, MailError, Mailer};
use crate::domain::notification::template::NotificationKind;
use crate::domain::user::entity::user;
use crate::utils::error::AppError;

/// Deliveries claimed per tick
const BATCH_SIZE: u64 = 50;
const BASE_RETRY_DELAY_SECS: i64 = 30;
const MAX_RETRY_DELAY_SECS: i64 = 3600;
const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Worker configuration
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub poll_interval: Duration,
    pub max_attempts: i32,
}

impl WorkerConfig {
    /// `tokio::time::interval` panics on a zero period
    fn tick_period(&self) -> Duration {
        self.poll_interval.max(MIN_POLL_INTERVAL)
    }

    fn attempt_limit(&self) -> i32 {
        self.max_attempts.max(1)
    }
}

/// Counts from one processing pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub sent: usize,
    pub retrying: usize,
    pub dead: usize,
}

/// Result of one delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
enum Attempt {
    Delivered,
    Failed(MailError),
}

/// Delay before retry number `attempts` (1-based): 30s, 60s, 120s ... capped at 1h
pub fn retry_delay(attempts: i32) -> chrono::Duration {
    let exponent = attempts.saturating_sub(1).clamp(0, 16) as u32;
    let secs = BASE_RETRY_DELAY_SECS
        .saturating_mul(2_i64.saturating_pow(exponent))
        .min(MAX_RETRY_DELAY_SECS);
    chrono::Duration::seconds(secs)
}

/// Status after a failed attempt
pub fn status_after_failure(attempts: i32, error: &MailError, max_attempts: i32) -> DeliveryStatus {
    if !error.is_retryable() || attempts >= max_attempts {
        DeliveryStatus::Dead
    } else {
        DeliveryStatus::Failed
    }
}

/// Up to 10% random jitter so retries of a burst don't line up
fn with_jitter(delay: chrono::Duration) -> chrono::Duration {
    let max_jitter_ms = (delay.num_milliseconds() / 10).max(1);
    let jitter = rand::thread_rng().gen_range(0..=max_jitter_ms);
    delay + chrono::Duration::milliseconds(jitter)
}

pub struct NotificationWorker;

impl NotificationWorker {
    /// Run until the shutdown flag flips to `true`.
    pub async fn run(
        db: DatabaseConnection,
        mailer: Arc<dyn Mailer>,
        config: WorkerConfig,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let period = config.tick_period();
        let max_attempts = config.attempt_limit();
        info!(
            poll_interval_secs = period.as_secs(),
            max_attempts,
            "Notification worker started"
        );

        let mut ticker = tokio::time::interval(period);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let now = Utc::now().naive_utc();
                    match Self::process_due(&db, mailer.as_ref(), max_attempts, now).await {
                        Ok(report) if report != DeliveryReport::default() => {
                            info!(
                                sent = report.sent,
                                retrying = report.retrying,
                                dead = report.dead,
                                "Notification deliveries processed"
                            );
                        }
                        Ok(_) => {}
                        Err(e) => error!(error = %e, "Notification worker pass failed"),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Notification worker stopped");
    }

    /// One processing pass over due deliveries.
    ///
    /// Rows are claimed with `FOR UPDATE SKIP LOCKED` so several server
    /// instances can run the worker side by side.
    pub async fn process_due(
        db: &DatabaseConnection,
        mailer: &dyn Mailer,
        max_attempts: i32,
        now: NaiveDateTime,
    ) -> Result<DeliveryReport, AppError> {
        let txn = db.begin().await?;

        let due = notification_delivery::Entity::find()
            .filter(
                notification_delivery::Column::Status
                    .is_in([DeliveryStatus::Pending, DeliveryStatus::Failed]),
            )
            .filter(notification_delivery::Column::NextAttemptAt.lte(now))
            .order_by_asc(notification_delivery::Column::NextAttemptAt)
            .order_by_asc(notification_delivery::Column::NotificationDeliveryId)
            .limit(BATCH_SIZE)
            .lock_with_behavior(LockType::Update, LockBehavior::SkipLocked)
            .all(&txn)
            .await?;

        let mut report = DeliveryReport::default();
        if due.is_empty() {
            txn.commit().await?;
            return Ok(report);
        }

        let notification_ids: Vec<i64> = due.iter().map(|d| d.notification_id).collect();
        let user_ids: Vec<i64> = due.iter().map(|d| d.user_id).collect();

        let notifications: HashMap<i64, notification::Model> = notification::Entity::find()
            .filter(notification::Column::NotificationId.is_in(notification_ids))
            .all(&txn)
            .await?
            .into_iter()
            .map(|n| (n.notification_id, n))
            .collect();

        let users: HashMap<i64, user::Model> = user::Entity::find()
            .filter(user::Column::UserId.is_in(user_ids))
            .all(&txn)
            .await?
            .into_iter()
            .map(|u| (u.user_id, u))
            .collect();

        for delivery in due {
            let attempt = Self::attempt(
                &delivery,
                notifications.get(&delivery.notification_id),
                users.get(&delivery.user_id),
                mailer,
            )
            .await;

            let attempts = delivery.attempts + 1;
            let delivery_id = delivery.notification_delivery_id;
            let mut active: notification_delivery::ActiveModel = delivery.into();
            active.attempts = Set(attempts);

            match attempt {
                Attempt::Delivered => {
                    active.status = Set(DeliveryStatus::Sent);
                    active.sent_at = Set(Some(now));
                    active.last_error = Set(None);
                    report.sent += 1;
                }
                Attempt::Failed(err) => {
                    let status = status_after_failure(attempts, &err, max_attempts);
                    warn!(
                        delivery_id,
                        attempts,
                        status = ?status,
                        error = %err,
                        "Notification delivery failed"
                    );
                    if status == DeliveryStatus::Failed {
                        active.next_attempt_at = Set(now + with_jitter(retry_delay(attempts)));
                        report.retrying += 1;
                    } else {
                        report.dead += 1;
                    }
                    active.status = Set(status);
                    active.last_error = Set(Some(err.to_string()));
                }
            }

            active.update(&txn).await?;
        }

        txn.commit().await?;
        Ok(report)
    }

    async fn attempt(
        delivery: &notification_delivery::Model,
        notification: Option<&notification::Model>,
        recipient: Option<&user::Model>,
        mailer: &dyn Mailer,
    ) -> Attempt {
        let Some(notification) = notification else {
            return Attempt::Failed(MailError::Permanent("notification row missing".into()));
        };
        let Some(recipient) = recipient.filter(|u| !u.is_deleted()) else {
            return Attempt::Failed(MailError::Permanent(format!(
                "recipient {} not found or deleted",
                delivery.user_id
            )));
        };
        let Some(kind) =
            NotificationKind::parse(&notification.notification_type, &notification.subtype)
        else {
            return Attempt::Failed(MailError::Permanent(format!(
                "unknown notification {}/{}",
                notification.notification_type, notification.subtype
            )));
        };

        let rendered = kind.render(&notification.payload, &recipient.name);
        let message = EmailMessage {
            to: recipient.email.clone(),
            subject: rendered.subject,
            html: rendered.html,
        };

        match mailer.send(&message).await {
            Ok(()) => Attempt::Delivered,
            Err(e) => Attempt::Failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use sea_orm::{DatabaseBackend, MockDatabase, Statement, Value as DbValue};
    use serde_json::json;

    use super::*;
    use crate::domain::notification::entity::notification::NotificationRole;
    use crate::domain::notification::entity::notification_delivery::DeliveryChannel;
    use crate::domain::user::entity::user::UserRole;

    struct RelayDown;

    #[async_trait]
    impl Mailer for RelayDown {
        async fn send(&self, _message: &EmailMessage) -> Result<(), MailError> {
            Err(MailError::Transient("503 Service Unavailable".into()))
        }
    }

    fn now() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2026, 3, 1)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .unwrap()
    }

    fn due_delivery(attempts: i32) -> notification_delivery::Model {
        notification_delivery::Model {
            notification_delivery_id: 11,
            notification_id: 100,
            user_id: 7,
            channel: DeliveryChannel::Email,
            status: if attempts == 0 { DeliveryStatus::Pending } else { DeliveryStatus::Failed },
            attempts,
            last_error: None,
            next_attempt_at: now(),
            sent_at: None,
            created_at: now(),
        }
    }

    fn queued_notification() -> notification::Model {
        notification::Model {
            notification_id: 100,
            notification_type: "offer".to_string(),
            subtype: "created".to_string(),
            role: NotificationRole::Founder,
            targeted_users: json!([7]),
            payload: json!({ "pitchName": "Chai", "actorName": "Meera" }),
            created_at: now(),
        }
    }

    fn recipient() -> user::Model {
        user::Model {
            user_id: 7,
            name: "Ravi".to_string(),
            email: "ravi@daftar.os".to_string(),
            role: UserRole::Founder,
            phone: None,
            gender: None,
            date_of_birth: None,
            location: None,
            preferred_languages: json!(["English"]),
            deleted_on: None,
            created_at: now(),
            updated_at: now(),
        }
    }

    /// Runs one pass against a mock holding a single due delivery and
    /// returns the report with the SET part of the delivery UPDATE.
    async fn fail_once(attempts: i32, max_attempts: i32) -> (DeliveryReport, Statement) {
        let mut updated = due_delivery(attempts);
        updated.attempts = attempts + 1;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![due_delivery(attempts)]])
            .append_query_results([vec![queued_notification()]])
            .append_query_results([vec![recipient()]])
            .append_query_results([vec![updated]])
            .into_connection();

        let report = NotificationWorker::process_due(&db, &RelayDown, max_attempts, now())
            .await
            .unwrap();

        let update = db
            .into_transaction_log()
            .iter()
            .flat_map(|txn| txn.statements().to_vec())
            .find(|s| s.sql.starts_with(r#"UPDATE "notification_delivery""#))
            .expect("delivery update");
        (report, update)
    }

    fn set_clause(statement: &Statement) -> &str {
        statement
            .sql
            .split(" WHERE ")
            .next()
            .unwrap_or(&statement.sql)
    }

    #[test]
    fn retry_delay_should_double_per_attempt() {
        assert_eq!(retry_delay(1).num_seconds(), 30);
        assert_eq!(retry_delay(2).num_seconds(), 60);
        assert_eq!(retry_delay(3).num_seconds(), 120);
    }

    #[test]
    fn retry_delay_should_be_capped_at_one_hour() {
        assert_eq!(retry_delay(8).num_seconds(), 3600);
        assert_eq!(retry_delay(100).num_seconds(), 3600);
    }

    #[test]
    fn jitter_should_stay_within_ten_percent() {
        let base = retry_delay(3);
        for _ in 0..100 {
            let delayed = with_jitter(base);
            assert!(delayed >= base);
            assert!(delayed <= base + chrono::Duration::seconds(12));
        }
    }

    #[test]
    fn transient_failure_should_be_retried_until_max_attempts() {
        let err = MailError::Transient("503".into());

        assert_eq!(status_after_failure(1, &err, 5), DeliveryStatus::Failed);
        assert_eq!(status_after_failure(4, &err, 5), DeliveryStatus::Failed);
        assert_eq!(status_after_failure(5, &err, 5), DeliveryStatus::Dead);
    }

    #[test]
    fn permanent_failure_should_be_dead_immediately() {
        let err = MailError::Permanent("422".into());

        assert_eq!(status_after_failure(1, &err, 5), DeliveryStatus::Dead);
    }

    #[tokio::test]
    async fn transient_failure_should_persist_failed_with_next_attempt() {
        // Arrange / Act
        let (report, update) = fail_once(0, 5).await;

        // Assert
        assert_eq!(report, DeliveryReport { sent: 0, retrying: 1, dead: 0 });
        assert!(set_clause(&update).contains(r#""next_attempt_at""#));
        let values = &update.values.as_ref().expect("bound values").0;
        assert!(values.contains(&DbValue::from("FAILED")));
        assert!(values.contains(&DbValue::from(1_i32)));
    }

    #[tokio::test]
    async fn last_allowed_attempt_should_persist_dead_without_rescheduling() {
        let (report, update) = fail_once(4, 5).await;

        assert_eq!(report, DeliveryReport { sent: 0, retrying: 0, dead: 1 });
        assert!(!set_clause(&update).contains(r#""next_attempt_at""#));
        let values = &update.values.as_ref().expect("bound values").0;
        assert!(values.contains(&DbValue::from("DEAD")));
        assert!(values.contains(&DbValue::from(5_i32)));
    }

    #[test]
    fn zero_poll_interval_should_tick_every_second() {
        let config = WorkerConfig {
            poll_interval: Duration::ZERO,
            max_attempts: 0,
        };

        assert_eq!(config.tick_period(), Duration::from_secs(1));
        assert_eq!(config.attempt_limit(), 1);
    }
}
