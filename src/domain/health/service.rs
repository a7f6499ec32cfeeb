use std::sync::OnceLock;
use std::time::{Duration, Instant};

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use tokio::time::timeout;

use super::dto::{CheckResult, HealthChecks, HealthState, HealthStatus, MailQueueCheck};
use crate::domain::notification::entity::notification_delivery::{self, DeliveryStatus};

static START_TIME: OnceLock<Instant> = OnceLock::new();

const PING_TIMEOUT: Duration = Duration::from_secs(3);
const DEGRADED_THRESHOLD: Duration = Duration::from_millis(500);

/// 가동 시간 기준점. main에서 한 번 호출합니다.
pub fn init_start_time() {
    START_TIME.get_or_init(Instant::now);
}

pub fn get_uptime_secs() -> u64 {
    START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0)
}

pub async fn check_health(db: &DatabaseConnection) -> HealthStatus {
    let database = ping_database(db).await;
    let mail_queue = if database.status {
        count_dead_deliveries(db).await
    } else {
        MailQueueCheck::default()
    };

    HealthStatus {
        status: determine_health_state(&database, &mail_queue),
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: get_uptime_secs(),
        checks: HealthChecks {
            database,
            mail_queue,
        },
    }
}

fn determine_health_state(database: &CheckResult, mail_queue: &MailQueueCheck) -> HealthState {
    if !database.status {
        return HealthState::Unhealthy;
    }

    let slow = database
        .latency_ms
        .is_some_and(|latency| latency >= DEGRADED_THRESHOLD.as_millis() as u64);

    if slow || mail_queue.has_dead_letters() {
        HealthState::Degraded
    } else {
        HealthState::Healthy
    }
}

async fn ping_database(db: &DatabaseConnection) -> CheckResult {
    let start = Instant::now();
    let result = timeout(PING_TIMEOUT, db.ping()).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(Ok(())) => CheckResult::success(latency_ms),
        Ok(Err(e)) => {
            tracing::warn!(latency_ms, error = %e, "Database ping failed");
            CheckResult::failure(latency_ms, e.to_string())
        }
        Err(_) => {
            tracing::warn!("Database ping timed out");
            CheckResult::timeout(PING_TIMEOUT.as_millis() as u64)
        }
    }
}

async fn count_dead_deliveries(db: &DatabaseConnection) -> MailQueueCheck {
    let count = notification_delivery::Entity::find()
        .filter(notification_delivery::Column::Status.eq(DeliveryStatus::Dead))
        .count(db)
        .await;

    match count {
        Ok(n) => MailQueueCheck::counted(n),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to count dead notification deliveries");
            MailQueueCheck::unavailable(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::collections::BTreeMap;

    #[test]
    fn fast_ping_with_empty_dead_letter_queue_should_be_healthy() {
        let state = determine_health_state(&CheckResult::success(20), &MailQueueCheck::counted(0));
        assert_eq!(state, HealthState::Healthy);
    }

    #[test]
    fn slow_ping_should_be_degraded() {
        let queue = MailQueueCheck::counted(0);
        assert_eq!(
            determine_health_state(&CheckResult::success(499), &queue),
            HealthState::Healthy
        );
        assert_eq!(
            determine_health_state(&CheckResult::success(500), &queue),
            HealthState::Degraded
        );
    }

    #[test]
    fn dead_deliveries_should_degrade() {
        let state = determine_health_state(&CheckResult::success(3), &MailQueueCheck::counted(4));
        assert_eq!(state, HealthState::Degraded);
    }

    #[test]
    fn failed_ping_should_be_unhealthy() {
        let queue = MailQueueCheck::default();
        assert_eq!(
            determine_health_state(&CheckResult::failure(5, "refused".to_string()), &queue),
            HealthState::Unhealthy
        );
        assert_eq!(
            determine_health_state(&CheckResult::timeout(3000), &queue),
            HealthState::Unhealthy
        );
    }

    #[tokio::test]
    async fn should_report_dead_delivery_count() {
        // Arrange
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![BTreeMap::from([(
                "num_items".to_string(),
                sea_orm::Value::BigInt(Some(2)),
            )])]])
            .into_connection();
        init_start_time();

        // Act
        let status = check_health(&db).await;

        // Assert
        assert_eq!(status.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(status.checks.mail_queue.dead_deliveries, Some(2));
        assert_eq!(status.status, HealthState::Degraded);
    }
}
