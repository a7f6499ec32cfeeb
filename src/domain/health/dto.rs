use serde::Serialize;
use utoipa::ToSchema;

/// 헬스체크 응답
#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: HealthState,
    #[schema(example = "0.1.0")]
    pub version: &'static str,
    /// 프로세스 가동 시간 (초)
    #[schema(example = 3600)]
    pub uptime_secs: u64,
    pub checks: HealthChecks,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    /// DB 응답이 느리거나 발송 포기된 알림이 쌓여 있음
    Degraded,
    /// DB에 연결할 수 없음
    Unhealthy,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthChecks {
    pub database: CheckResult,
    pub mail_queue: MailQueueCheck,
}

/// DB ping 결과
#[derive(Serialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    #[schema(example = true)]
    pub status: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = 12)]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckResult {
    pub fn success(latency_ms: u64) -> Self {
        Self {
            status: true,
            latency_ms: Some(latency_ms),
            error: None,
        }
    }

    pub fn failure(latency_ms: u64, error: String) -> Self {
        Self {
            status: false,
            latency_ms: Some(latency_ms),
            error: Some(error),
        }
    }

    pub fn timeout(limit_ms: u64) -> Self {
        Self::failure(limit_ms, "Timeout".to_string())
    }
}

/// 알림 발송 큐 상태 (DEAD 처리된 발송 건수)
#[derive(Serialize, Debug, Clone, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MailQueueCheck {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = 0)]
    pub dead_deliveries: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MailQueueCheck {
    pub fn counted(dead_deliveries: u64) -> Self {
        Self {
            dead_deliveries: Some(dead_deliveries),
            error: None,
        }
    }

    pub fn unavailable(error: String) -> Self {
        Self {
            dead_deliveries: None,
            error: Some(error),
        }
    }

    pub fn has_dead_letters(&self) -> bool {
        self.dead_deliveries.is_some_and(|n| n > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_should_be_a_failed_check() {
        let result = CheckResult::timeout(3000);

        assert!(!result.status);
        assert_eq!(result.latency_ms, Some(3000));
        assert_eq!(result.error.as_deref(), Some("Timeout"));
    }

    #[test]
    fn health_state_should_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&HealthState::Degraded).unwrap(),
            "\"degraded\""
        );
    }

    #[test]
    fn health_status_should_serialize_with_camel_case() {
        let status = HealthStatus {
            status: HealthState::Healthy,
            version: "0.1.0",
            uptime_secs: 3600,
            checks: HealthChecks {
                database: CheckResult::success(12),
                mail_queue: MailQueueCheck::counted(0),
            },
        };

        let json = serde_json::to_string(&status).unwrap();

        assert!(json.contains("\"uptimeSecs\""));
        assert!(json.contains("\"latencyMs\""));
        assert!(json.contains("\"mailQueue\":{\"deadDeliveries\":0}"));
        assert!(!json.contains("error"));
    }

    #[test]
    fn only_positive_count_should_mean_dead_letters() {
        assert!(!MailQueueCheck::counted(0).has_dead_letters());
        assert!(MailQueueCheck::counted(2).has_dead_letters());
        assert!(!MailQueueCheck::unavailable("db".to_string()).has_dead_letters());
    }
}
