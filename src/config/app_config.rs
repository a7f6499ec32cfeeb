use std::env;
use std::str::FromStr;

/// 애플리케이션 설정
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: i64,

    // 팀 초대 링크 서명
    pub action_token_secret: String,
    pub action_token_ttl: i64,

    /// 이메일 본문 링크의 기준 URL
    pub app_base_url: String,

    // Mail relay (비어 있으면 발송 없이 로그만 남김)
    pub mail_relay_url: String,
    pub mail_relay_api_key: String,
    pub mail_from: String,

    // Notification worker
    pub notification_poll_interval_secs: u64,
    pub notification_max_attempts: i32,
}

impl AppConfig {
    /// 환경 변수에서 설정 로드
    pub fn from_env() -> Result<Self, ConfigError> {
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!(
                "JWT_SECRET 환경변수가 설정되지 않았습니다. 프로덕션 환경에서는 반드시 설정하세요."
            );
            "secret".to_string()
        });

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .unwrap_or_else(|_| "86400".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidExpiration)?;

        let action_token_secret = env::var("ACTION_TOKEN_SECRET").unwrap_or_else(|_| {
            tracing::warn!("ACTION_TOKEN_SECRET 환경변수가 없어 JWT_SECRET을 사용합니다.");
            jwt_secret.clone()
        });

        let action_token_ttl = env::var("ACTION_TOKEN_TTL")
            .unwrap_or_else(|_| "604800".to_string())
            .parse::<i64>()
            .ok()
            .filter(|ttl| *ttl > 0)
            .ok_or(ConfigError::InvalidExpiration)?;

        let app_base_url =
            env::var("APP_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let mail_relay_url = env::var("MAIL_RELAY_URL").unwrap_or_default();
        let mail_relay_api_key = env::var("MAIL_RELAY_API_KEY").unwrap_or_default();
        let mail_from = env::var("MAIL_FROM").unwrap_or_else(|_| "no-reply@daftar.os".to_string());
        if mail_relay_url.is_empty() {
            tracing::warn!("MAIL_RELAY_URL이 설정되지 않아 이메일은 로그로만 기록됩니다.");
        }

        let notification_poll_interval_secs = at_least_one(
            "NOTIFICATION_POLL_INTERVAL_SECS",
            &env::var("NOTIFICATION_POLL_INTERVAL_SECS").unwrap_or_else(|_| "5".to_string()),
        )?;

        let notification_max_attempts = at_least_one(
            "NOTIFICATION_MAX_ATTEMPTS",
            &env::var("NOTIFICATION_MAX_ATTEMPTS").unwrap_or_else(|_| "5".to_string()),
        )?;

        Ok(Self {
            server_port,
            database_url,
            jwt_secret,
            jwt_expiration,
            action_token_secret,
            action_token_ttl,
            app_base_url,
            mail_relay_url,
            mail_relay_api_key,
            mail_from,
            notification_poll_interval_secs,
            notification_max_attempts,
        })
    }

    /// 테스트용 기본 설정
    pub fn for_test() -> Self {
        Self {
            server_port: 0,
            database_url: String::new(),
            jwt_secret: "test-secret".to_string(),
            jwt_expiration: 3600,
            action_token_secret: "test-action-secret".to_string(),
            action_token_ttl: 3600,
            app_base_url: "http://localhost:3000".to_string(),
            mail_relay_url: String::new(),
            mail_relay_api_key: String::new(),
            mail_from: "no-reply@daftar.os".to_string(),
            notification_poll_interval_secs: 5,
            notification_max_attempts: 5,
        }
    }
}

/// 0 이하는 워커 주기/재시도 횟수로 쓸 수 없으므로 거부합니다.
fn at_least_one<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + From<u8>,
{
    raw.trim()
        .parse::<T>()
        .ok()
        .filter(|value| *value >= T::from(1))
        .ok_or(ConfigError::InvalidNumber(key))
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,
    #[error("Invalid expiration time")]
    InvalidExpiration,
    #[error("DATABASE_URL environment variable is required")]
    MissingDatabaseUrl,
    #[error("Invalid number for {0}")]
    InvalidNumber(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_poll_interval_should_be_rejected() {
        let result = at_least_one::<u64>("NOTIFICATION_POLL_INTERVAL_SECS", "0");

        assert_eq!(
            result,
            Err(ConfigError::InvalidNumber("NOTIFICATION_POLL_INTERVAL_SECS"))
        );
    }

    #[test]
    fn non_positive_max_attempts_should_be_rejected() {
        for raw in ["0", "-3", "five", ""] {
            let result = at_least_one::<i32>("NOTIFICATION_MAX_ATTEMPTS", raw);
            assert_eq!(
                result,
                Err(ConfigError::InvalidNumber("NOTIFICATION_MAX_ATTEMPTS")),
                "{:?}",
                raw
            );
        }
    }

    #[test]
    fn positive_values_should_parse() {
        assert_eq!(at_least_one::<u64>("K", "1"), Ok(1));
        assert_eq!(at_least_one::<i32>("K", " 7 "), Ok(7));
    }
}
