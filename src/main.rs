use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use daftar_server::config::{establish_connection, AppConfig};
use daftar_server::domain::health::init_start_time;
use daftar_server::domain::notification::mailer::{HttpMailer, LogMailer, Mailer};
use daftar_server::domain::notification::worker::{NotificationWorker, WorkerConfig};
use daftar_server::global::shutdown::shutdown_and_notify;
use daftar_server::utils::logging::init_logging;
use daftar_server::{app, AppState};
use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 환경변수 로드
    dotenvy::dotenv().ok();

    // 2. 로깅 초기화 (guard는 종료 시까지 유지)
    let _log_guard = init_logging();
    init_start_time();

    // 3. 설정 및 DB 연결
    let config = AppConfig::from_env()?;
    let db = establish_connection(&config.database_url).await?;

    // 4. 메일 발송기 (릴레이 미설정 시 로그만 남김)
    let mailer: Arc<dyn Mailer> = if config.mail_relay_url.trim().is_empty() {
        tracing::warn!("MAIL_RELAY_URL is empty, e-mails will only be logged");
        Arc::new(LogMailer)
    } else {
        Arc::new(HttpMailer::new(
            config.mail_relay_url.clone(),
            config.mail_relay_api_key.clone(),
            config.mail_from.clone(),
        ))
    };

    // 5. 알림 워커 시작
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = tokio::spawn(NotificationWorker::run(
        db.clone(),
        mailer.clone(),
        WorkerConfig {
            poll_interval: Duration::from_secs(config.notification_poll_interval_secs),
            max_attempts: config.notification_max_attempts,
        },
        shutdown_rx,
    ));

    // 6. 서버 실행
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let state = AppState::new(db, config, mailer);
    let app = app(state);

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Swagger UI: http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_and_notify(shutdown_tx))
        .await?;

    if let Err(e) = worker.await {
        tracing::error!(error = %e, "Notification worker terminated abnormally");
    }

    tracing::info!("Server stopped");
    Ok(())
}
