use tokio::signal;
use tokio::sync::watch;

/// SIGTERM 또는 Ctrl+C를 받으면 반환합니다.
///
/// 시그널 핸들러 설치에 실패한 쪽은 영원히 대기하고 다른 쪽 시그널만 기다립니다.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }

    tracing::info!("Initiating graceful shutdown...");
}

/// 시그널을 기다린 뒤 백그라운드 워커에 종료를 알립니다.
pub async fn shutdown_and_notify(workers: watch::Sender<bool>) {
    shutdown_signal().await;
    if workers.send(true).is_err() {
        tracing::debug!("No background worker is listening for shutdown");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn shutdown_signal_should_wait_for_signal() {
        let result = timeout(Duration::from_millis(10), shutdown_signal()).await;

        assert!(result.is_err(), "shutdown_signal should wait for signal");
    }

    #[tokio::test]
    async fn workers_should_not_be_notified_before_signal() {
        // Arrange
        let (tx, rx) = watch::channel(false);

        // Act
        let result = timeout(Duration::from_millis(10), shutdown_and_notify(tx)).await;

        // Assert
        assert!(result.is_err());
        assert!(!*rx.borrow());
    }
}
