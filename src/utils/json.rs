use axum::extract::FromRequest;

use super::error::AppError;

/// `axum::Json` 요청 본문 추출기
///
/// 본문 파싱 실패도 공통 에러 응답(`COMMON400`)으로 내려갑니다.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[allow(dead_code)]
        name: String,
    }

    fn json_request(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("Content-Type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn truncated_body_should_become_json_parse_error() {
        // Arrange
        let request = json_request("{\"name\": ");

        // Act
        let result = AppJson::<Sample>::from_request(request, &()).await;

        // Assert
        let err = result.unwrap_err();
        assert!(matches!(err, AppError::JsonParseFailed(_)));
        assert_eq!(err.error_code(), "COMMON400");
    }

    #[tokio::test]
    async fn missing_content_type_should_be_rejected() {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from("{\"name\": \"Chai\"}"))
            .unwrap();

        let result = AppJson::<Sample>::from_request(request, &()).await;

        assert!(matches!(result, Err(AppError::JsonParseFailed(_))));
    }

    #[tokio::test]
    async fn well_formed_body_should_deserialize() {
        let result = AppJson::<Sample>::from_request(json_request("{\"name\": \"Chai\"}"), &()).await;

        assert!(result.is_ok());
    }
}
