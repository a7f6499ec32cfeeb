use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{info, Instrument};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 요청 단위 추적 ID (핸들러에서 Extension으로 꺼낼 수 있음)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// 클라이언트가 보낸 ID가 있으면 그대로, 없거나 비어 있으면 UUID v4
pub fn resolve_request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = resolve_request_id(request.headers());

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        uri = %path,
    );
    let start = std::time::Instant::now();

    async move {
        let mut response = next.run(request).await;
        let duration_ms = start.elapsed().as_millis() as u64;
        let status = response.status().as_u16();

        info!(duration_ms, status, "request completed");

        response.headers_mut().insert(
            REQUEST_ID_HEADER,
            HeaderValue::from_str(&request_id)
                .unwrap_or_else(|_| HeaderValue::from_static("unknown")),
        );
        response
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incoming_request_id_should_be_kept() {
        // Arrange
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("req-42"));

        // Act
        let id = resolve_request_id(&headers);

        // Assert
        assert_eq!(id, "req-42");
    }

    #[test]
    fn missing_or_blank_request_id_should_be_generated() {
        let mut blank = HeaderMap::new();
        blank.insert(REQUEST_ID_HEADER, HeaderValue::from_static("  "));

        for headers in [HeaderMap::new(), blank] {
            let id = resolve_request_id(&headers);
            assert!(Uuid::parse_str(&id).is_ok(), "{}", id);
        }
    }
}
