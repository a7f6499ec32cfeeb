use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use daftar_server::config::AppConfig;
use daftar_server::domain::notification::mailer::LogMailer;
use daftar_server::domain::user::entity::user::{self, UserRole};
use daftar_server::utils::action_token::{ActionTokenSigner, InviteAction};
use daftar_server::utils::jwt::{encode_signup_token, encode_token};
use daftar_server::{app, AppState};
use http_body_util::BodyExt;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use serde_json::{json, Value};
use tower::ServiceExt;

// ===== Helper Functions =====

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

fn create_test_router(db: DatabaseConnection) -> Router {
    app(AppState::new(db, AppConfig::for_test(), Arc::new(LogMailer)))
}

fn access_token(user_id: i64) -> String {
    let config = AppConfig::for_test();
    encode_token(user_id.to_string(), &config.jwt_secret, 3600).unwrap()
}

async fn parse_response_body(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn create_json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn user_row(user_id: i64, role: UserRole, deleted: bool) -> user::Model {
    let now = Utc::now().naive_utc();
    user::Model {
        user_id,
        name: "Asha".to_string(),
        email: "asha@daftar.os".to_string(),
        role,
        phone: None,
        gender: None,
        date_of_birth: None,
        location: Some("Mumbai".to_string()),
        preferred_languages: json!(["English"]),
        deleted_on: deleted.then_some(now),
        created_at: now,
        updated_at: now,
    }
}

// ===== Health / Docs =====

mod health {
    use super::*;

    #[tokio::test]
    async fn should_return_status_and_version() {
        let app = create_test_router(empty_db());

        let response = app.oneshot(get_request("/health", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_response_body(response.into_body()).await;
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body["checks"]["database"].is_object());
    }

    #[tokio::test]
    async fn should_echo_request_id() {
        let app = create_test_router(empty_db());
        let request = Request::builder()
            .uri("/health")
            .header("x-request-id", "trace-123")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.headers()["x-request-id"], "trace-123");
    }

    #[tokio::test]
    async fn openapi_document_should_declare_bearer_scheme() {
        let app = create_test_router(empty_db());

        let response = app
            .oneshot(get_request("/api-docs/openapi.json", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_response_body(response.into_body()).await;
        assert!(body["components"]["securitySchemes"]["bearer_auth"].is_object());
        assert!(body["paths"]["/api/v1/pitches/{pitch_id}/offers"].is_object());
    }
}

// ===== Authentication =====

mod auth {
    use super::*;

    #[tokio::test]
    async fn should_return_401_without_token() {
        let app = create_test_router(empty_db());

        let response = app
            .oneshot(get_request("/api/v1/pitches", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = parse_response_body(response.into_body()).await;
        assert_eq!(body["isSuccess"], false);
        assert_eq!(body["code"], "AUTH4001");
        assert!(body["result"].is_null());
    }

    #[tokio::test]
    async fn should_reject_signup_token_on_regular_api() {
        let config = AppConfig::for_test();
        let signup = encode_signup_token("new@daftar.os".to_string(), &config.jwt_secret, 600)
            .unwrap();
        let app = create_test_router(empty_db());

        let response = app
            .oneshot(get_request("/api/v1/users/me", Some(&signup)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn should_reject_withdrawn_user() {
        // Arrange
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_row(7, UserRole::Founder, true)]])
            .into_connection();
        let app = create_test_router(db);

        // Act
        let response = app
            .oneshot(get_request("/api/v1/users/me", Some(&access_token(7))))
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn should_return_profile_for_active_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_row(7, UserRole::Investor, false)]])
            .into_connection();
        let app = create_test_router(db);

        let response = app
            .oneshot(get_request("/api/v1/users/me", Some(&access_token(7))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_response_body(response.into_body()).await;
        assert_eq!(body["isSuccess"], true);
        assert_eq!(body["code"], "COMMON200");
        assert_eq!(body["result"]["role"], "INVESTOR");
    }
}

// ===== Request validation =====

mod validation {
    use super::*;

    #[tokio::test]
    async fn should_return_400_for_blank_pitch_name() {
        let app = create_test_router(empty_db());

        let response = app
            .oneshot(create_json_request(
                "POST",
                "/api/v1/pitches",
                Some(&access_token(1)),
                json!({ "pitchName": "" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = parse_response_body(response.into_body()).await;
        assert_eq!(body["code"], "COMMON400");
    }

    #[tokio::test]
    async fn should_return_400_for_malformed_json() {
        let app = create_test_router(empty_db());
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/pitches/3/offers")
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", access_token(1)))
            .body(Body::from("{\"description\": "))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = parse_response_body(response.into_body()).await;
        assert_eq!(body["isSuccess"], false);
        assert_eq!(body["code"], "COMMON400");
        assert!(body["result"].is_null());
    }

    #[tokio::test]
    async fn should_return_400_for_out_of_range_rating() {
        let app = create_test_router(empty_db());

        let response = app
            .oneshot(create_json_request(
                "POST",
                "/api/v1/pitches/3/analysis",
                Some(&access_token(1)),
                json!({ "believeRating": 12, "shouldMeet": true, "analysis": "Strong" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

// ===== Team invite links =====

mod team_invite {
    use super::*;

    const RESPOND_URI: &str = "/api/v1/pitch-invitations/respond";

    #[tokio::test]
    async fn should_reject_token_signed_with_other_secret() {
        let forged = ActionTokenSigner::new("not-the-server-secret", 3600)
            .sign(5, 9, InviteAction::Accept, Utc::now().timestamp())
            .unwrap();
        let app = create_test_router(empty_db());

        let response = app
            .oneshot(create_json_request(
                "POST",
                RESPOND_URI,
                None,
                json!({ "token": forged }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = parse_response_body(response.into_body()).await;
        assert_eq!(body["isSuccess"], false);
    }

    #[tokio::test]
    async fn should_reject_empty_token() {
        let app = create_test_router(empty_db());

        let response = app
            .oneshot(create_json_request(
                "POST",
                RESPOND_URI,
                None,
                json!({ "token": "" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
