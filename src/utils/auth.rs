use axum::{
    async_trait,
    extract::FromRequestParts,
    http::header::{AUTHORIZATION, COOKIE},
    http::request::Parts,
};

use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::jwt::{decode_access_token, Claims};

/// Access Token 쿠키 이름
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// 인증된 사용자 정보를 담는 Extractor
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// JWT Claims에서 사용자 ID를 추출합니다.
    pub fn user_id(&self) -> Result<i64, AppError> {
        self.0
            .sub
            .parse()
            .map_err(|_| AppError::Unauthorized("유효하지 않은 사용자 ID입니다.".to_string()))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts)?;

        // 토큰 검증 및 디코딩 (access token만 허용)
        let claims = decode_access_token(&token, &state.config.jwt_secret)?;

        Ok(AuthUser(claims))
    }
}

/// 가입 완료 API 전용: Signup Token 원문을 꺼내는 Extractor
pub struct BearerToken(pub String);

#[async_trait]
impl FromRequestParts<AppState> for BearerToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        extract_bearer_token(parts).map(BearerToken)
    }
}

/// 1. Authorization 헤더, 2. 쿠키 순서로 토큰 추출
fn extract_bearer_token(parts: &Parts) -> Result<String, AppError> {
    if let Some(auth_header) = parts.headers.get(AUTHORIZATION) {
        let auth_header_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("잘못된 헤더 형식입니다.".to_string()))?;

        return auth_header_str
            .strip_prefix("Bearer ")
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::Unauthorized("토큰 형식이 올바르지 않습니다.".to_string()));
    }

    extract_token_from_cookie(parts)
}

/// 쿠키에서 access_token 추출
fn extract_token_from_cookie(parts: &Parts) -> Result<String, AppError> {
    let cookie_header = parts
        .headers
        .get(COOKIE)
        .ok_or_else(|| AppError::Unauthorized("로그인이 필요합니다.".to_string()))?;

    let cookie_str = cookie_header
        .to_str()
        .map_err(|_| AppError::Unauthorized("잘못된 쿠키 형식입니다.".to_string()))?;

    // 쿠키 파싱: "name1=value1; name2=value2" 형식
    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some(value) = cookie.strip_prefix(&format!("{}=", ACCESS_TOKEN_COOKIE)) {
            if !value.is_empty() {
                return Ok(value.to_string());
            }
        }
    }

    Err(AppError::Unauthorized("로그인이 필요합니다.".to_string()))
}
