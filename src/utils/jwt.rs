use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::error::AppError;

const ACCESS_TOKEN_TYPE: &str = "access";
const SIGNUP_TOKEN_TYPE: &str = "signup";

/// JWT Claims 구조체
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (User ID)
    pub sub: String,
    /// Issued At
    pub iat: usize,
    /// Expiration
    pub exp: usize,
    /// Email (for signup token)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Token Type (access, signup)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

fn build_claims(
    sub: String,
    email: Option<String>,
    token_type: &str,
    expiration_seconds: i64,
) -> Result<Claims, AppError> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(Duration::seconds(expiration_seconds))
        .ok_or_else(|| AppError::InternalError("Invalid token expiration".to_string()))?;

    Ok(Claims {
        sub,
        iat: now.timestamp() as usize,
        exp: expiration.timestamp() as usize,
        email,
        token_type: Some(token_type.to_string()),
    })
}

/// JWT 토큰 생성 (Access Token)
pub fn encode_token(
    sub: String,
    secret: &str,
    expiration_seconds: i64,
) -> Result<String, AppError> {
    let claims = build_claims(sub, None, ACCESS_TOKEN_TYPE, expiration_seconds)?;

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalError(format!("Token creation failed: {}", e)))
}

/// Signup Token 생성
///
/// 외부 로그인 제공자가 가입 전 사용자에게 발급하는 토큰과 같은 형식입니다.
pub fn encode_signup_token(
    email: String,
    secret: &str,
    expiration_seconds: i64,
) -> Result<String, AppError> {
    // No user ID yet
    let claims = build_claims(
        String::new(),
        Some(email),
        SIGNUP_TOKEN_TYPE,
        expiration_seconds,
    )?;

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalError(format!("Signup token creation failed: {}", e)))
}

/// JWT 토큰 검증
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let validation = Validation::default();

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::Unauthorized("토큰이 만료되었습니다.".into())
        }
        _ => AppError::Unauthorized("유효하지 않은 토큰입니다.".into()),
    })
}

/// Access Token만 허용하는 검증
pub fn decode_access_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let claims = decode_token(token, secret)?;
    match claims.token_type.as_deref() {
        Some(ACCESS_TOKEN_TYPE) => Ok(claims),
        _ => Err(AppError::Unauthorized(
            "Access Token이 아닙니다.".to_string(),
        )),
    }
}

/// Signup Token만 허용하는 검증, 토큰에 담긴 이메일을 반환합니다.
pub fn decode_signup_token(token: &str, secret: &str) -> Result<String, AppError> {
    let claims = decode_token(token, secret)?;
    if claims.token_type.as_deref() != Some(SIGNUP_TOKEN_TYPE) {
        return Err(AppError::Unauthorized(
            "Signup Token이 아닙니다.".to_string(),
        ));
    }
    claims
        .email
        .filter(|email| !email.is_empty())
        .ok_or_else(|| AppError::Unauthorized("토큰에 이메일 정보가 없습니다.".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_and_decode() {
        let secret = "test_secret";
        let sub = "123".to_string();
        let expiration = 3600;

        let token = encode_token(sub.clone(), secret, expiration).expect("Token generation failed");
        let claims = decode_access_token(&token, secret).expect("Token validation failed");

        assert_eq!(claims.sub, sub);
    }

    #[test]
    fn test_invalid_token() {
        let secret = "test_secret";
        let result = decode_token("invalid_token", secret);
        assert!(result.is_err());
    }

    #[test]
    fn signup_token_should_not_be_accepted_as_access_token() {
        let secret = "test_secret";
        let token = encode_signup_token("founder@daftar.os".to_string(), secret, 600)
            .expect("Token generation failed");

        assert!(decode_access_token(&token, secret).is_err());
        assert_eq!(
            decode_signup_token(&token, secret).expect("signup token"),
            "founder@daftar.os"
        );
    }

    #[test]
    fn access_token_should_not_be_accepted_as_signup_token() {
        let secret = "test_secret";
        let token = encode_token("7".to_string(), secret, 600).expect("Token generation failed");

        assert!(decode_signup_token(&token, secret).is_err());
    }

    #[test]
    fn token_signed_with_other_secret_should_fail() {
        let token = encode_token("7".to_string(), "secret-a", 600).expect("Token generation failed");

        assert!(matches!(
            decode_access_token(&token, "secret-b"),
            Err(AppError::Unauthorized(_))
        ));
    }
}
