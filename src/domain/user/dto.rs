use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::entity::user::{self, Gender, UserRole};

/// 선호 언어 목록 검증 (빈 문자열 금지, 최대 10개)
fn validate_languages(languages: &[String]) -> Result<(), ValidationError> {
    if languages.len() > 10 {
        return Err(ValidationError::new("too_many_languages"));
    }
    if languages.iter().any(|l| l.trim().is_empty()) {
        return Err(ValidationError::new("empty_language"));
    }
    Ok(())
}

// ============== 가입 완료 ==============

/// 가입 완료 요청 DTO
///
/// 이메일은 Signup Token에서 가져옵니다.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    /// 이름 (1~50자)
    #[validate(length(min = 1, max = 50, message = "이름은 1~50자 이내로 입력해야 합니다"))]
    pub name: String,

    /// FOUNDER 또는 INVESTOR
    pub role: UserRole,

    #[validate(length(max = 20, message = "전화번호는 20자 이내로 입력해야 합니다"))]
    pub phone: Option<String>,

    pub gender: Option<Gender>,

    pub date_of_birth: Option<NaiveDate>,

    #[validate(length(max = 100, message = "지역은 100자 이내로 입력해야 합니다"))]
    pub location: Option<String>,

    #[serde(default)]
    #[validate(custom(
        function = "validate_languages",
        message = "선호 언어는 최대 10개까지 입력할 수 있습니다"
    ))]
    pub preferred_languages: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub user_id: i64,
    pub access_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessSignupResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: SignupResponse,
}

// ============== 프로필 ==============

/// 프로필 응답 DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    /// 생년월일 기준 만 나이
    pub age: Option<u32>,
    pub location: Option<String>,
    pub preferred_languages: Vec<String>,
}

impl ProfileResponse {
    pub fn from_model(model: &user::Model, age: Option<u32>) -> Self {
        Self {
            user_id: model.user_id,
            name: model.name.clone(),
            email: model.email.clone(),
            role: model.role,
            phone: model.phone.clone(),
            gender: model.gender,
            date_of_birth: model.date_of_birth,
            age,
            location: model.location.clone(),
            preferred_languages: model.languages(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessProfileResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: ProfileResponse,
}

/// 프로필 수정 요청 DTO (전달된 필드만 변경)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 50, message = "이름은 1~50자 이내로 입력해야 합니다"))]
    pub name: Option<String>,

    #[validate(length(max = 20, message = "전화번호는 20자 이내로 입력해야 합니다"))]
    pub phone: Option<String>,

    pub gender: Option<Gender>,

    pub date_of_birth: Option<NaiveDate>,

    #[validate(length(max = 100, message = "지역은 100자 이내로 입력해야 합니다"))]
    pub location: Option<String>,

    #[validate(custom(
        function = "validate_languages",
        message = "선호 언어는 최대 10개까지 입력할 수 있습니다"
    ))]
    pub preferred_languages: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_request_should_reject_empty_name() {
        // Arrange
        let req: SignupRequest =
            serde_json::from_str(r#"{"name":"","role":"FOUNDER"}"#).expect("valid json");

        // Act
        let result = req.validate();

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn signup_request_should_default_languages_to_empty() {
        let req: SignupRequest = serde_json::from_str(
            r#"{"name":"Asha","role":"INVESTOR","dateOfBirth":"1991-02-28"}"#,
        )
        .expect("valid json");

        assert!(req.validate().is_ok());
        assert!(req.preferred_languages.is_empty());
        assert_eq!(req.date_of_birth, NaiveDate::from_ymd_opt(1991, 2, 28));
    }

    #[test]
    fn blank_language_should_be_rejected() {
        let req = UpdateProfileRequest {
            preferred_languages: Some(vec!["Hindi".to_string(), " ".to_string()]),
            ..Default::default()
        };

        assert!(req.validate().is_err());
    }
}
