use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::entity::daftar_scout;
use super::entity::scout::{self, ScoutStatus};
use super::entity::scout_question;
use super::insight::ScoutInsights;
use crate::domain::user::entity::user::Gender;

/// 질문 목록 검증 (최대 10개, 각 1~300자)
fn validate_questions(questions: &[String]) -> Result<(), ValidationError> {
    if questions.len() > 10 {
        return Err(ValidationError::new("too_many_questions"));
    }
    if questions
        .iter()
        .any(|q| q.trim().is_empty() || q.chars().count() > 300)
    {
        return Err(ValidationError::new("question_length"));
    }
    Ok(())
}

// ============== 스카우트 생성/수정 ==============

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateScoutRequest {
    #[validate(length(min = 1, max = 100, message = "스카우트 이름은 1~100자 이내로 입력해야 합니다"))]
    pub name: String,

    #[validate(length(max = 2000, message = "설명은 2000자를 초과할 수 없습니다"))]
    pub description: Option<String>,

    /// 대상 지역 ("all"이면 제한 없음)
    pub location: Option<String>,

    #[validate(range(min = 0, max = 120, message = "나이는 0~120 사이여야 합니다"))]
    pub min_age: Option<i32>,

    #[validate(range(min = 0, max = 120, message = "나이는 0~120 사이여야 합니다"))]
    pub max_age: Option<i32>,

    pub gender: Option<Gender>,
    pub community: Option<String>,
    pub sector: Option<String>,
    pub stage: Option<String>,
    pub program_launch_date: Option<NaiveDate>,
    pub last_day_to_pitch: Option<NaiveDate>,

    /// 창업자가 영상으로 답할 질문 (비어 있으면 기본 질문 사용)
    #[serde(default)]
    #[validate(custom(
        function = "validate_questions",
        message = "질문은 최대 10개, 각 1~300자여야 합니다"
    ))]
    pub questions: Vec<String>,
}

/// 스카우트 수정 요청 (전달된 필드만 변경, questions가 있으면 전체 교체)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScoutRequest {
    #[validate(length(min = 1, max = 100, message = "스카우트 이름은 1~100자 이내로 입력해야 합니다"))]
    pub name: Option<String>,

    #[validate(length(max = 2000, message = "설명은 2000자를 초과할 수 없습니다"))]
    pub description: Option<String>,

    pub location: Option<String>,

    #[validate(range(min = 0, max = 120, message = "나이는 0~120 사이여야 합니다"))]
    pub min_age: Option<i32>,

    #[validate(range(min = 0, max = 120, message = "나이는 0~120 사이여야 합니다"))]
    pub max_age: Option<i32>,

    pub gender: Option<Gender>,
    pub community: Option<String>,
    pub sector: Option<String>,
    pub stage: Option<String>,
    pub program_launch_date: Option<NaiveDate>,
    pub last_day_to_pitch: Option<NaiveDate>,

    #[validate(custom(
        function = "validate_questions",
        message = "질문은 최대 10개, 각 1~300자여야 합니다"
    ))]
    pub questions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeScoutStatusRequest {
    pub status: ScoutStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteCollaboratorRequest {
    /// 공동 운영으로 초대할 다프타 ID
    pub daftar_id: i64,
}

// ============== 응답 ==============

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoutResponse {
    pub scout_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub gender: Option<Gender>,
    pub community: Option<String>,
    pub sector: Option<String>,
    pub stage: Option<String>,
    pub program_launch_date: Option<NaiveDate>,
    pub last_day_to_pitch: Option<NaiveDate>,
    pub status: ScoutStatus,
    pub is_locked: bool,
    pub is_archived: bool,
}

impl From<scout::Model> for ScoutResponse {
    fn from(model: scout::Model) -> Self {
        Self {
            scout_id: model.scout_id,
            name: model.name,
            description: model.description,
            location: model.location,
            min_age: model.min_age,
            max_age: model.max_age,
            gender: model.gender,
            community: model.community,
            sector: model.sector,
            stage: model.stage,
            program_launch_date: model.program_launch_date,
            last_day_to_pitch: model.last_day_to_pitch,
            status: model.status,
            is_locked: model.is_locked,
            is_archived: model.is_archived,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoutQuestionItem {
    pub question_id: i64,
    pub question: String,
    pub position: i32,
}

impl From<scout_question::Model> for ScoutQuestionItem {
    fn from(model: scout_question::Model) -> Self {
        Self {
            question_id: model.scout_question_id,
            question: model.question,
            position: model.position,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoutDetailResponse {
    pub scout: ScoutResponse,
    pub questions: Vec<ScoutQuestionItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessScoutDetailResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: ScoutDetailResponse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessScoutListResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: Vec<ScoutResponse>,
}

/// 다프타 기준 스카우트 목록 항목
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DaftarScoutItem {
    pub scout: ScoutResponse,
    pub is_owner: bool,
    /// 공동 운영 초대를 아직 수락하지 않음
    pub is_pending: bool,
}

impl DaftarScoutItem {
    pub fn from_parts(link: daftar_scout::Model, scout: scout::Model) -> Self {
        Self {
            scout: scout.into(),
            is_owner: link.is_owner,
            is_pending: link.is_pending,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessDaftarScoutListResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: Vec<DaftarScoutItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessScoutInsightsResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: ScoutInsights,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_should_default_questions_to_empty() {
        // Arrange
        let json = r#"{"name":"Seed Sprint","minAge":21,"maxAge":35,"gender":"FEMALE"}"#;

        // Act
        let req: CreateScoutRequest = serde_json::from_str(json).expect("json");

        // Assert
        assert!(req.validate().is_ok());
        assert!(req.questions.is_empty());
        assert_eq!(req.gender, Some(Gender::Female));
    }

    #[test]
    fn blank_question_should_be_rejected() {
        let req = UpdateScoutRequest {
            questions: Some(vec!["Who are you?".to_string(), "   ".to_string()]),
            ..Default::default()
        };

        assert!(req.validate().is_err());
    }

    #[test]
    fn out_of_range_age_should_be_rejected() {
        let req: CreateScoutRequest =
            serde_json::from_str(r#"{"name":"Seed Sprint","maxAge":200}"#).expect("json");

        assert!(req.validate().is_err());
    }

    #[test]
    fn status_should_deserialize_from_screaming_case() {
        let req: ChangeScoutStatusRequest =
            serde_json::from_str(r#"{"status":"SCHEDULED"}"#).expect("json");

        assert_eq!(req.status, ScoutStatus::Scheduled);
    }
}
