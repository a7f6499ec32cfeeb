use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::entity::pitch::{self, InvestorStatus, PitchStatus};
use super::entity::pitch_answer;
use super::entity::pitch_team::{self, TeamMemberStatus};
use crate::domain::user::entity::user;
use crate::utils::action_token::InviteAction;

fn format_datetime(value: chrono::NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M:%S").to_string()
}

// ============== 피치 생성 ==============

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePitchRequest {
    #[validate(length(min = 1, max = 100, message = "피치 이름은 1~100자 이내로 입력해야 합니다"))]
    pub pitch_name: String,

    /// 생성자의 팀 내 직함 (기본값: Founder)
    #[validate(length(min = 1, max = 50, message = "직함은 1~50자 이내로 입력해야 합니다"))]
    pub designation: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PitchResponse {
    pub pitch_id: i64,
    pub pitch_name: String,
    /// 아직 제출하지 않은 피치는 null
    pub scout_id: Option<i64>,
    pub status: PitchStatus,
    pub investor_status: InvestorStatus,
    pub is_completed: bool,
    pub is_paid: bool,
    pub is_locked: bool,
    pub created_by: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<pitch::Model> for PitchResponse {
    fn from(model: pitch::Model) -> Self {
        Self {
            pitch_id: model.pitch_id,
            pitch_name: model.pitch_name,
            scout_id: model.scout_id,
            status: model.status,
            investor_status: model.investor_status,
            is_completed: model.is_completed,
            is_paid: model.is_paid,
            is_locked: model.is_locked,
            created_by: model.created_by,
            created_at: format_datetime(model.created_at),
            updated_at: format_datetime(model.updated_at),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessPitchResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: PitchResponse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessPitchListResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: Vec<PitchResponse>,
}

// ============== 피치 상세 ==============

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PitchAnswerItem {
    pub question_id: i64,
    pub video_url: String,
    pub updated_at: String,
}

impl From<pitch_answer::Model> for PitchAnswerItem {
    fn from(model: pitch_answer::Model) -> Self {
        Self {
            question_id: model.question_id,
            video_url: model.video_url,
            updated_at: format_datetime(model.updated_at),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberItem {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub designation: String,
    pub status: TeamMemberStatus,
    pub invited_at: String,
}

impl TeamMemberItem {
    pub fn from_parts(member: pitch_team::Model, founder: user::Model) -> Self {
        Self {
            user_id: founder.user_id,
            name: founder.name,
            email: founder.email,
            designation: member.designation,
            status: member.status,
            invited_at: format_datetime(member.invited_at),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PitchDetailResponse {
    pub pitch: PitchResponse,
    pub answers: Vec<PitchAnswerItem>,
    pub team: Vec<TeamMemberItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessPitchDetailResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: PitchDetailResponse,
}

// ============== 답변/제출/결정 ==============

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveAnswerRequest {
    pub question_id: i64,

    /// 업로드가 끝난 영상 URL
    #[validate(url(message = "영상 URL 형식이 올바르지 않습니다"))]
    pub video_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessPitchAnswerResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: PitchAnswerItem,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPitchRequest {
    pub scout_id: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecidePitchRequest {
    /// true: ACCEPTED, false: DECLINED
    pub accept: bool,
}

/// 스카우트 피치 목록 필터
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoutPitchQuery {
    pub status: Option<PitchStatus>,
}

// ============== 팀 초대 ==============

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteMemberRequest {
    #[validate(email(message = "이메일 형식이 올바르지 않습니다"))]
    pub email: String,

    #[validate(length(min = 1, max = 50, message = "직함은 1~50자 이내로 입력해야 합니다"))]
    pub designation: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteMemberResponse {
    pub pitch_team_id: i64,
    pub user_id: i64,
    pub status: TeamMemberStatus,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessInviteMemberResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: InviteMemberResponse,
}

/// 이메일 링크의 토큰으로 초대에 응답
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RespondTeamInviteRequest {
    #[validate(length(min = 1, message = "token은 필수입니다"))]
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamInviteResult {
    pub pitch_id: i64,
    pub user_id: i64,
    /// accept 또는 decline
    pub action: String,
}

impl TeamInviteResult {
    pub fn new(pitch_id: i64, user_id: i64, action: InviteAction) -> Self {
        Self {
            pitch_id,
            user_id,
            action: action.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessTeamInviteResultResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: TeamInviteResult,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessTeamListResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: Vec<TeamMemberItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scout_pitch_query_should_parse_status_filter() {
        // Arrange
        let raw = r#"{"status":"INBOX"}"#;

        // Act
        let query: ScoutPitchQuery = serde_json::from_str(raw).expect("json");

        // Assert
        assert_eq!(query.status, Some(PitchStatus::Inbox));
    }

    #[test]
    fn answer_request_should_require_url() {
        let req = SaveAnswerRequest {
            question_id: 1,
            video_url: "intro.mp4".to_string(),
        };

        assert!(req.validate().is_err());
    }

    #[test]
    fn invite_result_should_expose_action_name() {
        let result = TeamInviteResult::new(3, 9, InviteAction::Decline);

        let json = serde_json::to_value(&result).expect("serialize");

        assert_eq!(json["action"], "decline");
        assert_eq!(json["pitchId"], 3);
    }
}
