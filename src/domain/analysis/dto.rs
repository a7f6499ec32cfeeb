use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::entity::investor_pitch::{self, AnalysisStatus};
use crate::domain::user::entity::user;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnalysisRequest {
    /// 창업팀에 대한 확신 (0~10)
    #[validate(range(min = 0, max = 10, message = "평점은 0~10 사이여야 합니다"))]
    pub believe_rating: i32,

    /// 창업팀과 미팅할 의향
    pub should_meet: bool,

    #[validate(length(min = 1, max = 5000, message = "분석 내용은 1~5000자 이내로 입력해야 합니다"))]
    pub analysis: String,
}

/// 작성 중인 분석 (제출 전이라 내용이 비어 있어도 됩니다)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveAnalysisDraftRequest {
    #[validate(range(min = 0, max = 10, message = "평점은 0~10 사이여야 합니다"))]
    pub believe_rating: i32,

    pub should_meet: bool,

    #[validate(length(max = 5000, message = "분석 내용은 5000자 이내로 입력해야 합니다"))]
    #[serde(default)]
    pub analysis: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub investor_pitch_id: i64,
    pub pitch_id: i64,
    pub investor_id: i64,
    pub investor_name: Option<String>,
    pub believe_rating: i32,
    pub should_meet: bool,
    pub analysis: String,
    pub status: AnalysisStatus,
    pub submitted_at: Option<String>,
}

impl AnalysisResponse {
    pub fn from_parts(model: investor_pitch::Model, investor: Option<user::Model>) -> Self {
        Self {
            investor_pitch_id: model.investor_pitch_id,
            pitch_id: model.pitch_id,
            investor_id: model.investor_id,
            investor_name: investor.filter(|u| !u.is_deleted()).map(|u| u.name),
            believe_rating: model.believe_rating,
            should_meet: model.should_meet,
            analysis: model.analysis,
            status: model.status,
            submitted_at: model
                .submitted_at
                .map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessAnalysisResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: AnalysisResponse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessAnalysisListResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: Vec<AnalysisResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_above_ten_should_be_rejected() {
        // Arrange
        let req = SubmitAnalysisRequest {
            believe_rating: 11,
            should_meet: true,
            analysis: "Strong team".to_string(),
        };

        // Act
        let result = req.validate();

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn boundary_ratings_should_pass() {
        for rating in [0, 10] {
            let req = SubmitAnalysisRequest {
                believe_rating: rating,
                should_meet: false,
                analysis: "ok".to_string(),
            };
            assert!(req.validate().is_ok(), "rating {}", rating);
        }
    }

    #[test]
    fn empty_draft_should_pass_validation() {
        let req = SaveAnalysisDraftRequest {
            believe_rating: 5,
            should_meet: false,
            analysis: String::new(),
        };

        assert!(req.validate().is_ok());
    }
}
