use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::entity::offer::{self, OfferStatus};
use crate::domain::user::entity::user;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOfferRequest {
    /// 투자 조건 등 오퍼 내용
    #[validate(length(min = 1, max = 5000, message = "오퍼 내용은 1~5000자 이내로 입력해야 합니다"))]
    pub description: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RespondOfferRequest {
    /// true: ACCEPTED, false: DECLINED
    pub accept: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfferResponse {
    pub offer_id: i64,
    pub pitch_id: i64,
    pub offer_by: i64,
    /// 오퍼를 낸 투자자 이름 (탈퇴한 경우 null)
    pub investor_name: Option<String>,
    pub offer_status: OfferStatus,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
}

impl OfferResponse {
    pub fn from_parts(model: offer::Model, investor: Option<user::Model>) -> Self {
        Self {
            offer_id: model.offer_id,
            pitch_id: model.pitch_id,
            offer_by: model.offer_by,
            investor_name: investor.filter(|u| !u.is_deleted()).map(|u| u.name),
            offer_status: model.offer_status,
            description: model.description,
            created_at: model.created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            updated_at: model.updated_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessOfferResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: OfferResponse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessOfferListResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: Vec<OfferResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_description_should_be_rejected() {
        // Arrange
        let req = CreateOfferRequest {
            description: String::new(),
        };

        // Act
        let result = req.validate();

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn response_should_serialize_status_in_screaming_case() {
        let now = chrono::NaiveDate::from_ymd_opt(2025, 3, 1)
            .and_then(|d| d.and_hms_opt(9, 30, 0))
            .expect("datetime");
        let model = offer::Model {
            offer_id: 1,
            pitch_id: 2,
            offer_by: 3,
            offer_status: OfferStatus::Pending,
            description: "10% for 1 Cr".to_string(),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(OfferResponse::from_parts(model, None)).expect("json");

        assert_eq!(json["offerStatus"], "PENDING");
        assert_eq!(json["createdAt"], "2025-03-01T09:30:00");
        assert!(json["investorName"].is_null());
    }
}
