use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::entity::daftar;
use super::entity::daftar_investor::{self, DaftarMemberStatus};
use crate::domain::user::entity::user;

// ============== 다프타 생성 ==============

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDaftarRequest {
    /// 다프타 이름 (1~100자)
    #[validate(length(min = 1, max = 100, message = "다프타 이름은 1~100자 이내로 입력해야 합니다"))]
    pub name: String,

    /// 조직 형태 (예: VC, Angel Network, Family Office)
    #[validate(length(min = 1, max = 50, message = "조직 형태는 1~50자 이내로 입력해야 합니다"))]
    pub structure: String,

    #[validate(url(message = "웹사이트 주소 형식이 올바르지 않습니다"))]
    pub website: Option<String>,

    #[validate(length(max = 100, message = "지역은 100자 이내로 입력해야 합니다"))]
    pub location: Option<String>,

    /// 생성자의 직함 (기본값: Owner)
    #[validate(length(min = 1, max = 50, message = "직함은 1~50자 이내로 입력해야 합니다"))]
    pub designation: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DaftarResponse {
    pub daftar_id: i64,
    pub name: String,
    pub structure: String,
    pub website: Option<String>,
    pub location: Option<String>,
    pub created_by: i64,
    pub created_at: String,
}

impl From<daftar::Model> for DaftarResponse {
    fn from(model: daftar::Model) -> Self {
        Self {
            daftar_id: model.daftar_id,
            name: model.name,
            structure: model.structure,
            website: model.website,
            location: model.location,
            created_by: model.created_by,
            created_at: model.created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessDaftarResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: DaftarResponse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessDaftarListResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: Vec<DaftarResponse>,
}

// ============== 다프타 상세 ==============

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DaftarMemberItem {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub designation: String,
    pub status: DaftarMemberStatus,
}

impl DaftarMemberItem {
    pub fn from_parts(membership: daftar_investor::Model, investor: user::Model) -> Self {
        Self {
            user_id: investor.user_id,
            name: investor.name,
            email: investor.email,
            designation: membership.designation,
            status: membership.status,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DaftarDetailResponse {
    pub daftar: DaftarResponse,
    pub members: Vec<DaftarMemberItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessDaftarDetailResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: DaftarDetailResponse,
}

// ============== 투자자 초대 ==============

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteInvestorRequest {
    #[validate(email(message = "이메일 형식이 올바르지 않습니다"))]
    pub email: String,

    #[validate(length(min = 1, max = 50, message = "직함은 1~50자 이내로 입력해야 합니다"))]
    pub designation: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteInvestorResponse {
    pub daftar_investor_id: i64,
    pub investor_id: i64,
    pub status: DaftarMemberStatus,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessInviteInvestorResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: InviteInvestorResponse,
}

/// 초대 응답 요청 (수락/거절)
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RespondInviteRequest {
    pub accept: bool,
}
