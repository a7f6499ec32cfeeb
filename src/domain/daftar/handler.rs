use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::error::AppError;
use crate::utils::{AppJson, BaseResponse};

use super::dto::{
    CreateDaftarRequest, DaftarDetailResponse, DaftarResponse, InviteInvestorRequest,
    InviteInvestorResponse, RespondInviteRequest, SuccessDaftarDetailResponse,
    SuccessDaftarListResponse, SuccessDaftarResponse, SuccessInviteInvestorResponse,
};
use super::service::DaftarService;

/// 다프타 생성 API
///
/// 투자자만 생성할 수 있으며 생성자는 ACTIVE 멤버로 등록됩니다.
#[utoipa::path(
    post,
    path = "/api/v1/daftars",
    request_body = CreateDaftarRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "다프타 생성 성공", body = SuccessDaftarResponse),
        (status = 400, description = "잘못된 요청", body = ErrorResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse),
        (status = 403, description = "투자자가 아님", body = ErrorResponse)
    ),
    tag = "Daftar"
)]
pub async fn create_daftar(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<CreateDaftarRequest>,
) -> Result<Json<BaseResponse<DaftarResponse>>, AppError> {
    req.validate()?;

    let result = DaftarService::create_daftar(&state.db, user.user_id()?, req).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 내 다프타 목록 API
#[utoipa::path(
    get,
    path = "/api/v1/daftars",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "조회 성공", body = SuccessDaftarListResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse)
    ),
    tag = "Daftar"
)]
pub async fn list_my_daftars(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<BaseResponse<Vec<DaftarResponse>>>, AppError> {
    let result = DaftarService::list_my_daftars(&state.db, user.user_id()?).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 다프타 상세 API
#[utoipa::path(
    get,
    path = "/api/v1/daftars/{daftar_id}",
    params(
        ("daftar_id" = i64, Path, description = "다프타 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "조회 성공", body = SuccessDaftarDetailResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse),
        (status = 404, description = "존재하지 않거나 멤버가 아님", body = ErrorResponse)
    ),
    tag = "Daftar"
)]
pub async fn get_daftar(
    State(state): State<AppState>,
    user: AuthUser,
    Path(daftar_id): Path<i64>,
) -> Result<Json<BaseResponse<DaftarDetailResponse>>, AppError> {
    let result = DaftarService::get_daftar(&state.db, user.user_id()?, daftar_id).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 투자자 초대 API
#[utoipa::path(
    post,
    path = "/api/v1/daftars/{daftar_id}/invitations",
    params(
        ("daftar_id" = i64, Path, description = "다프타 ID")
    ),
    request_body = InviteInvestorRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "초대 성공", body = SuccessInviteInvestorResponse),
        (status = 400, description = "투자자가 아닌 사용자", body = ErrorResponse),
        (status = 404, description = "다프타 또는 사용자 없음", body = ErrorResponse),
        (status = 409, description = "이미 초대됨", body = ErrorResponse)
    ),
    tag = "Daftar"
)]
pub async fn invite_investor(
    State(state): State<AppState>,
    user: AuthUser,
    Path(daftar_id): Path<i64>,
    AppJson(req): AppJson<InviteInvestorRequest>,
) -> Result<Json<BaseResponse<InviteInvestorResponse>>, AppError> {
    req.validate()?;

    let result =
        DaftarService::invite_investor(&state.db, user.user_id()?, daftar_id, req).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 다프타 초대 응답 API
#[utoipa::path(
    post,
    path = "/api/v1/daftars/{daftar_id}/invitations/respond",
    params(
        ("daftar_id" = i64, Path, description = "다프타 ID")
    ),
    request_body = RespondInviteRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "처리 성공"),
        (status = 404, description = "초대 없음", body = ErrorResponse),
        (status = 409, description = "이미 처리된 초대", body = ErrorResponse)
    ),
    tag = "Daftar"
)]
pub async fn respond_to_invite(
    State(state): State<AppState>,
    user: AuthUser,
    Path(daftar_id): Path<i64>,
    AppJson(req): AppJson<RespondInviteRequest>,
) -> Result<Json<BaseResponse<()>>, AppError> {
    DaftarService::respond_to_invite(&state.db, user.user_id()?, daftar_id, req.accept).await?;

    let message = if req.accept {
        "다프타 초대를 수락했습니다."
    } else {
        "다프타 초대를 거절했습니다."
    };
    Ok(Json(BaseResponse::empty(message)))
}
