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
    ChangeScoutStatusRequest, CreateScoutRequest, DaftarScoutItem, InviteCollaboratorRequest,
    ScoutDetailResponse, ScoutResponse, SuccessDaftarScoutListResponse,
    SuccessScoutDetailResponse, SuccessScoutInsightsResponse, SuccessScoutListResponse,
    UpdateScoutRequest,
};
use super::insight::ScoutInsights;
use super::service::ScoutService;

/// 스카우트 생성 API
///
/// 다프타 멤버가 새 스카우트를 PLANNING 상태로 만듭니다. 질문을 비우면 기본 질문이 등록됩니다.
#[utoipa::path(
    post,
    path = "/api/v1/daftars/{daftar_id}/scouts",
    params(
        ("daftar_id" = i64, Path, description = "소유 다프타 ID")
    ),
    request_body = CreateScoutRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "생성 성공", body = SuccessScoutDetailResponse),
        (status = 400, description = "잘못된 요청", body = ErrorResponse),
        (status = 403, description = "투자자가 아님", body = ErrorResponse),
        (status = 404, description = "다프타 없음", body = ErrorResponse)
    ),
    tag = "Scout"
)]
pub async fn create_scout(
    State(state): State<AppState>,
    user: AuthUser,
    Path(daftar_id): Path<i64>,
    AppJson(req): AppJson<CreateScoutRequest>,
) -> Result<Json<BaseResponse<ScoutDetailResponse>>, AppError> {
    req.validate()?;

    let result = ScoutService::create_scout(&state.db, user.user_id()?, daftar_id, req).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 다프타의 스카우트 목록 API
#[utoipa::path(
    get,
    path = "/api/v1/daftars/{daftar_id}/scouts",
    params(
        ("daftar_id" = i64, Path, description = "다프타 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "조회 성공", body = SuccessDaftarScoutListResponse),
        (status = 404, description = "다프타 없음", body = ErrorResponse)
    ),
    tag = "Scout"
)]
pub async fn list_daftar_scouts(
    State(state): State<AppState>,
    user: AuthUser,
    Path(daftar_id): Path<i64>,
) -> Result<Json<BaseResponse<Vec<DaftarScoutItem>>>, AppError> {
    let result = ScoutService::list_daftar_scouts(&state.db, user.user_id()?, daftar_id).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 지원 가능한 스카우트 목록 API (창업자)
#[utoipa::path(
    get,
    path = "/api/v1/scouts/open",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "조회 성공", body = SuccessScoutListResponse),
        (status = 403, description = "창업자가 아님", body = ErrorResponse)
    ),
    tag = "Scout"
)]
pub async fn list_open_scouts(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<BaseResponse<Vec<ScoutResponse>>>, AppError> {
    let result = ScoutService::list_open_scouts(&state.db, user.user_id()?).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 스카우트 상세 API
#[utoipa::path(
    get,
    path = "/api/v1/scouts/{scout_id}",
    params(
        ("scout_id" = i64, Path, description = "스카우트 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "조회 성공", body = SuccessScoutDetailResponse),
        (status = 404, description = "스카우트 없음", body = ErrorResponse)
    ),
    tag = "Scout"
)]
pub async fn get_scout(
    State(state): State<AppState>,
    user: AuthUser,
    Path(scout_id): Path<i64>,
) -> Result<Json<BaseResponse<ScoutDetailResponse>>, AppError> {
    let result = ScoutService::get_scout(&state.db, user.user_id()?, scout_id).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 스카우트 수정 API
#[utoipa::path(
    patch,
    path = "/api/v1/scouts/{scout_id}",
    params(
        ("scout_id" = i64, Path, description = "스카우트 ID")
    ),
    request_body = UpdateScoutRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "수정 성공", body = SuccessScoutDetailResponse),
        (status = 400, description = "잘못된 요청", body = ErrorResponse),
        (status = 409, description = "잠긴 스카우트", body = ErrorResponse)
    ),
    tag = "Scout"
)]
pub async fn update_scout(
    State(state): State<AppState>,
    user: AuthUser,
    Path(scout_id): Path<i64>,
    AppJson(req): AppJson<UpdateScoutRequest>,
) -> Result<Json<BaseResponse<ScoutDetailResponse>>, AppError> {
    req.validate()?;

    let result = ScoutService::update_scout(&state.db, user.user_id()?, scout_id, req).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 스카우트 상태 변경 API
#[utoipa::path(
    patch,
    path = "/api/v1/scouts/{scout_id}/status",
    params(
        ("scout_id" = i64, Path, description = "스카우트 ID")
    ),
    request_body = ChangeScoutStatusRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "변경 성공"),
        (status = 409, description = "허용되지 않는 상태 변경", body = ErrorResponse)
    ),
    tag = "Scout"
)]
pub async fn change_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(scout_id): Path<i64>,
    AppJson(req): AppJson<ChangeScoutStatusRequest>,
) -> Result<Json<BaseResponse<ScoutResponse>>, AppError> {
    let result =
        ScoutService::change_status(&state.db, user.user_id()?, scout_id, req.status).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 공동 운영 다프타 초대 API
#[utoipa::path(
    post,
    path = "/api/v1/scouts/{scout_id}/collaborators",
    params(
        ("scout_id" = i64, Path, description = "스카우트 ID")
    ),
    request_body = InviteCollaboratorRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "초대 성공"),
        (status = 403, description = "소유 다프타 멤버가 아님", body = ErrorResponse),
        (status = 409, description = "이미 연결된 다프타", body = ErrorResponse)
    ),
    tag = "Scout"
)]
pub async fn invite_collaborator(
    State(state): State<AppState>,
    user: AuthUser,
    Path(scout_id): Path<i64>,
    AppJson(req): AppJson<InviteCollaboratorRequest>,
) -> Result<Json<BaseResponse<()>>, AppError> {
    ScoutService::invite_collaborator(&state.db, user.user_id()?, scout_id, req.daftar_id)
        .await?;

    Ok(Json(BaseResponse::empty("공동 운영 초대를 보냈습니다.")))
}

/// 공동 운영 초대 수락 API
#[utoipa::path(
    post,
    path = "/api/v1/scouts/{scout_id}/collaborators/{daftar_id}/accept",
    params(
        ("scout_id" = i64, Path, description = "스카우트 ID"),
        ("daftar_id" = i64, Path, description = "초대받은 다프타 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "수락 성공"),
        (status = 404, description = "초대 없음", body = ErrorResponse),
        (status = 409, description = "이미 수락됨", body = ErrorResponse)
    ),
    tag = "Scout"
)]
pub async fn accept_collaboration(
    State(state): State<AppState>,
    user: AuthUser,
    Path((scout_id, daftar_id)): Path<(i64, i64)>,
) -> Result<Json<BaseResponse<()>>, AppError> {
    ScoutService::accept_collaboration(&state.db, user.user_id()?, scout_id, daftar_id).await?;

    Ok(Json(BaseResponse::empty("공동 운영 초대를 수락했습니다.")))
}

/// 스카우트 통계 API
///
/// 상태별 피치 수, 창업자 성별 비율, 평균 나이, NPS를 반환합니다.
#[utoipa::path(
    get,
    path = "/api/v1/scouts/{scout_id}/insights",
    params(
        ("scout_id" = i64, Path, description = "스카우트 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "조회 성공", body = SuccessScoutInsightsResponse),
        (status = 404, description = "스카우트 없음", body = ErrorResponse)
    ),
    tag = "Scout"
)]
pub async fn get_insights(
    State(state): State<AppState>,
    user: AuthUser,
    Path(scout_id): Path<i64>,
) -> Result<Json<BaseResponse<ScoutInsights>>, AppError> {
    let result = ScoutService::get_insights(&state.db, user.user_id()?, scout_id).await?;

    Ok(Json(BaseResponse::success(result)))
}
