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
    AnalysisResponse, SaveAnalysisDraftRequest, SubmitAnalysisRequest,
    SuccessAnalysisListResponse, SuccessAnalysisResponse,
};
use super::service::AnalysisService;

/// 피치 분석 제출 API (투자자)
///
/// 투자자마다 피치당 한 번만 제출할 수 있습니다.
#[utoipa::path(
    post,
    path = "/api/v1/pitches/{pitch_id}/analysis",
    params(
        ("pitch_id" = i64, Path, description = "피치 ID")
    ),
    request_body = SubmitAnalysisRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "제출 성공", body = SuccessAnalysisResponse),
        (status = 400, description = "잘못된 요청", body = ErrorResponse),
        (status = 409, description = "이미 제출함", body = ErrorResponse)
    ),
    tag = "Analysis"
)]
pub async fn submit_analysis(
    State(state): State<AppState>,
    user: AuthUser,
    Path(pitch_id): Path<i64>,
    AppJson(req): AppJson<SubmitAnalysisRequest>,
) -> Result<Json<BaseResponse<AnalysisResponse>>, AppError> {
    req.validate()?;

    let result =
        AnalysisService::submit_analysis(&state.db, user.user_id()?, pitch_id, req).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 분석 임시 저장 API (투자자)
#[utoipa::path(
    put,
    path = "/api/v1/pitches/{pitch_id}/analysis/draft",
    params(
        ("pitch_id" = i64, Path, description = "피치 ID")
    ),
    request_body = SaveAnalysisDraftRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "저장 성공", body = SuccessAnalysisResponse),
        (status = 400, description = "잘못된 요청", body = ErrorResponse),
        (status = 409, description = "이미 제출함", body = ErrorResponse)
    ),
    tag = "Analysis"
)]
pub async fn save_analysis_draft(
    State(state): State<AppState>,
    user: AuthUser,
    Path(pitch_id): Path<i64>,
    AppJson(req): AppJson<SaveAnalysisDraftRequest>,
) -> Result<Json<BaseResponse<AnalysisResponse>>, AppError> {
    req.validate()?;

    let result = AnalysisService::save_draft(&state.db, user.user_id()?, pitch_id, req).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 내 분석 조회 API
#[utoipa::path(
    get,
    path = "/api/v1/pitches/{pitch_id}/analysis/me",
    params(
        ("pitch_id" = i64, Path, description = "피치 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "조회 성공", body = SuccessAnalysisResponse),
        (status = 404, description = "작성한 분석 없음", body = ErrorResponse)
    ),
    tag = "Analysis"
)]
pub async fn get_my_analysis(
    State(state): State<AppState>,
    user: AuthUser,
    Path(pitch_id): Path<i64>,
) -> Result<Json<BaseResponse<AnalysisResponse>>, AppError> {
    let result = AnalysisService::get_my_analysis(&state.db, user.user_id()?, pitch_id).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 팀 분석 목록 API
///
/// 본인 분석을 제출한 투자자만 조회할 수 있습니다.
#[utoipa::path(
    get,
    path = "/api/v1/pitches/{pitch_id}/analyses",
    params(
        ("pitch_id" = i64, Path, description = "피치 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "조회 성공", body = SuccessAnalysisListResponse),
        (status = 403, description = "본인 분석 미제출", body = ErrorResponse)
    ),
    tag = "Analysis"
)]
pub async fn list_team_analyses(
    State(state): State<AppState>,
    user: AuthUser,
    Path(pitch_id): Path<i64>,
) -> Result<Json<BaseResponse<Vec<AnalysisResponse>>>, AppError> {
    let result =
        AnalysisService::list_team_analyses(&state.db, user.user_id()?, pitch_id).await?;

    Ok(Json(BaseResponse::success(result)))
}
