use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use validator::Validate;

use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::error::AppError;
use crate::utils::{AppJson, BaseResponse};

use super::dto::{
    CreatePitchRequest, DecidePitchRequest, InviteMemberRequest, InviteMemberResponse,
    PitchAnswerItem, PitchDetailResponse, PitchResponse, RespondTeamInviteRequest,
    SaveAnswerRequest, ScoutPitchQuery, SubmitPitchRequest, SuccessInviteMemberResponse,
    SuccessPitchAnswerResponse, SuccessPitchDetailResponse, SuccessPitchListResponse,
    SuccessPitchResponse, SuccessTeamInviteResultResponse, SuccessTeamListResponse,
    TeamInviteResult, TeamMemberItem,
};
use super::service::PitchService;

/// 피치 생성 API
///
/// DRAFT 상태의 피치를 만들고 생성자를 팀 멤버로 등록합니다.
#[utoipa::path(
    post,
    path = "/api/v1/pitches",
    request_body = CreatePitchRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "생성 성공", body = SuccessPitchResponse),
        (status = 400, description = "잘못된 요청", body = ErrorResponse),
        (status = 403, description = "창업자가 아님", body = ErrorResponse)
    ),
    tag = "Pitch"
)]
pub async fn create_pitch(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<CreatePitchRequest>,
) -> Result<Json<BaseResponse<PitchResponse>>, AppError> {
    req.validate()?;

    let result = PitchService::create_pitch(&state.db, user.user_id()?, req).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 내 피치 목록 API
#[utoipa::path(
    get,
    path = "/api/v1/pitches",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "조회 성공", body = SuccessPitchListResponse),
        (status = 403, description = "창업자가 아님", body = ErrorResponse)
    ),
    tag = "Pitch"
)]
pub async fn list_my_pitches(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<BaseResponse<Vec<PitchResponse>>>, AppError> {
    let result = PitchService::list_my_pitches(&state.db, user.user_id()?).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 피치 상세 API
#[utoipa::path(
    get,
    path = "/api/v1/pitches/{pitch_id}",
    params(
        ("pitch_id" = i64, Path, description = "피치 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "조회 성공", body = SuccessPitchDetailResponse),
        (status = 404, description = "피치 없음 또는 접근 불가", body = ErrorResponse)
    ),
    tag = "Pitch"
)]
pub async fn get_pitch(
    State(state): State<AppState>,
    user: AuthUser,
    Path(pitch_id): Path<i64>,
) -> Result<Json<BaseResponse<PitchDetailResponse>>, AppError> {
    let result = PitchService::get_pitch(&state.db, user.user_id()?, pitch_id).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 피치 삭제 API
#[utoipa::path(
    delete,
    path = "/api/v1/pitches/{pitch_id}",
    params(
        ("pitch_id" = i64, Path, description = "피치 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "삭제 성공"),
        (status = 409, description = "삭제할 수 없는 상태", body = ErrorResponse)
    ),
    tag = "Pitch"
)]
pub async fn delete_pitch(
    State(state): State<AppState>,
    user: AuthUser,
    Path(pitch_id): Path<i64>,
) -> Result<Json<BaseResponse<()>>, AppError> {
    PitchService::delete_pitch(&state.db, user.user_id()?, pitch_id).await?;

    Ok(Json(BaseResponse::empty("피치가 삭제되었습니다.")))
}

/// 피치 답변 저장 API
///
/// 질문별 영상 URL을 저장합니다. 같은 질문에 다시 저장하면 덮어씁니다.
#[utoipa::path(
    put,
    path = "/api/v1/pitches/{pitch_id}/answers",
    params(
        ("pitch_id" = i64, Path, description = "피치 ID")
    ),
    request_body = SaveAnswerRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "저장 성공", body = SuccessPitchAnswerResponse),
        (status = 400, description = "스카우트의 질문이 아님", body = ErrorResponse),
        (status = 409, description = "이미 제출된 피치", body = ErrorResponse)
    ),
    tag = "Pitch"
)]
pub async fn save_answer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(pitch_id): Path<i64>,
    AppJson(req): AppJson<SaveAnswerRequest>,
) -> Result<Json<BaseResponse<PitchAnswerItem>>, AppError> {
    req.validate()?;

    let result = PitchService::save_answer(&state.db, user.user_id()?, pitch_id, req).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 피치 제출 API
#[utoipa::path(
    post,
    path = "/api/v1/pitches/{pitch_id}/submit",
    params(
        ("pitch_id" = i64, Path, description = "피치 ID")
    ),
    request_body = SubmitPitchRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "제출 성공", body = SuccessPitchResponse),
        (status = 400, description = "모집 중이 아니거나 답변 누락", body = ErrorResponse),
        (status = 409, description = "제출할 수 없는 상태", body = ErrorResponse)
    ),
    tag = "Pitch"
)]
pub async fn submit_pitch(
    State(state): State<AppState>,
    user: AuthUser,
    Path(pitch_id): Path<i64>,
    AppJson(req): AppJson<SubmitPitchRequest>,
) -> Result<Json<BaseResponse<PitchResponse>>, AppError> {
    let result =
        PitchService::submit_pitch(&state.db, user.user_id()?, pitch_id, req.scout_id).await?;

    Ok(Json(BaseResponse::success_with_message(
        result,
        "피치가 제출되었습니다.",
    )))
}

/// 피치 철회 API
#[utoipa::path(
    post,
    path = "/api/v1/pitches/{pitch_id}/withdraw",
    params(
        ("pitch_id" = i64, Path, description = "피치 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "철회 성공", body = SuccessPitchResponse),
        (status = 409, description = "철회할 수 없는 상태", body = ErrorResponse)
    ),
    tag = "Pitch"
)]
pub async fn withdraw_pitch(
    State(state): State<AppState>,
    user: AuthUser,
    Path(pitch_id): Path<i64>,
) -> Result<Json<BaseResponse<PitchResponse>>, AppError> {
    let result = PitchService::withdraw_pitch(&state.db, user.user_id()?, pitch_id).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 피치 수락/거절 API (투자자)
#[utoipa::path(
    post,
    path = "/api/v1/pitches/{pitch_id}/decision",
    params(
        ("pitch_id" = i64, Path, description = "피치 ID")
    ),
    request_body = DecidePitchRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "처리 성공", body = SuccessPitchResponse),
        (status = 403, description = "투자자가 아님", body = ErrorResponse),
        (status = 409, description = "INBOX 상태가 아님", body = ErrorResponse)
    ),
    tag = "Pitch"
)]
pub async fn decide_pitch(
    State(state): State<AppState>,
    user: AuthUser,
    Path(pitch_id): Path<i64>,
    AppJson(req): AppJson<DecidePitchRequest>,
) -> Result<Json<BaseResponse<PitchResponse>>, AppError> {
    let result =
        PitchService::decide_pitch(&state.db, user.user_id()?, pitch_id, req.accept).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 스카우트에 제출된 피치 목록 API (투자자)
#[utoipa::path(
    get,
    path = "/api/v1/scouts/{scout_id}/pitches",
    params(
        ("scout_id" = i64, Path, description = "스카우트 ID"),
        ("status" = Option<String>, Query, description = "상태 필터 (INBOX, ACCEPTED, DECLINED)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "조회 성공", body = SuccessPitchListResponse),
        (status = 404, description = "스카우트 없음", body = ErrorResponse)
    ),
    tag = "Pitch"
)]
pub async fn list_scout_pitches(
    State(state): State<AppState>,
    user: AuthUser,
    Path(scout_id): Path<i64>,
    Query(query): Query<ScoutPitchQuery>,
) -> Result<Json<BaseResponse<Vec<PitchResponse>>>, AppError> {
    let result =
        PitchService::list_scout_pitches(&state.db, user.user_id()?, scout_id, query.status)
            .await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 팀원 초대 API
///
/// 초대받은 사용자에게 수락/거절 서명 링크가 담긴 메일이 발송됩니다.
#[utoipa::path(
    post,
    path = "/api/v1/pitches/{pitch_id}/team",
    params(
        ("pitch_id" = i64, Path, description = "피치 ID")
    ),
    request_body = InviteMemberRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "초대 성공", body = SuccessInviteMemberResponse),
        (status = 400, description = "창업자가 아닌 사용자", body = ErrorResponse),
        (status = 409, description = "이미 초대됨", body = ErrorResponse)
    ),
    tag = "Pitch"
)]
pub async fn invite_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path(pitch_id): Path<i64>,
    AppJson(req): AppJson<InviteMemberRequest>,
) -> Result<Json<BaseResponse<InviteMemberResponse>>, AppError> {
    req.validate()?;

    let result = PitchService::invite_member(
        &state.db,
        &state.action_tokens,
        &state.config.app_base_url,
        user.user_id()?,
        pitch_id,
        req,
    )
    .await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 피치 팀 목록 API
#[utoipa::path(
    get,
    path = "/api/v1/pitches/{pitch_id}/team",
    params(
        ("pitch_id" = i64, Path, description = "피치 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "조회 성공", body = SuccessTeamListResponse),
        (status = 404, description = "피치 없음 또는 접근 불가", body = ErrorResponse)
    ),
    tag = "Pitch"
)]
pub async fn list_team(
    State(state): State<AppState>,
    user: AuthUser,
    Path(pitch_id): Path<i64>,
) -> Result<Json<BaseResponse<Vec<TeamMemberItem>>>, AppError> {
    let result = PitchService::list_team(&state.db, user.user_id()?, pitch_id).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 팀 초대 응답 API
///
/// 메일 링크에 담긴 서명 토큰으로 처리하므로 로그인이 필요 없습니다.
#[utoipa::path(
    post,
    path = "/api/v1/pitch-invitations/respond",
    request_body = RespondTeamInviteRequest,
    responses(
        (status = 200, description = "처리 성공", body = SuccessTeamInviteResultResponse),
        (status = 400, description = "위조되었거나 만료된 토큰", body = ErrorResponse),
        (status = 409, description = "이미 처리된 초대", body = ErrorResponse)
    ),
    tag = "Pitch"
)]
pub async fn respond_team_invite(
    State(state): State<AppState>,
    AppJson(req): AppJson<RespondTeamInviteRequest>,
) -> Result<Json<BaseResponse<TeamInviteResult>>, AppError> {
    req.validate()?;

    let result = PitchService::respond_via_token(
        &state.db,
        &state.action_tokens,
        &req.token,
        Utc::now().timestamp(),
    )
    .await?;

    Ok(Json(BaseResponse::success(result)))
}
