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
    CreateOfferRequest, OfferResponse, RespondOfferRequest, SuccessOfferListResponse,
    SuccessOfferResponse,
};
use super::service::OfferService;

/// 오퍼 생성 API (투자자)
///
/// 피치당 대기 중인(PENDING) 오퍼는 하나만 존재할 수 있습니다.
#[utoipa::path(
    post,
    path = "/api/v1/pitches/{pitch_id}/offers",
    params(
        ("pitch_id" = i64, Path, description = "피치 ID")
    ),
    request_body = CreateOfferRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "생성 성공", body = SuccessOfferResponse),
        (status = 404, description = "피치 없음 또는 접근 불가", body = ErrorResponse),
        (status = 409, description = "대기 중인 오퍼가 있거나 오퍼를 받을 수 없는 상태", body = ErrorResponse)
    ),
    tag = "Offer"
)]
pub async fn create_offer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(pitch_id): Path<i64>,
    AppJson(req): AppJson<CreateOfferRequest>,
) -> Result<Json<BaseResponse<OfferResponse>>, AppError> {
    req.validate()?;

    let result = OfferService::create_offer(&state.db, user.user_id()?, pitch_id, req).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 피치 오퍼 목록 API
#[utoipa::path(
    get,
    path = "/api/v1/pitches/{pitch_id}/offers",
    params(
        ("pitch_id" = i64, Path, description = "피치 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "조회 성공", body = SuccessOfferListResponse),
        (status = 404, description = "피치 없음 또는 접근 불가", body = ErrorResponse)
    ),
    tag = "Offer"
)]
pub async fn list_offers(
    State(state): State<AppState>,
    user: AuthUser,
    Path(pitch_id): Path<i64>,
) -> Result<Json<BaseResponse<Vec<OfferResponse>>>, AppError> {
    let result = OfferService::list_offers(&state.db, user.user_id()?, pitch_id).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 오퍼 수락/거절 API (창업자)
#[utoipa::path(
    post,
    path = "/api/v1/offers/{offer_id}/respond",
    params(
        ("offer_id" = i64, Path, description = "오퍼 ID")
    ),
    request_body = RespondOfferRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "처리 성공", body = SuccessOfferResponse),
        (status = 404, description = "오퍼 없음", body = ErrorResponse),
        (status = 409, description = "이미 처리된 오퍼", body = ErrorResponse)
    ),
    tag = "Offer"
)]
pub async fn respond_to_offer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(offer_id): Path<i64>,
    AppJson(req): AppJson<RespondOfferRequest>,
) -> Result<Json<BaseResponse<OfferResponse>>, AppError> {
    let result =
        OfferService::respond_to_offer(&state.db, user.user_id()?, offer_id, req.accept).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 오퍼 철회 API (투자자)
#[utoipa::path(
    post,
    path = "/api/v1/offers/{offer_id}/withdraw",
    params(
        ("offer_id" = i64, Path, description = "오퍼 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "철회 성공", body = SuccessOfferResponse),
        (status = 403, description = "오퍼를 낸 투자자가 아님", body = ErrorResponse),
        (status = 409, description = "이미 처리된 오퍼", body = ErrorResponse)
    ),
    tag = "Offer"
)]
pub async fn withdraw_offer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(offer_id): Path<i64>,
) -> Result<Json<BaseResponse<OfferResponse>>, AppError> {
    let result = OfferService::withdraw_offer(&state.db, user.user_id()?, offer_id).await?;

    Ok(Json(BaseResponse::success(result)))
}
