use axum::{extract::State, Json};
use validator::Validate;

use crate::state::AppState;
use crate::utils::auth::{AuthUser, BearerToken};
use crate::utils::error::AppError;
use crate::utils::{AppJson, BaseResponse};

use super::dto::{
    ProfileResponse, SignupRequest, SignupResponse, SuccessProfileResponse,
    SuccessSignupResponse, UpdateProfileRequest,
};
use super::service::UserService;

/// 가입 완료 API
///
/// 외부 로그인 제공자가 발급한 Signup Token(Bearer)으로 사용자를 생성하고 Access Token을 발급합니다.
#[utoipa::path(
    post,
    path = "/api/v1/users/signup",
    request_body = SignupRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "가입 성공", body = SuccessSignupResponse),
        (status = 400, description = "잘못된 요청", body = ErrorResponse),
        (status = 401, description = "Signup Token 검증 실패", body = ErrorResponse),
        (status = 409, description = "이미 가입된 이메일", body = ErrorResponse)
    ),
    tag = "User"
)]
pub async fn signup(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    AppJson(req): AppJson<SignupRequest>,
) -> Result<Json<BaseResponse<SignupResponse>>, AppError> {
    req.validate()?;

    let result = UserService::complete_signup(&state.db, &state.config, &token, req).await?;

    Ok(Json(BaseResponse::success_with_message(
        result,
        "가입이 완료되었습니다.",
    )))
}

/// 내 프로필 조회 API
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "조회 성공", body = SuccessProfileResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse)
    ),
    tag = "User"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<BaseResponse<ProfileResponse>>, AppError> {
    let result = UserService::get_profile(&state.db, user.user_id()?).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 프로필 수정 API
#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    request_body = UpdateProfileRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "수정 성공", body = SuccessProfileResponse),
        (status = 400, description = "잘못된 요청", body = ErrorResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse)
    ),
    tag = "User"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<UpdateProfileRequest>,
) -> Result<Json<BaseResponse<ProfileResponse>>, AppError> {
    req.validate()?;

    let result = UserService::update_profile(&state.db, user.user_id()?, req).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 회원 탈퇴 API
///
/// 계정을 soft delete 합니다. 이후 같은 토큰으로의 요청은 401로 거부됩니다.
#[utoipa::path(
    delete,
    path = "/api/v1/users/me",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "탈퇴 성공"),
        (status = 401, description = "인증 실패", body = ErrorResponse)
    ),
    tag = "User"
)]
pub async fn withdraw(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<BaseResponse<()>>, AppError> {
    UserService::withdraw(&state.db, user.user_id()?).await?;

    Ok(Json(BaseResponse::empty("탈퇴가 완료되었습니다.")))
}
