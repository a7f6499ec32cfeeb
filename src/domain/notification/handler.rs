use axum::{extract::State, Json};

use crate::domain::user::service::UserService;
use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::error::AppError;
use crate::utils::BaseResponse;

use super::dto::{NotificationItem, SuccessNotificationListResponse};
use super::service::NotificationService;

/// 내 알림 목록 조회 API
///
/// 로그인한 사용자에게 발송된 알림 중 현재 역할에 해당하는 알림을 최신순으로 반환합니다.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "알림 목록 조회 성공", body = SuccessNotificationListResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse)
    ),
    tag = "Notification"
)]
pub async fn list_my_notifications(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<BaseResponse<Vec<NotificationItem>>>, AppError> {
    let me = UserService::find_active_user(&state.db, user.user_id()?).await?;

    let result = NotificationService::list_my_notifications(&state.db, &me).await?;

    Ok(Json(BaseResponse::success(result)))
}
