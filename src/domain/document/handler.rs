use axum::{
    extract::{Path, Query, State},
    Json,
};
use validator::Validate;

use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::error::AppError;
use crate::utils::{AppJson, BaseResponse};

use super::dto::{
    DocumentQuery, DocumentResponse, RegisterDocumentRequest, SuccessDocumentListResponse,
    SuccessDocumentResponse,
};
use super::service::DocumentService;

/// 피치 문서 등록 API
///
/// 파일 업로드는 별도 스토리지에서 끝난 뒤 URL만 등록합니다.
#[utoipa::path(
    post,
    path = "/api/v1/pitches/{pitch_id}/documents",
    params(
        ("pitch_id" = i64, Path, description = "피치 ID")
    ),
    request_body = RegisterDocumentRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "등록 성공", body = SuccessDocumentResponse),
        (status = 400, description = "잘못된 요청", body = ErrorResponse),
        (status = 404, description = "피치 없음 또는 접근 불가", body = ErrorResponse)
    ),
    tag = "Document"
)]
pub async fn register_document(
    State(state): State<AppState>,
    user: AuthUser,
    Path(pitch_id): Path<i64>,
    AppJson(req): AppJson<RegisterDocumentRequest>,
) -> Result<Json<BaseResponse<DocumentResponse>>, AppError> {
    req.validate()?;

    let result =
        DocumentService::register_document(&state.db, user.user_id()?, pitch_id, req).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 피치 문서 목록 API
#[utoipa::path(
    get,
    path = "/api/v1/pitches/{pitch_id}/documents",
    params(
        ("pitch_id" = i64, Path, description = "피치 ID"),
        ("bucket" = Option<String>, Query, description = "분류 필터 (PRIVATE, SENT, RECEIVED)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "조회 성공", body = SuccessDocumentListResponse),
        (status = 404, description = "피치 없음 또는 접근 불가", body = ErrorResponse)
    ),
    tag = "Document"
)]
pub async fn list_documents(
    State(state): State<AppState>,
    user: AuthUser,
    Path(pitch_id): Path<i64>,
    Query(query): Query<DocumentQuery>,
) -> Result<Json<BaseResponse<Vec<DocumentResponse>>>, AppError> {
    let result =
        DocumentService::list_documents(&state.db, user.user_id()?, pitch_id, query.bucket)
            .await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 문서 공개 여부 전환 API
#[utoipa::path(
    patch,
    path = "/api/v1/documents/{document_id}/privacy",
    params(
        ("document_id" = i64, Path, description = "문서 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "변경 성공", body = SuccessDocumentResponse),
        (status = 403, description = "상대 쪽 문서", body = ErrorResponse),
        (status = 404, description = "문서 없음", body = ErrorResponse)
    ),
    tag = "Document"
)]
pub async fn toggle_privacy(
    State(state): State<AppState>,
    user: AuthUser,
    Path(document_id): Path<i64>,
) -> Result<Json<BaseResponse<DocumentResponse>>, AppError> {
    let result = DocumentService::toggle_privacy(&state.db, user.user_id()?, document_id).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 문서 삭제 API
#[utoipa::path(
    delete,
    path = "/api/v1/documents/{document_id}",
    params(
        ("document_id" = i64, Path, description = "문서 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "삭제 성공"),
        (status = 403, description = "올린 사용자가 아님", body = ErrorResponse),
        (status = 404, description = "문서 없음", body = ErrorResponse)
    ),
    tag = "Document"
)]
pub async fn delete_document(
    State(state): State<AppState>,
    user: AuthUser,
    Path(document_id): Path<i64>,
) -> Result<Json<BaseResponse<()>>, AppError> {
    DocumentService::delete_document(&state.db, user.user_id()?, document_id).await?;

    Ok(Json(BaseResponse::empty("문서가 삭제되었습니다.")))
}
