use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;

use crate::domain::pitch::entity::pitch_document;
use crate::domain::pitch::service::PitchService;
use crate::domain::user::service::UserService;
use crate::utils::error::AppError;

use super::dto::{classify, DocumentBucket, DocumentResponse, RegisterDocumentRequest};

pub struct DocumentService;

impl DocumentService {
    async fn find_document<C: ConnectionTrait>(
        conn: &C,
        document_id: i64,
    ) -> Result<pitch_document::Model, AppError> {
        pitch_document::Entity::find_by_id(document_id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::not_found("존재하지 않는 문서입니다."))
    }

    /// 업로드가 끝난 파일을 피치 문서로 등록
    pub async fn register_document<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        pitch_id: i64,
        req: RegisterDocumentRequest,
    ) -> Result<DocumentResponse, AppError> {
        let me = UserService::find_active_user(conn, user_id).await?;
        PitchService::authorize_viewer(conn, &me, pitch_id).await?;

        let saved = pitch_document::ActiveModel {
            pitch_id: Set(pitch_id),
            uploaded_by: Set(me.user_id),
            uploader_role: Set(me.role),
            file_name: Set(req.file_name.trim().to_string()),
            file_url: Set(req.file_url),
            is_private: Set(req.is_private),
            uploaded_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        info!(
            document_id = saved.pitch_document_id,
            pitch_id,
            uploaded_by = me.user_id,
            is_private = saved.is_private,
            "Document registered"
        );

        let bucket = if saved.is_private {
            DocumentBucket::Private
        } else {
            DocumentBucket::Sent
        };
        Ok(DocumentResponse::new(saved, bucket))
    }

    /// 공개/비공개 전환 (업로드한 쪽만)
    pub async fn toggle_privacy<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        document_id: i64,
    ) -> Result<DocumentResponse, AppError> {
        let me = UserService::find_active_user(conn, user_id).await?;
        let found = Self::find_document(conn, document_id).await?;
        PitchService::authorize_viewer(conn, &me, found.pitch_id).await?;

        if found.uploader_role != me.role {
            return Err(AppError::forbidden(
                "상대 쪽이 올린 문서의 공개 여부는 바꿀 수 없습니다.",
            ));
        }

        let private = !found.is_private;
        let mut active: pitch_document::ActiveModel = found.into();
        active.is_private = Set(private);
        let updated = active.update(conn).await?;

        let bucket = classify(&updated, me.role)
            .ok_or_else(|| AppError::internal_error("문서 분류에 실패했습니다."))?;
        Ok(DocumentResponse::new(updated, bucket))
    }

    /// 피치 문서 목록 (보는 사람 기준 분류, 상대 쪽 비공개 문서 제외)
    pub async fn list_documents<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        pitch_id: i64,
        bucket: Option<DocumentBucket>,
    ) -> Result<Vec<DocumentResponse>, AppError> {
        let me = UserService::find_active_user(conn, user_id).await?;
        PitchService::authorize_viewer(conn, &me, pitch_id).await?;

        let documents = pitch_document::Entity::find()
            .filter(pitch_document::Column::PitchId.eq(pitch_id))
            .order_by_desc(pitch_document::Column::UploadedAt)
            .all(conn)
            .await?;

        Ok(documents
            .into_iter()
            .filter_map(|doc| classify(&doc, me.role).map(|b| (doc, b)))
            .filter(|(_, b)| bucket.map_or(true, |wanted| wanted == *b))
            .map(|(doc, b)| DocumentResponse::new(doc, b))
            .collect())
    }

    /// 문서 삭제 (업로드한 사용자만)
    pub async fn delete_document<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        document_id: i64,
    ) -> Result<(), AppError> {
        let me = UserService::find_active_user(conn, user_id).await?;
        let found = Self::find_document(conn, document_id).await?;

        if found.uploaded_by != me.user_id {
            return Err(AppError::forbidden("문서를 올린 사용자만 삭제할 수 있습니다."));
        }

        let pitch_id = found.pitch_id;
        found.delete(conn).await?;

        info!(document_id, pitch_id, deleted_by = me.user_id, "Document deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::domain::user::entity::user::{self, UserRole};

    fn investor(user_id: i64) -> user::Model {
        let now = Utc::now().naive_utc();
        user::Model {
            user_id,
            name: "Meera".to_string(),
            email: "meera@fund.vc".to_string(),
            role: UserRole::Investor,
            phone: None,
            gender: None,
            date_of_birth: None,
            location: None,
            preferred_languages: serde_json::json!([]),
            deleted_on: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn only_uploader_should_delete_document() {
        // Arrange
        let doc = pitch_document::Model {
            pitch_document_id: 4,
            pitch_id: 10,
            uploaded_by: 1,
            uploader_role: UserRole::Founder,
            file_name: "deck.pdf".to_string(),
            file_url: "https://files.daftar.os/deck.pdf".to_string(),
            is_private: false,
            uploaded_at: Utc::now().naive_utc(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![investor(2)]])
            .append_query_results([vec![doc]])
            .into_connection();

        // Act
        let result = DocumentService::delete_document(&db, 2, 4).await;

        // Assert
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn missing_document_should_be_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![investor(2)]])
            .append_query_results([Vec::<pitch_document::Model>::new()])
            .into_connection();

        let result = DocumentService::toggle_privacy(&db, 2, 4).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
