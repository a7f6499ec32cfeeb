use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::pitch::entity::pitch_document;
use crate::domain::user::entity::user::UserRole;

/// 보는 사람 기준의 문서 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentBucket {
    /// 내 쪽이 올린 비공개 문서
    Private,
    /// 내 쪽이 올린 공개 문서
    Sent,
    /// 상대 쪽이 올린 공개 문서
    Received,
}

/// 문서가 `viewer` 쪽에서 어느 분류에 속하는지 계산합니다.
/// 상대 쪽의 비공개 문서는 `None`(보이지 않음)입니다.
pub fn classify(doc: &pitch_document::Model, viewer: UserRole) -> Option<DocumentBucket> {
    let own_side = doc.uploader_role == viewer;
    match (own_side, doc.is_private) {
        (true, true) => Some(DocumentBucket::Private),
        (true, false) => Some(DocumentBucket::Sent),
        (false, false) => Some(DocumentBucket::Received),
        (false, true) => None,
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDocumentRequest {
    #[validate(length(min = 1, max = 255, message = "파일 이름은 1~255자 이내로 입력해야 합니다"))]
    pub file_name: String,

    /// 업로드가 끝난 파일 URL
    #[validate(url(message = "파일 URL 형식이 올바르지 않습니다"))]
    pub file_url: String,

    #[serde(default)]
    pub is_private: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentQuery {
    pub bucket: Option<DocumentBucket>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub document_id: i64,
    pub pitch_id: i64,
    pub uploaded_by: i64,
    pub uploader_role: UserRole,
    pub file_name: String,
    pub file_url: String,
    pub is_private: bool,
    pub bucket: DocumentBucket,
    pub uploaded_at: String,
}

impl DocumentResponse {
    pub fn new(model: pitch_document::Model, bucket: DocumentBucket) -> Self {
        Self {
            document_id: model.pitch_document_id,
            pitch_id: model.pitch_id,
            uploaded_by: model.uploaded_by,
            uploader_role: model.uploader_role,
            file_name: model.file_name,
            file_url: model.file_url,
            is_private: model.is_private,
            bucket,
            uploaded_at: model.uploaded_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessDocumentResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: DocumentResponse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessDocumentListResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: Vec<DocumentResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn document(uploader_role: UserRole, is_private: bool) -> pitch_document::Model {
        pitch_document::Model {
            pitch_document_id: 1,
            pitch_id: 10,
            uploaded_by: 5,
            uploader_role,
            file_name: "deck.pdf".to_string(),
            file_url: "https://files.daftar.os/deck.pdf".to_string(),
            is_private,
            uploaded_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn own_private_document_should_be_private() {
        // Arrange
        let doc = document(UserRole::Founder, true);

        // Act
        let bucket = classify(&doc, UserRole::Founder);

        // Assert
        assert_eq!(bucket, Some(DocumentBucket::Private));
    }

    #[test]
    fn own_public_document_should_be_sent() {
        let doc = document(UserRole::Investor, false);

        assert_eq!(classify(&doc, UserRole::Investor), Some(DocumentBucket::Sent));
    }

    #[test]
    fn other_side_public_document_should_be_received() {
        let doc = document(UserRole::Investor, false);

        assert_eq!(classify(&doc, UserRole::Founder), Some(DocumentBucket::Received));
    }

    #[test]
    fn other_side_private_document_should_be_hidden() {
        let doc = document(UserRole::Founder, true);

        assert_eq!(classify(&doc, UserRole::Investor), None);
    }

    #[test]
    fn bucket_query_should_parse_screaming_case() {
        let query: DocumentQuery =
            serde_json::from_str(r#"{"bucket":"RECEIVED"}"#).expect("json");

        assert_eq!(query.bucket, Some(DocumentBucket::Received));
    }
}
