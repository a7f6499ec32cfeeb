use serde::Serialize;
use utoipa::ToSchema;

pub const SUCCESS_CODE: &str = "COMMON200";
const DEFAULT_SUCCESS_MESSAGE: &str = "성공입니다.";

/// 공통 응답 봉투
///
/// ```json
/// { "isSuccess": true, "code": "COMMON200", "message": "성공입니다.", "result": { ... } }
/// ```
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseResponse<T: Serialize> {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: Option<T>,
}

impl<T: Serialize> BaseResponse<T> {
    pub fn success(result: T) -> Self {
        Self::success_with_message(result, DEFAULT_SUCCESS_MESSAGE)
    }

    pub fn success_with_message(result: T, message: impl Into<String>) -> Self {
        Self {
            is_success: true,
            code: SUCCESS_CODE.to_string(),
            message: message.into(),
            result: Some(result),
        }
    }
}

impl BaseResponse<()> {
    /// 삭제/철회처럼 돌려줄 결과가 없는 성공
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            is_success: true,
            code: SUCCESS_CODE.to_string(),
            message: message.into(),
            result: None,
        }
    }
}

/// 실패 응답. `result`는 항상 null
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: Option<()>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            is_success: false,
            code: code.into(),
            message: message.into(),
            result: None,
        }
    }
}
