//! 生成リクエストの失敗分類

use thiserror::Error;

pub const VALIDATION_MESSAGE: &str = "Please select how you're feeling";
pub const GENERATION_FALLBACK_MESSAGE: &str = "Failed to generate affirmation";
pub const UNREACHABLE_MESSAGE: &str =
    "Unable to connect to the server. Please make sure the backend is running.";

#[derive(Debug, Error)]
pub enum ApiError {
    /// 必須項目（mood）が未選択。ネットワークには出ない。
    #[error("mood is required")]
    Validation,

    /// サーバーには届いたが success=false
    #[error("service reported failure: {}", .0.as_deref().unwrap_or("(no message)"))]
    Application(Option<String>),

    /// 2xx 以外のステータス
    #[error("HTTP error, status {0}")]
    Status(u16),

    /// 接続不可・タイムアウトなど
    #[error("request failed: {0}")]
    Unreachable(reqwest::Error),

    /// 本文がJSONとして読めない
    #[error("malformed response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// エラーパネルに出す文言。技術的な詳細はログ側にだけ残す。
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation => VALIDATION_MESSAGE.to_string(),
            ApiError::Application(Some(msg)) if !msg.trim().is_empty() => msg.clone(),
            ApiError::Application(_) => GENERATION_FALLBACK_MESSAGE.to_string(),
            ApiError::Status(code) => format!("Server error (HTTP {code}). Please try again."),
            ApiError::Unreachable(_) | ApiError::Decode(_) => UNREACHABLE_MESSAGE.to_string(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Status(_) | ApiError::Unreachable(_) | ApiError::Decode(_))
    }
}
