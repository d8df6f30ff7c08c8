use serde::Serialize;

/// 呼び出し元に返すエラーコード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    #[serde(rename = "E_EMPTY_TEXT")]
    EmptyText,
    #[serde(rename = "E_TEXT_TOO_SHORT")]
    TextTooShort,
    #[serde(rename = "E_TEXT_TOO_LONG")]
    TextTooLong,
    #[serde(rename = "E_MALICIOUS_CONTENT")]
    MaliciousContent,
    #[serde(rename = "E_BATCH_SIZE")]
    BatchSize,
    #[serde(rename = "E_CONFIG")]
    Config,
    #[serde(rename = "E_INTERNAL")]
    Internal,
}

impl ErrorCode {
    /// 入力検証系のエラーか
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ErrorCode::EmptyText
                | ErrorCode::TextTooShort
                | ErrorCode::TextTooLong
                | ErrorCode::MaliciousContent
                | ErrorCode::BatchSize
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::EmptyText => "E_EMPTY_TEXT",
            ErrorCode::TextTooShort => "E_TEXT_TOO_SHORT",
            ErrorCode::TextTooLong => "E_TEXT_TOO_LONG",
            ErrorCode::MaliciousContent => "E_MALICIOUS_CONTENT",
            ErrorCode::BatchSize => "E_BATCH_SIZE",
            ErrorCode::Config => "E_CONFIG",
            ErrorCode::Internal => "E_INTERNAL",
        }
    }
}

/// コア境界を越えるエラー（検証エラー・設定エラー）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub recoverable: bool,
}

impl AppError {
    pub fn validation(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: msg.into(),
            recoverable: false,
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Config,
            message: msg.into(),
            recoverable: false,
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Internal,
            message: msg.into(),
            recoverable: false,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_codes() {
        assert!(ErrorCode::EmptyText.is_validation());
        assert!(ErrorCode::MaliciousContent.is_validation());
        assert!(ErrorCode::BatchSize.is_validation());
        assert!(!ErrorCode::Config.is_validation());
        assert!(!ErrorCode::Internal.is_validation());
    }

    #[test]
    fn display_includes_code() {
        let e = AppError::validation(ErrorCode::TextTooShort, "too short");
        assert_eq!(e.to_string(), "[E_TEXT_TOO_SHORT] too short");
        assert!(!e.recoverable);
    }
}
