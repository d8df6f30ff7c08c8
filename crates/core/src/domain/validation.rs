use once_cell::sync::Lazy;
use regex::Regex;

use super::error::{AppError, ErrorCode};

pub const MIN_TEXT_CHARS: usize = 5;
pub const MAX_TEXT_CHARS: usize = 5000;

/// スクリプト/iframe 注入とみなすパターン
static INJECTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)<\s*script\b",
        r"(?i)<\s*iframe\b",
        r"(?i)<\s*object\b",
        r"(?i)<\s*embed\b",
        r"(?i)javascript\s*:",
        r"(?i)\bon(?:load|error|click|mouseover|focus|submit)\s*=",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid injection pattern"))
    .collect()
});

/// 入力テキストを検証する。同じ入力には常に同じ判定を返す。
pub fn validate_text(text: &str) -> Result<(), AppError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(ErrorCode::EmptyText, "Text must not be empty"));
    }

    let chars = trimmed.chars().count();
    if chars < MIN_TEXT_CHARS {
        return Err(AppError::validation(
            ErrorCode::TextTooShort,
            format!("Text must be at least {MIN_TEXT_CHARS} characters (got {chars})"),
        ));
    }
    if chars > MAX_TEXT_CHARS {
        return Err(AppError::validation(
            ErrorCode::TextTooLong,
            format!("Text must be at most {MAX_TEXT_CHARS} characters (got {chars})"),
        ));
    }

    if INJECTION_PATTERNS.iter().any(|re| re.is_match(trimmed)) {
        return Err(AppError::validation(
            ErrorCode::MaliciousContent,
            "Text contains disallowed markup or script content",
        ));
    }

    Ok(())
}

/// バッチサイズを検証する
pub fn validate_batch_size(len: usize, max: usize) -> Result<(), AppError> {
    if len == 0 {
        return Err(AppError::validation(
            ErrorCode::BatchSize,
            "Batch must contain at least one item",
        ));
    }
    if len > max {
        return Err(AppError::validation(
            ErrorCode::BatchSize,
            format!("Batch may contain at most {max} items (got {len})"),
        ));
    }
    Ok(())
}
