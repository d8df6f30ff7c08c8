use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static SPACE_BEFORE_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+([,.;:!?])").expect("invalid punctuation pattern"));
static SENTENCE_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([.!?]\s+)(\p{Ll})").expect("invalid sentence pattern"));

/// テキスト前後処理: 入力の正規化 → 出力の体裁調整
pub struct PostProcessor;

impl PostProcessor {
    /// 入力の正規化: 連続空白の圧縮、前後トリム（改行は保持）
    pub fn normalize(text: &str) -> String {
        compress_whitespace(text).trim().to_string()
    }

    /// 出力の体裁調整: 記号前の空白除去 → 文頭の大文字化
    pub fn finish(text: &str) -> String {
        let tidied = SPACE_BEFORE_PUNCT.replace_all(text, "$1");
        Self::fix_capitalization(compress_whitespace(&tidied).trim())
    }

    /// 先頭と各文頭 (". " の後) を大文字にする
    pub fn fix_capitalization(text: &str) -> String {
        let capitalized = crate::infra::lexicon::capitalize(text);
        SENTENCE_START
            .replace_all(&capitalized, |caps: &Captures| {
                format!("{}{}", &caps[1], caps[2].to_uppercase())
            })
            .into_owned()
    }
}

fn compress_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_space = false;

    for ch in s.chars() {
        if ch == ' ' || ch == '\t' {
            if !prev_space {
                result.push(' ');
            }
            prev_space = true;
        } else {
            // 改行は保持
            prev_space = false;
            result.push(ch);
        }
    }

    result
}
