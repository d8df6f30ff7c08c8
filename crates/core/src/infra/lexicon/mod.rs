//! 語彙ルールエンジン: 同義語テーブルとスタイル別の置換ルール。
//!
//! テーブルはすべて起動後に一度だけ構築される読み取り専用データ。
//! ここにある関数は入力とテーブルだけに依存する純粋関数。

pub mod style_rules;
mod synonyms;

pub use style_rules::{rule_set, temperature_for, StyleRuleSet};
pub use synonyms::{dictionary_size, synonyms_for};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::types::Style;

/// スタイル別の置換ルールを順に適用する
pub fn apply_style(text: &str, style: Style) -> String {
    rule_set(style).apply(text)
}

/// 文構造の組み替えを最大 1 件適用する（creative / formal のみ）
pub fn restructure(text: &str, style: Style) -> String {
    rule_set(style).restructure(text)
}

/// 置換後の単語に元の単語の大文字/小文字を引き継ぐ。
///
/// 全て大文字 (2 文字以上) なら全大文字、先頭が大文字なら先頭だけ大文字。
pub fn match_case(original: &str, replacement: &str) -> String {
    let mut letters = original.chars().filter(|c| c.is_alphabetic()).peekable();
    let first_upper = letters.peek().map(|c| c.is_uppercase()).unwrap_or(false);
    let (count, all_upper) = letters.fold((0usize, true), |(n, all), c| {
        (n + 1, all && c.is_uppercase())
    });

    if count > 1 && all_upper {
        replacement.to_uppercase()
    } else if first_upper {
        capitalize(replacement)
    } else {
        replacement.to_string()
    }
}

/// 先頭文字を大文字にする
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// 同義語置換 1 パスの結果
#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    pub text: String,
    /// 置換された単語数
    pub changed: usize,
    /// 全単語数
    pub total: usize,
}

impl Substitution {
    /// 置換率
    pub fn change_ratio(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.changed as f32 / self.total as f32
        }
    }
}

/// 空白で分割した各単語を、辞書にあればランダムな同義語で置き換える。
pub fn substitute_words<R: Rng + ?Sized>(text: &str, rng: &mut R) -> Substitution {
    let mut changed = 0;
    let mut total = 0;

    let words: Vec<String> = text
        .split_whitespace()
        .map(|token| {
            total += 1;
            match substitute_token(token, rng) {
                Some(replaced) => {
                    changed += 1;
                    replaced
                }
                None => token.to_string(),
            }
        })
        .collect();

    Substitution {
        text: words.join(" "),
        changed,
        total,
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// 前後の記号を外して辞書を引き、記号を残したまま置き換える
fn substitute_token<R: Rng + ?Sized>(token: &str, rng: &mut R) -> Option<String> {
    let start = token.find(is_word_char)?;
    let end = token
        .char_indices()
        .rev()
        .find(|(_, c)| is_word_char(*c))
        .map(|(i, c)| i + c.len_utf8())?;

    let (prefix, rest) = token.split_at(start);
    let (core, suffix) = rest.split_at(end - start);

    // "can't" や "well-known" のような語中記号付きは対象外
    if !core.chars().all(is_word_char) {
        return None;
    }

    let choice = synonyms_for(core)?.choose(rng)?;
    Some(format!("{prefix}{}{suffix}", match_case(core, choice)))
}
