use super::types::ParaphraseResult;

/// 候補が原文の語数のこの割合を下回ったら途中で切れたとみなす
pub const MIN_LENGTH_RATIO: f32 = 0.5;

/// 言い換え候補セットの品質上の問題
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QualityIssue {
    #[error("all candidates are identical to the original")]
    Unchanged,
    #[error("candidates are too similar to each other")]
    NotDistinct,
    #[error("candidate looks truncated: {0:?}")]
    Truncated(String),
}

/// 主結果と代替表現をまとめて検査する。
///
/// - 少なくとも 1 件は原文と異なること
/// - 候補が 2 件以上あるなら互いに異なること
/// - どの候補も原文の語数の半分未満になっていないこと
pub fn assess_quality(original: &str, result: &ParaphraseResult) -> Result<(), QualityIssue> {
    let original = original.trim();
    let candidates: Vec<&str> = std::iter::once(result.paraphrased_text.as_str())
        .chain(result.alternative_versions.iter().map(String::as_str))
        .map(str::trim)
        .collect();

    if candidates.iter().all(|c| *c == original) {
        return Err(QualityIssue::Unchanged);
    }

    if candidates.len() > 1 {
        let mut unique = candidates.clone();
        unique.sort_unstable();
        unique.dedup();
        if unique.len() < 2 {
            return Err(QualityIssue::NotDistinct);
        }
    }

    let min_words = original.split_whitespace().count() as f32 * MIN_LENGTH_RATIO;
    if let Some(short) = candidates
        .iter()
        .find(|c| (c.split_whitespace().count() as f32) < min_words)
    {
        return Err(QualityIssue::Truncated(short.to_string()));
    }

    Ok(())
}
