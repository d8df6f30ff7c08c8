use async_trait::async_trait;
use rand::Rng;

use super::collect_alternatives;
use crate::domain::strategy::{ParaphraseStrategy, RandomSource, StrategyError};
use crate::domain::types::{ParaphraseRequest, ParaphraseResult, Style, StrategyKind};
use crate::infra::lexicon::{self, Substitution};
use crate::infra::post_processor::PostProcessor;

pub const MIN_RULE_CONFIDENCE: f32 = 0.3;
pub const MAX_RULE_CONFIDENCE: f32 = 0.9;

/// 同義語置換 + スタイル変換による言い換え。失敗しない最終フォールバック。
///
/// 置換率を [0.3, 0.9] にクランプしたものを confidence とする。
/// 1 語も置換できなくても、原文をそのまま confidence 0.3 で返す。
#[derive(Debug, Clone, Default)]
pub struct RuleBasedStrategy {
    random: RandomSource,
}

impl RuleBasedStrategy {
    pub fn new(random: RandomSource) -> Self {
        Self { random }
    }

    /// 同期版。カスケードの最終段から直接呼ばれる。
    pub fn rewrite(&self, request: &ParaphraseRequest, count: usize) -> ParaphraseResult {
        let text = request.text.as_str();
        let mut rng = self.random.rng();

        let primary = Self::pass(text, request.style, &mut rng);
        let confidence = primary
            .change_ratio()
            .clamp(MIN_RULE_CONFIDENCE, MAX_RULE_CONFIDENCE);

        let alternatives = collect_alternatives(text, &primary.text, count, || {
            Self::pass(text, request.style, &mut rng).text
        });

        log::debug!(
            "rule-based: {}/{} words changed, confidence={confidence:.2}, {} alternatives",
            primary.changed,
            primary.total,
            alternatives.len()
        );

        ParaphraseResult::new(text, primary.text, confidence, alternatives)
    }

    /// 置換 1 パス: 同義語 → スタイル規則 → 文構造 → 体裁調整
    fn pass<R: Rng + ?Sized>(text: &str, style: Style, rng: &mut R) -> Substitution {
        let substituted = lexicon::substitute_words(text, rng);
        let styled = lexicon::apply_style(&substituted.text, style);
        let restructured = lexicon::restructure(&styled, style);
        Substitution {
            text: PostProcessor::finish(&restructured),
            ..substituted
        }
    }
}

#[async_trait]
impl ParaphraseStrategy for RuleBasedStrategy {
    async fn paraphrase(
        &self,
        request: &ParaphraseRequest,
        count: usize,
    ) -> Result<ParaphraseResult, StrategyError> {
        Ok(self.rewrite(request, count))
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::RuleBased
    }

    fn name(&self) -> &str {
        "rule-based"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy() -> RuleBasedStrategy {
        RuleBasedStrategy::new(RandomSource::Seeded(42))
    }

    #[test]
    fn confidence_is_clamped() {
        for style in Style::ALL {
            let result = strategy().rewrite(
                &ParaphraseRequest::new("The quick brown fox jumps over the lazy dog.", style),
                3,
            );
            assert!(result.confidence >= MIN_RULE_CONFIDENCE);
            assert!(result.confidence <= MAX_RULE_CONFIDENCE);
            assert!(!result.paraphrased_text.is_empty());
        }
    }

    #[test]
    fn no_dictionary_match_returns_original_with_floor_confidence() {
        let request = ParaphraseRequest::new("Zebras graze quietly.", Style::Simple);
        let result = strategy().rewrite(&request, 3);
        assert_eq!(result.paraphrased_text, "Zebras graze quietly.");
        assert_eq!(result.confidence, MIN_RULE_CONFIDENCE);
        assert!(result.alternative_versions.is_empty());
    }

    #[test]
    fn fully_substituted_text_is_capped() {
        let request = ParaphraseRequest::new("happy big dog", Style::Simple);
        let result = strategy().rewrite(&request, 3);
        assert_eq!(result.confidence, MAX_RULE_CONFIDENCE);
    }

    #[test]
    fn alternatives_exclude_original_and_duplicates() {
        let original = "The quick brown fox jumps over the lazy dog.";
        let request = ParaphraseRequest::new(original, Style::Simple);
        for seed in 0..10 {
            let result = RuleBasedStrategy::new(RandomSource::Seeded(seed)).rewrite(&request, 3);
            assert!(result.alternative_versions.len() <= 3);
            assert!(!result.alternative_versions.iter().any(|a| a == original));
            assert!(!result
                .alternative_versions
                .iter()
                .any(|a| *a == result.paraphrased_text));
            let mut deduped = result.alternative_versions.clone();
            deduped.sort();
            deduped.dedup();
            assert_eq!(deduped.len(), result.alternative_versions.len());
        }
    }

    #[test]
    fn seeded_output_is_deterministic() {
        let request = ParaphraseRequest::new("We need to schedule a meeting today.", Style::Formal);
        assert_eq!(strategy().rewrite(&request, 3), strategy().rewrite(&request, 3));
    }

    #[test]
    fn formal_style_expands_contractions_after_substitution() {
        let request = ParaphraseRequest::new("I can't attend the meeting.", Style::Formal);
        let result = strategy().rewrite(&request, 0);
        assert!(result.paraphrased_text.contains("cannot"));
        assert!(!result.paraphrased_text.contains("can't"));
        assert!(result.alternative_versions.is_empty());
    }

    #[tokio::test]
    async fn trait_impl_never_fails() {
        let s = strategy();
        let result = s
            .paraphrase(&ParaphraseRequest::new("Hello world", Style::Casual), 3)
            .await
            .unwrap();
        assert_eq!(result.paraphrased_text, "Hello world");
        assert!(s.is_available().await);
        assert_eq!(s.kind(), StrategyKind::RuleBased);
        assert_eq!(s.name(), "rule-based");
    }
}
