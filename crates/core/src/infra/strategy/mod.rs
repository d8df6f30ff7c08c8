mod heuristic;
pub mod local_model;
pub mod remote_model;
mod rule_based;

pub use heuristic::{HeuristicStrategy, HEURISTIC_CONFIDENCE};
pub use local_model::{LocalModelStrategy, LOCAL_MODEL_CONFIDENCE};
pub use remote_model::{RemoteModelStrategy, REMOTE_MODEL_CONFIDENCE};
pub use rule_based::{RuleBasedStrategy, MAX_RULE_CONFIDENCE, MIN_RULE_CONFIDENCE};

use crate::domain::types::MAX_ALTERNATIVES;

/// `generate` を繰り返し呼び、原文・主結果と異なる代替表現を生成順に集める。
///
/// 試行回数は `count * 2` まで。
pub(crate) fn collect_alternatives(
    original: &str,
    primary: &str,
    count: usize,
    mut generate: impl FnMut() -> String,
) -> Vec<String> {
    let count = count.min(MAX_ALTERNATIVES);
    let mut alternatives: Vec<String> = Vec::with_capacity(count);

    for _ in 0..count * 2 {
        if alternatives.len() >= count {
            break;
        }
        let candidate = generate();
        if candidate != original && candidate != primary && !alternatives.contains(&candidate) {
            alternatives.push(candidate);
        }
    }

    alternatives
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_distinct_candidates_in_order() {
        let mut pool = vec!["orig", "primary", "a", "a", "b", "c", "d"].into_iter();
        let alts = collect_alternatives("orig", "primary", 3, || {
            pool.next().unwrap_or("orig").to_string()
        });
        assert_eq!(alts, vec!["a", "b", "c"]);
    }

    #[test]
    fn gives_up_after_bounded_attempts() {
        let mut calls = 0;
        let alts = collect_alternatives("orig", "primary", 3, || {
            calls += 1;
            "orig".to_string()
        });
        assert!(alts.is_empty());
        assert_eq!(calls, 6);
    }

    #[test]
    fn zero_count_generates_nothing() {
        let alts = collect_alternatives("orig", "primary", 0, || unreachable!());
        assert!(alts.is_empty());
    }
}
