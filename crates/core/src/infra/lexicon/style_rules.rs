use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

use crate::domain::types::Style;

use super::match_case;

/// 1 件の置換ルール。置換後の単語は元の単語の先頭大文字/小文字を引き継ぐ。
pub struct StyleRule {
    pattern: Regex,
    replacement: &'static str,
    first_only: bool,
}

impl StyleRule {
    fn new(pattern: &str, replacement: &'static str) -> Self {
        Self {
            pattern: Regex::new(&format!("(?i){pattern}")).expect("invalid style rule pattern"),
            replacement,
            first_only: false,
        }
    }

    fn first(pattern: &str, replacement: &'static str) -> Self {
        Self {
            first_only: true,
            ..Self::new(pattern, replacement)
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    pub fn apply(&self, text: &str) -> String {
        let limit = if self.first_only { 1 } else { 0 };
        self.pattern
            .replacen(text, limit, |caps: &Captures| {
                let mut expanded = String::new();
                caps.expand(self.replacement, &mut expanded);
                match_case(&caps[0], &expanded)
            })
            .into_owned()
    }
}

/// スタイルごとの置換ルール列と温度パラメータ
pub struct StyleRuleSet {
    pub style: Style,
    /// 外部モデルのサンプリング温度として使う攻めの強さ
    pub temperature: f32,
    pub rules: Vec<StyleRule>,
    /// 文構造の組み替え（1 パスにつき最初に一致した 1 件のみ）
    pub restructures: Vec<StyleRule>,
}

impl StyleRuleSet {
    pub fn apply(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_string(), |acc, rule| rule.apply(&acc))
    }

    pub fn restructure(&self, text: &str) -> String {
        match self.restructures.iter().find(|r| r.is_match(text)) {
            Some(rule) => rule.apply(text),
            None => text.to_string(),
        }
    }
}

fn expand_contractions() -> Vec<StyleRule> {
    vec![
        StyleRule::new(r"\bcan['’]t\b", "cannot"),
        StyleRule::new(r"\bwon['’]t\b", "will not"),
        StyleRule::new(r"\bshan['’]t\b", "shall not"),
        StyleRule::new(
            r"\b(do|does|did|is|are|was|were|has|have|had|should|would|could|must)n['’]t\b",
            "$1 not",
        ),
        StyleRule::new(r"\bI['’]m\b", "I am"),
        StyleRule::new(r"\b(you|we|they)['’]re\b", "$1 are"),
        StyleRule::new(r"\b(it|that|there|what)['’]s\b", "$1 is"),
        StyleRule::new(r"\b(I|you|we|they)['’]ve\b", "$1 have"),
        StyleRule::new(r"\b(I|you|we|they|he|she)['’]ll\b", "$1 will"),
        StyleRule::new(r"\blet['’]s\b", "let us"),
    ]
}

fn formal_rules() -> Vec<StyleRule> {
    let mut rules = expand_contractions();
    rules.extend([
        StyleRule::new(r"\bgonna\b", "going to"),
        StyleRule::new(r"\bwanna\b", "want to"),
        StyleRule::new(r"\bgotta\b", "have to"),
        StyleRule::new(r"\bkids\b", "children"),
        StyleRule::new(r"\ba lot of\b", "a great deal of"),
        StyleRule::new(r"\bguys\b", "everyone"),
    ]);
    rules
}

fn casual_rules() -> Vec<StyleRule> {
    vec![
        StyleRule::new(r"\bcan\s?not\b", "can't"),
        StyleRule::new(r"\bwill not\b", "won't"),
        StyleRule::new(
            r"\b(do|does|did|is|are|was|were|has|have|had|should|would|could) not\b",
            "${1}n't",
        ),
        StyleRule::new(r"\bI am\b", "I'm"),
        StyleRule::new(r"\b(you|we|they) are\b", "${1}'re"),
        StyleRule::new(r"\b(it|that) is\b", "${1}'s"),
        StyleRule::new(r"\blet us\b", "let's"),
        StyleRule::new(r"\bchildren\b", "kids"),
    ]
}

fn academic_rules() -> Vec<StyleRule> {
    let mut rules = expand_contractions();
    rules.extend([
        StyleRule::new(r"\bshows\b", "demonstrates"),
        StyleRule::new(r"\bshowed\b", "demonstrated"),
        StyleRule::new(r"\bshow\b", "demonstrate"),
        StyleRule::new(r"\buses\b", "utilizes"),
        StyleRule::new(r"\buse\b", "utilize"),
        StyleRule::new(r"\bgets\b", "obtains"),
        StyleRule::new(r"\bget\b", "obtain"),
        StyleRule::new(r"\bfind out\b", "determine"),
        StyleRule::new(r"\blook at\b", "examine"),
        StyleRule::new(r"\ba lot of\b", "a considerable amount of"),
        StyleRule::new(r"\bbig\b", "substantial"),
        StyleRule::new(r"\bhelps\b", "facilitates"),
    ]);
    rules
}

fn simple_rules() -> Vec<StyleRule> {
    vec![
        StyleRule::new(r"\bin order to\b", "to"),
        StyleRule::new(r"\butilizes\b", "uses"),
        StyleRule::new(r"\butilized\b", "used"),
        StyleRule::new(r"\butilize\b", "use"),
        StyleRule::new(r"\bdemonstrates\b", "shows"),
        StyleRule::new(r"\bdemonstrate\b", "show"),
        StyleRule::new(r"\bapproximately\b", "about"),
        StyleRule::new(r"\bcommence\b", "start"),
        StyleRule::new(r"\bterminate\b", "end"),
        StyleRule::new(r"\bpurchase\b", "buy"),
        StyleRule::new(r"\bfacilitate\b", "help"),
        StyleRule::new(r"\bsubsequently\b", "later"),
        StyleRule::new(r"\bsufficient\b", "enough"),
        StyleRule::new(r"\bnumerous\b", "many"),
    ]
}

fn creative_rules() -> Vec<StyleRule> {
    vec![
        StyleRule::first(r"\b(fox|dog|cat|bird|animal|hound|canine)\b", "magnificent $1"),
        StyleRule::first(r"\b(jumps|leaps|bounds|runs|springs)\b", "gracefully $1"),
    ]
}

fn restructure_rules(style: Style) -> Vec<StyleRule> {
    match style {
        Style::Creative | Style::Formal => vec![
            StyleRule::first(r"\bwe need to (\w+)", "it is necessary to $1"),
            StyleRule::first(r"\bwe have to (\w+)", "it is essential to $1"),
            StyleRule::first(r"\bit is important to (\w+)", "it is crucial to $1"),
        ],
        _ => Vec::new(),
    }
}

/// スタイル → サンプリング温度
pub fn temperature_for(style: Style) -> f32 {
    match style {
        Style::Creative => 1.3,
        Style::Casual => 1.1,
        Style::Simple => 1.0,
        Style::Academic => 0.8,
        Style::Formal => 0.7,
    }
}

static RULE_SETS: Lazy<HashMap<Style, StyleRuleSet>> = Lazy::new(|| {
    Style::ALL
        .iter()
        .map(|&style| {
            let rules = match style {
                Style::Simple => simple_rules(),
                Style::Formal => formal_rules(),
                Style::Casual => casual_rules(),
                Style::Creative => creative_rules(),
                Style::Academic => academic_rules(),
            };
            let set = StyleRuleSet {
                style,
                temperature: temperature_for(style),
                rules,
                restructures: restructure_rules(style),
            };
            (style, set)
        })
        .collect()
});

/// スタイルのルールセットを取得する（プロセス起動後に一度だけ構築）
pub fn rule_set(style: Style) -> &'static StyleRuleSet {
    &RULE_SETS[&style]
}
