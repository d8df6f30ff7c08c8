use async_trait::async_trait;
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::{Captures, Regex};

use super::collect_alternatives;
use crate::domain::strategy::{ParaphraseStrategy, RandomSource, StrategyError};
use crate::domain::types::{ParaphraseRequest, ParaphraseResult, Style, StrategyKind};
use crate::infra::lexicon::{self, capitalize, match_case};
use crate::infra::post_processor::PostProcessor;

/// 構造変換まで行うが意味検証はしないので固定値
pub const HEURISTIC_CONFIDENCE: f32 = 0.6;

/// この語数以下の文は直前の文に結合する
const SHORT_SENTENCE_WORDS: usize = 3;

const TRANSITIONS: &[&str] = &["Additionally", "Furthermore", "Moreover", "In addition"];

const DETERMINERS: &str = "the|a|an|this|that|these|those|our|my|his|her|their|its|your";

static PASSIVE_VOICE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b(?P<subject>(?i:{DETERMINERS})\s+\w+|\w+) was (?P<verb>\w+ed) by (?P<agent>(?i:{DETERMINERS})\s+\w+|\w+)"
    ))
    .expect("invalid passive voice pattern")
});

static LEADING_ADVERB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|[.!?]\s+)(However|Also|So|But|Anyway|Finally|Basically|Actually),")
        .expect("invalid leading adverb pattern")
});

/// 文末候補。実際に区切るかは `is_sentence_break` で判定する
static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+(?:\s+|$)").expect("invalid sentence end pattern"));

/// ピリオドが付いても文末ではない略語（末尾のピリオドを除いた小文字形）
const ABBREVIATIONS: &[&str] = &[
    "dr", "mr", "mrs", "ms", "prof", "st", "jr", "sr", "vs", "etc", "e.g", "i.e", "u.s", "u.k",
    "inc", "ltd", "co", "no", "fig", "approx",
];

/// 文頭の接続詞とみなす語（既にあれば接続詞を重ねない）
const CONNECTIVES: &[&str] = &[
    "additionally", "furthermore", "moreover", "in addition", "nevertheless", "however",
    "therefore", "also", "yet", "still", "lastly", "essentially", "in fact", "in any case",
];

/// 接続詞の後ろで小文字にしてよい文頭語
const LOWERABLE_STARTERS: &[&str] = &[
    "the", "a", "an", "it", "this", "that", "these", "those", "we", "they", "he", "she", "you",
    "there", "our", "my", "his", "her", "their", "its", "your", "in", "on", "at", "for", "with",
    "as", "when", "if", "some", "many", "most", "all", "each", "every",
];

/// 文レベルの組み替え（受動態→能動態、文の結合、接続詞挿入）を加える
/// ルールベースの言い換え。外部呼び出しはしない。
#[derive(Debug, Clone, Default)]
pub struct HeuristicStrategy {
    random: RandomSource,
}

impl HeuristicStrategy {
    pub fn new(random: RandomSource) -> Self {
        Self { random }
    }

    pub fn rewrite(&self, request: &ParaphraseRequest, count: usize) -> ParaphraseResult {
        let text = request.text.as_str();
        let mut rng = self.random.rng();

        let primary = Self::pass(text, request.style, &mut rng);
        let alternatives = collect_alternatives(text, &primary, count, || {
            Self::pass(text, request.style, &mut rng)
        });

        ParaphraseResult::new(text, primary, HEURISTIC_CONFIDENCE, alternatives)
    }

    fn pass<R: Rng + ?Sized>(text: &str, style: Style, rng: &mut R) -> String {
        let substituted = lexicon::substitute_words(text, rng).text;
        let active = passive_to_active(&substituted);
        let restructured = lexicon::restructure(&active, style);
        let adverbs = replace_leading_adverbs(&restructured);
        let sentences = merge_short_sentences(split_sentences(&adverbs));
        let joined = insert_transition(sentences, rng).join(" ");
        PostProcessor::finish(&lexicon::apply_style(&joined, style))
    }
}

/// "<subject> was <verb-ed> by <agent>" → "<agent> <verb-ed> <subject>"
pub fn passive_to_active(text: &str) -> String {
    PASSIVE_VOICE
        .replace_all(text, |caps: &Captures| {
            let subject = &caps["subject"];
            let verb = &caps["verb"];
            let agent = &caps["agent"];

            let starts_upper = subject.chars().next().map(char::is_uppercase).unwrap_or(false);
            let agent = to_subject_case(agent);
            let agent = if starts_upper { capitalize(&agent) } else { agent };

            format!("{agent} {verb} {}", to_object_case(subject))
        })
        .into_owned()
}

/// 目的語位置の代名詞を主格に（him → he）。限定詞で始まる句は小文字化しない。
fn to_subject_case(phrase: &str) -> String {
    let swapped = match phrase.to_lowercase().as_str() {
        "me" => "I",
        "him" => "he",
        "her" => "she",
        "us" => "we",
        "them" => "they",
        _ => return lower_determiner(phrase),
    };
    swapped.to_string()
}

/// 主語位置の代名詞を目的格に（he → him）、文頭の限定詞を小文字に
fn to_object_case(phrase: &str) -> String {
    let swapped = match phrase.to_lowercase().as_str() {
        "i" => "me",
        "he" => "him",
        "she" => "her",
        "we" => "us",
        "they" => "them",
        _ => return lower_determiner(phrase),
    };
    swapped.to_string()
}

fn lower_determiner(phrase: &str) -> String {
    let first = phrase.split_whitespace().next().unwrap_or_default();
    if phrase.contains(' ') && DETERMINERS.split('|').any(|d| d.eq_ignore_ascii_case(first)) {
        lower_first(phrase)
    } else {
        phrase.to_string()
    }
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// 文頭の副詞を言い換える（However, → Nevertheless,）
pub fn replace_leading_adverbs(text: &str) -> String {
    LEADING_ADVERB
        .replace_all(text, |caps: &Captures| {
            let replacement = match &caps[2] {
                "However" => "Nevertheless",
                "Also" => "Additionally",
                "So" => "Therefore",
                "But" => "Yet",
                "Anyway" => "In any case",
                "Finally" => "Lastly",
                "Basically" => "Essentially",
                "Actually" => "In fact",
                other => other,
            };
            format!("{}{},", &caps[1], match_case(&caps[2], replacement))
        })
        .into_owned()
}

/// 文に分割する。句読点の後に空白と大文字が続く位置か、入力末尾でのみ区切る。
///
/// "3.5" のような小数や "Dr. Smith" のような略語の後では区切らない。
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in SENTENCE_END.find_iter(text) {
        if !is_sentence_break(text, m.start(), m.end()) {
            continue;
        }
        let sentence = text[start..m.end()].trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        start = m.end();
    }

    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}

fn is_sentence_break(text: &str, punct_start: usize, end: usize) -> bool {
    let Some(next) = text[end..].chars().next() else {
        return true;
    };
    if !next.is_uppercase() {
        return false;
    }

    let token = text[..punct_start]
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or_default()
        .trim_start_matches(|c: char| !c.is_alphanumeric());
    let is_initial = token.chars().count() == 1 && token.chars().all(char::is_uppercase);
    let lowered = token.to_lowercase();
    !(is_initial || ABBREVIATIONS.contains(&lowered.as_str()))
}

/// 3 語以下の文を直前の文にカンマで結合する。
/// 直前の文が疑問文や感嘆文なら記号を失うので結合しない。
fn merge_short_sentences(sentences: Vec<String>) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(sentences.len());

    for sentence in sentences {
        let words = sentence.split_whitespace().count();
        match merged.last_mut() {
            Some(prev) if words <= SHORT_SENTENCE_WORDS && prev.ends_with('.') => {
                let head = prev.trim_end_matches('.').to_string();
                *prev = format!("{head}, {}", lower_starter(&sentence));
            }
            _ => merged.push(sentence),
        }
    }

    merged
}

/// 2 文目の前にランダムな接続詞を挿入する（既に接続詞があれば何もしない）
fn insert_transition<R: Rng + ?Sized>(mut sentences: Vec<String>, rng: &mut R) -> Vec<String> {
    if sentences.len() < 2 {
        return sentences;
    }

    let second = &sentences[1];
    let lowered = second.to_lowercase();
    if CONNECTIVES.iter().any(|c| lowered.starts_with(c)) {
        return sentences;
    }

    if let Some(transition) = TRANSITIONS.choose(rng) {
        sentences[1] = format!("{transition}, {}", lower_starter(second));
    }
    sentences
}

fn lower_starter(sentence: &str) -> String {
    let first = sentence
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .trim_matches(|c: char| !c.is_alphanumeric());
    if LOWERABLE_STARTERS.iter().any(|w| w.eq_ignore_ascii_case(first)) {
        lower_first(sentence)
    } else {
        sentence.to_string()
    }
}

#[async_trait]
impl ParaphraseStrategy for HeuristicStrategy {
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
        StrategyKind::Heuristic
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}
