use serde::{Deserialize, Serialize};

/// 代替表現の最大件数
pub const MAX_ALTERNATIVES: usize = 3;

/// 言い換えスタイル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    Simple,
    Formal,
    Casual,
    Creative,
    Academic,
}

impl Style {
    pub const ALL: [Style; 5] = [
        Style::Simple,
        Style::Formal,
        Style::Casual,
        Style::Creative,
        Style::Academic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Simple => "simple",
            Style::Formal => "formal",
            Style::Casual => "casual",
            Style::Creative => "creative",
            Style::Academic => "academic",
        }
    }

    /// モデル系ストラテジーを優先するスタイルか（creative / formal / casual）
    pub fn prefers_model(&self) -> bool {
        matches!(self, Style::Creative | Style::Formal | Style::Casual)
    }
}

impl std::fmt::Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Style {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(Style::Simple),
            "formal" => Ok(Style::Formal),
            "casual" => Ok(Style::Casual),
            "creative" => Ok(Style::Creative),
            "academic" => Ok(Style::Academic),
            other => Err(format!("unknown style: {other}")),
        }
    }
}

/// 言い換えリクエスト（検証後は不変）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParaphraseRequest {
    pub text: String,
    pub style: Style,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,
}

impl ParaphraseRequest {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
            target_language: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.target_language = Some(language.into());
        self
    }
}

/// 言い換え結果。
///
/// `new` を通して構築すると以下が保証される:
/// - confidence は [0, 1] に収まる
/// - paraphrased_text は空にならない（空なら原文）
/// - alternative_versions は原文・主結果・重複を含まず、最大 3 件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParaphraseResult {
    pub paraphrased_text: String,
    pub confidence: f32,
    pub alternative_versions: Vec<String>,
}

impl ParaphraseResult {
    pub fn new(
        original: &str,
        primary: impl Into<String>,
        confidence: f32,
        candidates: impl IntoIterator<Item = String>,
    ) -> Self {
        let primary = primary.into();
        let paraphrased_text = if primary.trim().is_empty() {
            original.to_string()
        } else {
            primary.trim().to_string()
        };

        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };

        let mut alternative_versions: Vec<String> = Vec::with_capacity(MAX_ALTERNATIVES);
        for candidate in candidates {
            if alternative_versions.len() >= MAX_ALTERNATIVES {
                break;
            }
            let candidate = candidate.trim();
            if candidate.is_empty()
                || candidate == original.trim()
                || candidate == paraphrased_text
                || alternative_versions.iter().any(|a| a == candidate)
            {
                continue;
            }
            alternative_versions.push(candidate.to_string());
        }

        Self {
            paraphrased_text,
            confidence,
            alternative_versions,
        }
    }

    /// バッチ処理で失敗した項目の代わりに置くプレースホルダー
    pub fn placeholder() -> Self {
        Self {
            paraphrased_text: String::new(),
            confidence: 0.0,
            alternative_versions: Vec::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.paraphrased_text.is_empty() && self.confidence == 0.0
    }
}

/// カスケード内のストラテジー種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    RuleBased,
    Heuristic,
    LocalModel,
    RemoteModel,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::RuleBased => "rule_based",
            StrategyKind::Heuristic => "heuristic",
            StrategyKind::LocalModel => "local_model",
            StrategyKind::RemoteModel => "remote_model",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
