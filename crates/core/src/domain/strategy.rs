use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::types::{ParaphraseRequest, ParaphraseResult, StrategyKind};

// ─── StrategyError ───────────────────────────────────────────────

/// ストラテジー実行で発生するエラー。
///
/// カスケード内で吸収され、呼び出し元には返らない（ログとメトリクスのみ）。
#[derive(Debug, Clone, thiserror::Error)]
#[error("StrategyError::{kind:?}: {detail}")]
pub struct StrategyError {
    /// エラー種別
    pub kind: StrategyErrorKind,
    /// 人間が読める詳細メッセージ
    pub detail: String,
}

/// ストラテジーエラー種別。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyErrorKind {
    /// 実行ファイル未検出・認証情報なし等
    Unavailable,
    /// プロセス/ネットワークが制限時間を超過
    Timeout,
    /// 実行中のエラー (非ゼロ終了、HTTPエラー等)
    Failed,
    /// 出力が空/解析不能
    InvalidOutput,
}

impl StrategyError {
    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self { kind: StrategyErrorKind::Unavailable, detail: detail.into() }
    }

    pub fn timeout(detail: impl Into<String>) -> Self {
        Self { kind: StrategyErrorKind::Timeout, detail: detail.into() }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self { kind: StrategyErrorKind::Failed, detail: detail.into() }
    }

    pub fn invalid_output(detail: impl Into<String>) -> Self {
        Self { kind: StrategyErrorKind::InvalidOutput, detail: detail.into() }
    }
}

// ─── RandomSource ────────────────────────────────────────────────

/// 同義語・接続詞選択に使う乱数源。
///
/// 呼び出しごとに新しい `StdRng` を生成するので、リクエスト間で可変状態を共有しない。
/// `Seeded` は同じ入力に対して常に同じ出力を返す（テスト用）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RandomSource {
    #[default]
    Entropy,
    Seeded(u64),
}

impl RandomSource {
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map(RandomSource::Seeded).unwrap_or_default()
    }

    pub fn rng(&self) -> StdRng {
        match self {
            RandomSource::Entropy => StdRng::from_entropy(),
            RandomSource::Seeded(seed) => StdRng::seed_from_u64(*seed),
        }
    }
}

// ─── ParaphraseStrategy trait ────────────────────────────────────

/// 言い換えストラテジーのコアトレイト。全実装がこれを満たす。
#[async_trait::async_trait]
pub trait ParaphraseStrategy: Send + Sync {
    /// 言い換えを試みる。`count` は希望する代替表現の件数。
    async fn paraphrase(
        &self,
        request: &ParaphraseRequest,
        count: usize,
    ) -> Result<ParaphraseResult, StrategyError>;

    /// ヘルスチェック用の軽量な利用可否判定。カスケードの判断には使わない。
    async fn is_available(&self) -> bool;

    fn kind(&self) -> StrategyKind;

    /// ストラテジー名 (例: "rule-based", "local-model")。
    fn name(&self) -> &str;
}
