//! 複数ストラテジーによる英文言い換えコア。
//!
//! 入力検証のあと、ローカルモデル → (任意) リモートモデル → ヒューリスティック →
//! ルールベースの順に試行し、最初に閾値を超えた結果を返す。

pub mod domain;
pub mod infra;
pub mod usecase;

pub use domain::error::{AppError, ErrorCode};
pub use domain::quality::{assess_quality, QualityIssue};
pub use domain::settings::ParaphraserSettings;
pub use domain::types::{ParaphraseRequest, ParaphraseResult, Style, StrategyKind};
pub use usecase::ParaphraseService;
