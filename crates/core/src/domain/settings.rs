use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::AppError;

pub const ENV_API_KEY: &str = "PARAPHRASER_API_KEY";
pub const ENV_MODEL_CMD: &str = "PARAPHRASER_MODEL_CMD";
pub const ENV_SEED: &str = "PARAPHRASER_SEED";

/// アプリケーション設定（TOML から読み込む）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParaphraserSettings {
    pub cascade: CascadeSettings,
    pub local_model: LocalModelConfig,
    pub remote_model: RemoteModelConfig,
}

/// カスケード（ストラテジー選択）の設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeSettings {
    /// モデル系ストラテジーの採用閾値（これを超えたら採用）
    pub model_threshold: f32,
    /// ヒューリスティックの採用閾値
    pub heuristic_threshold: f32,
    /// リモートモデルを自動フォールバックに含めるか（既定は手動のみ）
    pub remote_fallback_enabled: bool,
    /// 代替表現のデフォルト件数
    pub default_alternatives: usize,
    /// バッチ上限
    pub max_batch_size: usize,
    /// 乱数シード (None = エントロピー)
    pub seed: Option<u64>,
}

impl Default for CascadeSettings {
    fn default() -> Self {
        Self {
            model_threshold: 0.5,
            heuristic_threshold: 0.3,
            remote_fallback_enabled: false,
            default_alternatives: 3,
            max_batch_size: 10,
            seed: None,
        }
    }
}

/// ローカルモデル sidecar の設定。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalModelConfig {
    /// 実行ファイルのパス（PATH 上のコマンド名でも可）
    pub command: PathBuf,
    /// text/style/count の前に置く引数 (例: スクリプトパス)
    pub args: Vec<String>,
    /// タイムアウト秒数
    pub timeout_secs: u64,
    /// 同時に起動できるプロセス数
    pub max_concurrent_processes: usize,
}

impl Default for LocalModelConfig {
    fn default() -> Self {
        Self {
            command: PathBuf::from("python3"),
            args: vec!["scripts/paraphrase_model.py".into()],
            timeout_secs: 25,
            max_concurrent_processes: 2,
        }
    }
}

/// リモート推論エンドポイントの設定。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteModelConfig {
    pub endpoint: String,
    /// Bearer トークン。環境変数 PARAPHRASER_API_KEY が優先。
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub max_in_flight: usize,
}

impl Default for RemoteModelConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-inference.huggingface.co/models/humarin/chatgpt_paraphraser_on_T5_base"
                .into(),
            api_key: None,
            timeout_secs: 10,
            max_in_flight: 4,
        }
    }
}

impl ParaphraserSettings {
    /// TOML 文字列から読み込む。未指定の項目はデフォルト値。
    pub fn from_toml_str(s: &str) -> Result<Self, AppError> {
        toml::from_str(s).map_err(|e| AppError::config(format!("Invalid config: {e}")))
    }

    /// 設定ファイルから読み込み、環境変数で上書きする。
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("Cannot read config {}: {e}", path.display())))?;
        let mut settings = Self::from_toml_str(&content)?;
        settings.apply_env_overrides();
        Ok(settings)
    }

    /// デフォルトパスの設定を読む。ファイルがなければデフォルト値。
    pub fn load_default() -> Result<Self, AppError> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                let mut settings = Self::default();
                settings.apply_env_overrides();
                Ok(settings)
            }
        }
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(key) = get(ENV_API_KEY).filter(|k| !k.trim().is_empty()) {
            self.remote_model.api_key = Some(key);
        }
        if let Some(cmd) = get(ENV_MODEL_CMD).filter(|c| !c.trim().is_empty()) {
            self.local_model.command = PathBuf::from(cmd);
            self.local_model.args.clear();
        }
        if let Some(seed) = get(ENV_SEED).and_then(|s| s.trim().parse().ok()) {
            self.cascade.seed = Some(seed);
        }
    }
}

/// `<config_dir>/paraphraser/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("paraphraser").join("config.toml"))
}
