use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tokio::time::timeout;

use crate::domain::settings::LocalModelConfig;
use crate::domain::strategy::{ParaphraseStrategy, StrategyError};
use crate::domain::types::{
    ParaphraseRequest, ParaphraseResult, Style, StrategyKind, MAX_ALTERNATIVES,
};

/// 正常終了かつ出力ありのときの固定 confidence
pub const LOCAL_MODEL_CONFIDENCE: f32 = 0.9;

/// ログ行とみなして読み飛ばす接頭辞
const LOG_PREFIXES: &[&str] = &["INFO:", "WARNING:", "ERROR:", "DEBUG:"];

/// ローカル言い換えモデルの sidecar プロセスマネージャ。
///
/// `<command> [args..] <text> <style> <count>` を起動し、標準出力の 1 行目を主結果、
/// 残りを代替表現とする。同時起動数はセマフォで制限し、空きがなければ待つ。
pub struct LocalModelStrategy {
    config: LocalModelConfig,
    permits: Arc<Semaphore>,
}

impl LocalModelStrategy {
    pub fn new(config: LocalModelConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent_processes.max(1)));
        Self { config, permits }
    }

    pub fn config(&self) -> &LocalModelConfig {
        &self.config
    }

    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs)
    }

    /// 実行ファイルの存在を検証する。
    pub fn validate(&self) -> Result<(), StrategyError> {
        if which_binary(&self.config.command).is_none() {
            return Err(StrategyError::unavailable(format!(
                "Model executable not found: {:?}",
                self.config.command
            )));
        }
        Ok(())
    }

    /// コマンドライン引数を構築する。
    fn build_args(
        config: &LocalModelConfig,
        text: &str,
        style: Style,
        count: usize,
    ) -> Vec<String> {
        let mut args = config.args.clone();
        args.push(text.to_string());
        args.push(style.as_str().to_string());
        args.push(count.min(MAX_ALTERNATIVES).to_string());
        args
    }

    /// sidecar を実行して標準出力の候補行を返す。
    async fn run_model(
        &self,
        text: &str,
        style: Style,
        count: usize,
    ) -> Result<Vec<String>, StrategyError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| StrategyError::unavailable("Model process pool is closed"))?;

        let args = Self::build_args(&self.config, text, style, count);

        log::debug!(
            "Running local model: {:?} (style={style}, count={count})",
            self.config.command
        );

        let child = Command::new(&self.config.command)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => StrategyError::unavailable(format!(
                    "Model executable not found: {:?}",
                    self.config.command
                )),
                std::io::ErrorKind::PermissionDenied => StrategyError::unavailable(format!(
                    "Cannot execute model executable: {e}"
                )),
                _ => StrategyError::failed(format!("Failed to spawn model process: {e}")),
            })?;

        // タイムアウト時は future ごと drop され、kill_on_drop でプロセスも終了する
        let output = timeout(self.time_limit(), child.wait_with_output())
            .await
            .map_err(|_| {
                StrategyError::timeout(format!(
                    "Local model timed out after {}s",
                    self.config.timeout_secs
                ))
            })?
            .map_err(|e| StrategyError::failed(format!("Model process error: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StrategyError::failed(format!(
                "Model exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| StrategyError::invalid_output(format!("Model output is not UTF-8: {e}")))?;
        parse_model_output(&stdout)
    }
}

/// 標準出力を候補行に分解する。空行・ログ行は除外し、1 件もなければエラー。
fn parse_model_output(stdout: &str) -> Result<Vec<String>, StrategyError> {
    let lines: Vec<String> = stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !LOG_PREFIXES.iter().any(|p| line.starts_with(p)))
        .map(str::to_string)
        .collect();

    if lines.is_empty() {
        return Err(StrategyError::invalid_output("Model produced no output"));
    }
    Ok(lines)
}

/// PATH 上でバイナリを検索する簡易ヘルパー。
fn which_binary(name: &Path) -> Option<PathBuf> {
    if name.components().count() > 1 || name.is_absolute() {
        // 絶対/相対パスの場合はそのまま確認
        return if name.is_file() { Some(name.to_path_buf()) } else { None };
    }
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(name))
        .find(|full_path| full_path.is_file())
}

#[async_trait::async_trait]
impl ParaphraseStrategy for LocalModelStrategy {
    async fn paraphrase(
        &self,
        request: &ParaphraseRequest,
        count: usize,
    ) -> Result<ParaphraseResult, StrategyError> {
        let mut lines = self
            .run_model(&request.text, request.style, count.clamp(1, MAX_ALTERNATIVES))
            .await?
            .into_iter();

        let primary = lines.next().unwrap_or_default();
        Ok(ParaphraseResult::new(
            &request.text,
            primary,
            LOCAL_MODEL_CONFIDENCE,
            lines.take(count),
        ))
    }

    async fn is_available(&self) -> bool {
        self.validate().is_ok()
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::LocalModel
    }

    fn name(&self) -> &str {
        "local-model"
    }
}

// ─── テスト ─────────────────────────────────────────────────────
