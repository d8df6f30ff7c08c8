use serde::Serialize;
use std::io::BufRead;
use std::path::Path;

use pp_core::domain::error::AppError;
use pp_core::infra::lexicon::temperature_for;
use pp_core::usecase::HealthReport;
use pp_core::{ParaphraseRequest, ParaphraseResult, ParaphraseService, Style};

/// コマンドエラー型
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    App(#[from] AppError),
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

impl CommandError {
    /// 入力検証エラーは終了コード 2、それ以外は 1
    pub fn exit_code(&self) -> u8 {
        match self {
            CommandError::App(e) if e.code.is_validation() => 2,
            _ => 1,
        }
    }
}

pub type CmdResult<T> = Result<T, CommandError>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleInfo {
    pub style: Style,
    pub temperature: f32,
    pub prefers_model: bool,
}

pub async fn rewrite(
    service: &ParaphraseService,
    text: String,
    style: Style,
    count: Option<usize>,
    language: Option<String>,
) -> CmdResult<ParaphraseResult> {
    let mut request = ParaphraseRequest::new(text, style);
    if let Some(language) = language {
        request = request.with_language(language);
    }
    let result = match count {
        Some(count) => service.paraphrase_with_count(&request, count).await?,
        None => service.paraphrase(&request).await?,
    };
    Ok(result)
}

/// 1 行 1 テキストで読み込み、空行は飛ばす
pub fn read_lines(file: Option<&Path>) -> CmdResult<Vec<String>> {
    let lines: Vec<String> = match file {
        Some(path) => std::fs::read_to_string(path)?
            .lines()
            .map(str::to_string)
            .collect(),
        None => std::io::stdin().lock().lines().collect::<Result<_, _>>()?,
    };
    Ok(lines
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .collect())
}

pub async fn batch(
    service: &ParaphraseService,
    texts: Vec<String>,
    style: Style,
) -> CmdResult<Vec<ParaphraseResult>> {
    let requests: Vec<ParaphraseRequest> = texts
        .into_iter()
        .map(|text| ParaphraseRequest::new(text, style))
        .collect();
    log::info!("Processing batch of {} items", requests.len());
    Ok(service.paraphrase_bulk(&requests).await?)
}

pub async fn health(service: &ParaphraseService) -> HealthReport {
    service.health().await
}

pub fn styles() -> Vec<StyleInfo> {
    Style::ALL
        .into_iter()
        .map(|style| StyleInfo {
            style,
            temperature: temperature_for(style),
            prefers_model: style.prefers_model(),
        })
        .collect()
}
