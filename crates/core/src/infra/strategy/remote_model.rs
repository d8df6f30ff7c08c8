use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::domain::settings::RemoteModelConfig;
use crate::domain::strategy::{ParaphraseStrategy, StrategyError};
use crate::domain::types::{ParaphraseRequest, ParaphraseResult, StrategyKind, MAX_ALTERNATIVES};
use crate::infra::lexicon::temperature_for;

pub const REMOTE_MODEL_CONFIDENCE: f32 = 0.85;
/// 出力が空・原文と同一だったときの confidence
const UNCHANGED_CONFIDENCE: f32 = 0.3;
const MAX_LENGTH: u32 = 512;

/// モデルが返しがちな前置き
const OUTPUT_PREFIXES: &[&str] = &["paraphrased:", "paraphrase:", "result:", "output:"];

/// HTTP 推論エンドポイントを使用した言い換え
pub struct RemoteModelStrategy {
    client: reqwest::Client,
    config: RemoteModelConfig,
    permits: Arc<Semaphore>,
}

#[derive(Serialize)]
struct InferenceRequest {
    inputs: String,
    parameters: InferenceParameters,
}

#[derive(Serialize)]
struct InferenceParameters {
    temperature: f32,
    num_return_sequences: usize,
    max_length: u32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Many(Vec<Generated>),
    One(Generated),
}

#[derive(Deserialize)]
struct Generated {
    generated_text: String,
}

impl InferenceRequest {
    /// 主結果 1 件 + 代替 `count` 件を要求する
    fn new(request: &ParaphraseRequest, count: usize) -> Self {
        Self {
            inputs: format!("paraphrase: {}", request.text),
            parameters: InferenceParameters {
                temperature: temperature_for(request.style),
                num_return_sequences: count.min(MAX_ALTERNATIVES) + 1,
                max_length: MAX_LENGTH,
            },
        }
    }
}

impl InferenceResponse {
    fn into_texts(self) -> Vec<String> {
        match self {
            Self::Many(items) => items.into_iter().map(|g| g.generated_text).collect(),
            Self::One(item) => vec![item.generated_text],
        }
    }
}

impl RemoteModelStrategy {
    pub fn new(config: RemoteModelConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Failed to build HTTP client ({e}), using defaults");
                reqwest::Client::new()
            });
        let permits = Arc::new(Semaphore::new(config.max_in_flight.max(1)));

        Self {
            client,
            config,
            permits,
        }
    }

    pub fn config(&self) -> &RemoteModelConfig {
        &self.config
    }

    fn api_key(&self) -> Option<&str> {
        self.config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// 先頭の前置き ("Paraphrase: ..." など) を大小文字を無視して取り除く。
fn strip_prefixes(text: &str) -> &str {
    let mut text = text.trim();
    'outer: loop {
        for prefix in OUTPUT_PREFIXES {
            let matches = text
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix));
            if matches {
                text = text[prefix.len()..].trim_start();
                continue 'outer;
            }
        }
        return text;
    }
}

#[async_trait]
impl ParaphraseStrategy for RemoteModelStrategy {
    async fn paraphrase(
        &self,
        request: &ParaphraseRequest,
        count: usize,
    ) -> Result<ParaphraseResult, StrategyError> {
        let api_key = self
            .api_key()
            .ok_or_else(|| StrategyError::unavailable("API key is not configured"))?;

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| StrategyError::unavailable("Request pool is closed"))?;

        let count = count.min(MAX_ALTERNATIVES);
        let body = InferenceRequest::new(request, count);

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    StrategyError::timeout(format!(
                        "Remote model timed out after {}s",
                        self.config.timeout_secs
                    ))
                } else {
                    StrategyError::failed(format!("HTTP request failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StrategyError::failed(format!(
                "Inference API error: {status} - {body}"
            )));
        }

        let parsed: InferenceResponse = response
            .json()
            .await
            .map_err(|e| StrategyError::invalid_output(format!("Response parse error: {e}")))?;

        let mut texts = parsed
            .into_texts()
            .into_iter()
            .map(|t| strip_prefixes(&t).to_string())
            .filter(|t| !t.is_empty());

        let primary = texts.next().unwrap_or_default();
        if primary.is_empty() || primary.to_lowercase() == request.text.to_lowercase() {
            log::debug!("Remote model returned no change, keeping original text");
            return Ok(ParaphraseResult::new(
                &request.text,
                request.text.clone(),
                UNCHANGED_CONFIDENCE,
                texts.take(count),
            ));
        }

        Ok(ParaphraseResult::new(
            &request.text,
            primary,
            REMOTE_MODEL_CONFIDENCE,
            texts.take(count),
        ))
    }

    async fn is_available(&self) -> bool {
        self.api_key().is_some()
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::RemoteModel
    }

    fn name(&self) -> &str {
        "remote-model"
    }
}
