use futures::future::join_all;
use futures::FutureExt;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout, Instant};

use crate::domain::error::AppError;
use crate::domain::quality::assess_quality;
use crate::domain::settings::ParaphraserSettings;
use crate::domain::strategy::{ParaphraseStrategy, RandomSource, StrategyErrorKind};
use crate::domain::types::{
    ParaphraseRequest, ParaphraseResult, Style, StrategyKind, MAX_ALTERNATIVES,
};
use crate::domain::validation::{validate_batch_size, validate_text};
use crate::infra::metrics::{FallthroughReason, Metrics, MetricsSummary};
use crate::infra::post_processor::PostProcessor;
use crate::infra::strategy::{
    HeuristicStrategy, LocalModelStrategy, RemoteModelStrategy, RuleBasedStrategy,
};

/// ストラテジー自身のタイムアウトに上乗せする猶予
const TIMEOUT_GRACE: Duration = Duration::from_secs(1);
/// health() で is_available() を待つ上限
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// カスケードを構成するストラテジー群。
///
/// 最終段の `rule_based` はトレイトオブジェクトではなく具象型で持つ。
/// これが失敗しないので、カスケードは必ず結果を返す。
pub struct Strategies {
    pub local_model: Arc<dyn ParaphraseStrategy>,
    pub remote_model: Option<Arc<dyn ParaphraseStrategy>>,
    pub heuristic: Arc<dyn ParaphraseStrategy>,
    pub rule_based: RuleBasedStrategy,
}

impl Strategies {
    pub fn from_settings(settings: &ParaphraserSettings) -> Self {
        let random = RandomSource::from_seed(settings.cascade.seed);
        Self {
            local_model: Arc::new(LocalModelStrategy::new(settings.local_model.clone())),
            remote_model: Some(Arc::new(RemoteModelStrategy::new(
                settings.remote_model.clone(),
            ))),
            heuristic: Arc::new(HeuristicStrategy::new(random)),
            rule_based: RuleBasedStrategy::new(random),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyHealth {
    pub kind: StrategyKind,
    pub name: String,
    pub available: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub strategies: Vec<StrategyHealth>,
    pub remote_fallback_enabled: bool,
    pub metrics: MetricsSummary,
}

/// 言い換えサービス: 入力検証 → カスケード実行 → 結果の整形
pub struct ParaphraseService {
    settings: ParaphraserSettings,
    strategies: Strategies,
    metrics: Metrics,
}

impl ParaphraseService {
    pub fn new(settings: ParaphraserSettings, strategies: Strategies) -> Self {
        Self {
            settings,
            strategies,
            metrics: Metrics::new(),
        }
    }

    pub fn from_settings(settings: ParaphraserSettings) -> Self {
        let strategies = Strategies::from_settings(&settings);
        log::info!(
            "Paraphrase service ready (local model: {:?}, remote fallback: {})",
            settings.local_model.command,
            settings.cascade.remote_fallback_enabled
        );
        Self::new(settings, strategies)
    }

    pub fn settings(&self) -> &ParaphraserSettings {
        &self.settings
    }

    pub fn metrics(&self) -> MetricsSummary {
        self.metrics.summary()
    }

    /// 最終段を除いたカスケード（順に試行される）
    fn cascade_plan(&self, style: Style) -> Vec<&Arc<dyn ParaphraseStrategy>> {
        let mut plan = Vec::with_capacity(3);
        if style.prefers_model() {
            plan.push(&self.strategies.local_model);
            if self.settings.cascade.remote_fallback_enabled {
                if let Some(remote) = &self.strategies.remote_model {
                    plan.push(remote);
                }
            }
        }
        plan.push(&self.strategies.heuristic);
        plan
    }

    /// スタイルに対して試行されるストラテジー種別の順序
    pub fn plan(&self, style: Style) -> Vec<StrategyKind> {
        self.cascade_plan(style)
            .into_iter()
            .map(|s| s.kind())
            .chain(std::iter::once(StrategyKind::RuleBased))
            .collect()
    }

    fn threshold(&self, kind: StrategyKind) -> f32 {
        match kind {
            StrategyKind::LocalModel | StrategyKind::RemoteModel => {
                self.settings.cascade.model_threshold
            }
            StrategyKind::Heuristic => self.settings.cascade.heuristic_threshold,
            StrategyKind::RuleBased => f32::NEG_INFINITY,
        }
    }

    /// 外部プロセス/ネットワークを使う試行の上限時間
    fn time_limit(&self, kind: StrategyKind) -> Option<Duration> {
        match kind {
            StrategyKind::LocalModel => {
                Some(Duration::from_secs(self.settings.local_model.timeout_secs) + TIMEOUT_GRACE)
            }
            StrategyKind::RemoteModel => {
                Some(Duration::from_secs(self.settings.remote_model.timeout_secs) + TIMEOUT_GRACE)
            }
            StrategyKind::Heuristic | StrategyKind::RuleBased => None,
        }
    }

    /// 既定の代替表現件数で言い換える
    pub async fn paraphrase(
        &self,
        request: &ParaphraseRequest,
    ) -> Result<ParaphraseResult, AppError> {
        self.paraphrase_with_count(request, self.settings.cascade.default_alternatives)
            .await
    }

    pub async fn paraphrase_with_count(
        &self,
        request: &ParaphraseRequest,
        count: usize,
    ) -> Result<ParaphraseResult, AppError> {
        let request_id = uuid::Uuid::new_v4();
        let started = Instant::now();
        let count = count.min(MAX_ALTERNATIVES);
        self.metrics.inc_requests();

        let text = PostProcessor::normalize(&request.text);
        if let Err(e) = validate_text(&text) {
            self.metrics.inc_validation_rejections();
            log::warn!("[{request_id}] Rejected request: {e}");
            return Err(e);
        }

        let request = ParaphraseRequest {
            text,
            ..request.clone()
        };

        log::debug!(
            "[{request_id}] Paraphrasing {} chars (style={}, count={count})",
            request.text.chars().count(),
            request.style
        );

        for strategy in self.cascade_plan(request.style) {
            if let Some(result) = self
                .attempt(strategy.as_ref(), &request, count, request_id)
                .await
            {
                self.finish_request(request_id, &request, &result, started);
                return Ok(result);
            }
        }

        let attempt_started = Instant::now();
        let result = self.strategies.rule_based.rewrite(&request, count);
        self.metrics.record_latency(
            StrategyKind::RuleBased.as_str(),
            attempt_started.elapsed().as_millis() as u64,
        );
        self.metrics.inc_accepted(StrategyKind::RuleBased);
        log::info!(
            "[{request_id}] Accepted rule_based result (confidence={:.2})",
            result.confidence
        );
        self.finish_request(request_id, &request, &result, started);
        Ok(result)
    }

    /// 1 ストラテジーを試行する。採用できない場合は理由を記録して None。
    async fn attempt(
        &self,
        strategy: &dyn ParaphraseStrategy,
        request: &ParaphraseRequest,
        count: usize,
        request_id: uuid::Uuid,
    ) -> Option<ParaphraseResult> {
        let kind = strategy.kind();
        let started = Instant::now();

        // パニックは失敗として扱い、カスケードを継続する
        let call = AssertUnwindSafe(strategy.paraphrase(request, count)).catch_unwind();
        let outcome = match self.time_limit(kind) {
            Some(limit) => match timeout(limit, call).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    self.metrics
                        .record_latency(kind.as_str(), started.elapsed().as_millis() as u64);
                    self.metrics
                        .inc_fallthrough(FallthroughReason::Error(StrategyErrorKind::Timeout));
                    log::warn!(
                        "[{request_id}] {} exceeded {}ms, moving on",
                        strategy.name(),
                        limit.as_millis()
                    );
                    return None;
                }
            },
            None => call.await,
        };

        self.metrics
            .record_latency(kind.as_str(), started.elapsed().as_millis() as u64);

        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                self.metrics.inc_fallthrough(FallthroughReason::Error(e.kind));
                log::warn!("[{request_id}] {} failed: {e}", strategy.name());
                return None;
            }
            Err(_) => {
                self.metrics.inc_fallthrough(FallthroughReason::Panic);
                log::warn!("[{request_id}] {} panicked", strategy.name());
                return None;
            }
        };

        let threshold = self.threshold(kind);
        if result.confidence <= threshold {
            self.metrics.inc_fallthrough(FallthroughReason::LowConfidence);
            log::info!(
                "[{request_id}] {} confidence {:.2} is not above {threshold:.2}, falling through",
                strategy.name(),
                result.confidence
            );
            return None;
        }

        self.metrics.inc_accepted(kind);
        log::info!(
            "[{request_id}] Accepted {kind} result (confidence={:.2})",
            result.confidence
        );

        // 外部実装の出力も同じ不変条件を満たすよう組み直す
        Some(ParaphraseResult::new(
            &request.text,
            result.paraphrased_text,
            result.confidence,
            result.alternative_versions.into_iter().take(count),
        ))
    }

    fn finish_request(
        &self,
        request_id: uuid::Uuid,
        request: &ParaphraseRequest,
        result: &ParaphraseResult,
        started: Instant,
    ) {
        if let Err(issue) = assess_quality(&request.text, result) {
            log::debug!("[{request_id}] Quality check: {issue}");
        }
        self.metrics
            .record_latency("request", started.elapsed().as_millis() as u64);
    }

    /// 最大 `max_batch_size` 件を並行に処理する。出力は入力と同じ順序・件数。
    ///
    /// 検証エラーやパニックになった項目はプレースホルダーに置き換え、バッチ全体は中断しない。
    pub async fn paraphrase_bulk(
        &self,
        requests: &[ParaphraseRequest],
    ) -> Result<Vec<ParaphraseResult>, AppError> {
        if let Err(e) = validate_batch_size(requests.len(), self.settings.cascade.max_batch_size) {
            self.metrics.inc_validation_rejections();
            log::warn!("Rejected batch: {e}");
            return Err(e);
        }
        self.metrics.inc_bulk_requests();

        let items = requests.iter().enumerate().map(|(index, request)| async move {
            let outcome = AssertUnwindSafe(self.paraphrase(request))
                .catch_unwind()
                .await;
            match outcome {
                Ok(Ok(result)) => result,
                Ok(Err(e)) => {
                    log::warn!("Batch item {index} replaced with placeholder: {e}");
                    self.metrics.inc_bulk_placeholders();
                    ParaphraseResult::placeholder()
                }
                Err(_) => {
                    log::warn!("Batch item {index} panicked, replaced with placeholder");
                    self.metrics.inc_bulk_placeholders();
                    ParaphraseResult::placeholder()
                }
            }
        });

        Ok(join_all(items).await)
    }

    /// 全ストラテジーの利用可否を返す
    pub async fn health(&self) -> HealthReport {
        let mut targets: Vec<&dyn ParaphraseStrategy> = vec![self.strategies.local_model.as_ref()];
        if let Some(remote) = &self.strategies.remote_model {
            targets.push(remote.as_ref());
        }
        targets.push(self.strategies.heuristic.as_ref());
        targets.push(&self.strategies.rule_based);

        let checks = targets.into_iter().map(|strategy| async move {
            let available = timeout(HEALTH_CHECK_TIMEOUT, strategy.is_available())
                .await
                .unwrap_or(false);
            StrategyHealth {
                kind: strategy.kind(),
                name: strategy.name().to_string(),
                available,
            }
        });

        HealthReport {
            strategies: join_all(checks).await,
            remote_fallback_enabled: self.settings.cascade.remote_fallback_enabled,
            metrics: self.metrics.summary(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::strategy::StrategyError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// テスト用のストラテジー（固定結果を返す）
    enum Behavior {
        Result(&'static str, f32),
        Error(StrategyErrorKind),
        Sleep(Duration),
        Panic,
    }

    struct FixedStrategy {
        kind: StrategyKind,
        behavior: Behavior,
        calls: AtomicUsize,
        last_count: AtomicUsize,
    }

    impl FixedStrategy {
        fn new(kind: StrategyKind, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                kind,
                behavior,
                calls: AtomicUsize::new(0),
                last_count: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ParaphraseStrategy for FixedStrategy {
        async fn paraphrase(
            &self,
            request: &ParaphraseRequest,
            count: usize,
        ) -> Result<ParaphraseResult, StrategyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.last_count.store(count, Ordering::SeqCst);
            match &self.behavior {
                Behavior::Result(text, confidence) => Ok(ParaphraseResult::new(
                    &request.text,
                    *text,
                    *confidence,
                    vec!["alt one".to_string(), request.text.clone()],
                )),
                Behavior::Error(kind) => Err(StrategyError {
                    kind: *kind,
                    detail: "stub".into(),
                }),
                Behavior::Sleep(d) => {
                    tokio::time::sleep(*d).await;
                    Ok(ParaphraseResult::new(&request.text, "too late", 1.0, vec![]))
                }
                Behavior::Panic => panic!("stub strategy panicked"),
            }
        }

        async fn is_available(&self) -> bool {
            !matches!(self.behavior, Behavior::Error(StrategyErrorKind::Unavailable))
        }

        fn kind(&self) -> StrategyKind {
            self.kind
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct Harness {
        local: Arc<FixedStrategy>,
        remote: Arc<FixedStrategy>,
        heuristic: Arc<FixedStrategy>,
    }

    fn service(
        settings: ParaphraserSettings,
        local: Behavior,
        remote: Behavior,
        heuristic: Behavior,
    ) -> (ParaphraseService, Harness) {
        let harness = Harness {
            local: FixedStrategy::new(StrategyKind::LocalModel, local),
            remote: FixedStrategy::new(StrategyKind::RemoteModel, remote),
            heuristic: FixedStrategy::new(StrategyKind::Heuristic, heuristic),
        };
        let strategies = Strategies {
            local_model: harness.local.clone(),
            remote_model: Some(harness.remote.clone()),
            heuristic: harness.heuristic.clone(),
            rule_based: RuleBasedStrategy::new(RandomSource::Seeded(7)),
        };
        (ParaphraseService::new(settings, strategies), harness)
    }

    fn with_remote_enabled() -> ParaphraserSettings {
        let mut settings = ParaphraserSettings::default();
        settings.cascade.remote_fallback_enabled = true;
        settings
    }

    const TEXT: &str = "The quick brown fox jumps over the lazy dog.";

    #[tokio::test]
    async fn model_result_above_threshold_is_accepted() {
        let (svc, h) = service(
            ParaphraserSettings::default(),
            Behavior::Result("A speedy fox leaps.", 0.9),
            Behavior::Result("remote", 0.9),
            Behavior::Result("heuristic", 0.6),
        );
        let result = svc
            .paraphrase(&ParaphraseRequest::new(TEXT, Style::Creative))
            .await
            .unwrap();
        assert_eq!(result.paraphrased_text, "A speedy fox leaps.");
        assert_eq!(result.alternative_versions, vec!["alt one"]);
        assert_eq!(h.heuristic.calls(), 0);
        assert_eq!(svc.metrics().accepted.local_model, 1);
    }

    #[tokio::test]
    async fn low_model_confidence_falls_through_to_heuristic() {
        let (svc, h) = service(
            ParaphraserSettings::default(),
            Behavior::Result("weak", 0.2),
            Behavior::Result("remote", 0.9),
            Behavior::Result("heuristic version", 0.6),
        );
        let result = svc
            .paraphrase(&ParaphraseRequest::new(TEXT, Style::Formal))
            .await
            .unwrap();
        assert_eq!(result.paraphrased_text, "heuristic version");
        assert_eq!(h.local.calls(), 1);
        // remote はデフォルトで無効
        assert_eq!(h.remote.calls(), 0);
        assert_eq!(svc.metrics().fallthroughs.low_confidence, 1);
    }

    #[tokio::test]
    async fn requested_count_is_capped_before_strategies() {
        let (svc, h) = service(
            with_remote_enabled(),
            Behavior::Error(StrategyErrorKind::Failed),
            Behavior::Result("remote version", 0.85),
            Behavior::Result("heuristic", 0.6),
        );
        let result = svc
            .paraphrase_with_count(&ParaphraseRequest::new(TEXT, Style::Creative), usize::MAX)
            .await
            .unwrap();
        assert_eq!(result.paraphrased_text, "remote version");
        assert_eq!(h.local.last_count.load(Ordering::SeqCst), MAX_ALTERNATIVES);
        assert_eq!(h.remote.last_count.load(Ordering::SeqCst), MAX_ALTERNATIVES);
        assert_eq!(svc.metrics().fallthroughs.panic, 0);
    }

    #[tokio::test]
    async fn threshold_is_strict() {
        let (svc, _h) = service(
            ParaphraserSettings::default(),
            Behavior::Result("exactly half", 0.5),
            Behavior::Result("remote", 0.9),
            Behavior::Result("heuristic version", 0.6),
        );
        let result = svc
            .paraphrase(&ParaphraseRequest::new(TEXT, Style::Casual))
            .await
            .unwrap();
        assert_eq!(result.paraphrased_text, "heuristic version");
    }

    #[tokio::test]
    async fn everything_failing_reaches_rule_based() {
        let (svc, _h) = service(
            ParaphraserSettings::default(),
            Behavior::Error(StrategyErrorKind::Unavailable),
            Behavior::Error(StrategyErrorKind::Failed),
            Behavior::Result("heuristic", 0.1),
        );
        let request = ParaphraseRequest::new(TEXT, Style::Creative);
        let result = svc.paraphrase(&request).await.unwrap();

        let expected = RuleBasedStrategy::new(RandomSource::Seeded(7)).rewrite(&request, 3);
        assert_eq!(result, expected);

        let m = svc.metrics();
        assert_eq!(m.accepted.rule_based, 1);
        assert_eq!(m.fallthroughs.unavailable, 1);
        assert_eq!(m.fallthroughs.low_confidence, 1);
    }

    #[tokio::test]
    async fn unchanged_rule_based_output_has_floor_confidence() {
        let (svc, _h) = service(
            ParaphraserSettings::default(),
            Behavior::Error(StrategyErrorKind::Unavailable),
            Behavior::Result("remote", 0.9),
            Behavior::Error(StrategyErrorKind::Failed),
        );
        let result = svc
            .paraphrase(&ParaphraseRequest::new("Zebras graze quietly.", Style::Simple))
            .await
            .unwrap();
        assert_eq!(result.paraphrased_text, "Zebras graze quietly.");
        assert_eq!(result.confidence, 0.3);
    }

    #[tokio::test]
    async fn non_model_styles_skip_external_models() {
        for style in [Style::Simple, Style::Academic] {
            let (svc, h) = service(
                with_remote_enabled(),
                Behavior::Result("local", 0.9),
                Behavior::Result("remote", 0.9),
                Behavior::Result("heuristic version", 0.6),
            );
            let result = svc.paraphrase(&ParaphraseRequest::new(TEXT, style)).await.unwrap();
            assert_eq!(result.paraphrased_text, "heuristic version");
            assert_eq!(h.local.calls(), 0);
            assert_eq!(h.remote.calls(), 0);
            assert_eq!(
                svc.plan(style),
                vec![StrategyKind::Heuristic, StrategyKind::RuleBased]
            );
        }
    }

    #[tokio::test]
    async fn remote_is_tried_only_when_enabled() {
        let (svc, h) = service(
            with_remote_enabled(),
            Behavior::Error(StrategyErrorKind::Failed),
            Behavior::Result("remote version", 0.85),
            Behavior::Result("heuristic", 0.6),
        );
        assert_eq!(
            svc.plan(Style::Casual),
            vec![
                StrategyKind::LocalModel,
                StrategyKind::RemoteModel,
                StrategyKind::Heuristic,
                StrategyKind::RuleBased
            ]
        );
        let result = svc
            .paraphrase(&ParaphraseRequest::new(TEXT, Style::Casual))
            .await
            .unwrap();
        assert_eq!(result.paraphrased_text, "remote version");
        assert_eq!(h.remote.calls(), 1);
        assert_eq!(h.heuristic.calls(), 0);

        let (svc, _h) = service(
            ParaphraserSettings::default(),
            Behavior::Error(StrategyErrorKind::Failed),
            Behavior::Result("remote version", 0.85),
            Behavior::Result("heuristic", 0.6),
        );
        assert_eq!(
            svc.plan(Style::Casual),
            vec![
                StrategyKind::LocalModel,
                StrategyKind::Heuristic,
                StrategyKind::RuleBased
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_strategy_is_cut_off_by_orchestrator_timeout() {
        let mut settings = ParaphraserSettings::default();
        settings.local_model.timeout_secs = 20;
        let (svc, _h) = service(
            settings,
            Behavior::Sleep(Duration::from_secs(60)),
            Behavior::Result("remote", 0.9),
            Behavior::Result("heuristic version", 0.6),
        );

        let started = Instant::now();
        let result = svc
            .paraphrase(&ParaphraseRequest::new(TEXT, Style::Creative))
            .await
            .unwrap();
        let elapsed = started.elapsed();

        assert_eq!(result.paraphrased_text, "heuristic version");
        assert!(elapsed >= Duration::from_secs(21));
        assert!(elapsed < Duration::from_secs(22));
        assert_eq!(svc.metrics().fallthroughs.timeout, 1);
    }

    #[tokio::test]
    async fn panicking_strategy_is_treated_as_failure() {
        let (svc, _h) = service(
            ParaphraserSettings::default(),
            Behavior::Panic,
            Behavior::Result("remote", 0.9),
            Behavior::Result("heuristic version", 0.6),
        );
        let result = svc
            .paraphrase(&ParaphraseRequest::new(TEXT, Style::Formal))
            .await
            .unwrap();
        assert_eq!(result.paraphrased_text, "heuristic version");
        assert_eq!(svc.metrics().fallthroughs.panic, 1);
    }

    #[tokio::test]
    async fn validation_errors_surface_before_any_strategy() {
        let (svc, h) = service(
            ParaphraserSettings::default(),
            Behavior::Result("local", 0.9),
            Behavior::Result("remote", 0.9),
            Behavior::Result("heuristic", 0.6),
        );
        let cases = [
            ("   ", ErrorCode::EmptyText),
            ("hey", ErrorCode::TextTooShort),
            ("hello <script>alert(1)</script>", ErrorCode::MaliciousContent),
        ];
        for (text, code) in cases {
            let err = svc
                .paraphrase(&ParaphraseRequest::new(text, Style::Creative))
                .await
                .unwrap_err();
            assert_eq!(err.code, code);
        }
        assert_eq!(h.local.calls(), 0);
        assert_eq!(h.heuristic.calls(), 0);
        assert_eq!(svc.metrics().validation_rejections, 3);
    }

    #[tokio::test]
    async fn input_is_normalized_before_cascade() {
        let (svc, _h) = service(
            ParaphraserSettings::default(),
            Behavior::Result("", 0.9),
            Behavior::Result("remote", 0.9),
            Behavior::Result("heuristic", 0.6),
        );
        let result = svc
            .paraphrase(&ParaphraseRequest::new("  Hello    there  world ", Style::Formal))
            .await
            .unwrap();
        // 空の主結果は正規化済みの原文に置き換わる
        assert_eq!(result.paraphrased_text, "Hello there world");
    }

    #[tokio::test]
    async fn bulk_preserves_order_and_uses_placeholders() {
        let (svc, _h) = service(
            ParaphraserSettings::default(),
            Behavior::Error(StrategyErrorKind::Unavailable),
            Behavior::Result("remote", 0.9),
            Behavior::Result("heuristic version", 0.6),
        );
        let requests = vec![
            ParaphraseRequest::new("First valid sentence.", Style::Simple),
            ParaphraseRequest::new("", Style::Simple),
            ParaphraseRequest::new("Third valid sentence.", Style::Simple),
        ];
        let results = svc.paraphrase_bulk(&requests).await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].paraphrased_text, "heuristic version");
        assert!(results[1].is_placeholder());
        assert!(results[1].alternative_versions.is_empty());
        assert_eq!(results[2].paraphrased_text, "heuristic version");
        assert_eq!(svc.metrics().bulk_placeholders, 1);
    }

    #[tokio::test]
    async fn bulk_panics_become_placeholders() {
        let (svc, _h) = service(
            ParaphraserSettings::default(),
            Behavior::Result("local", 0.9),
            Behavior::Result("remote", 0.9),
            Behavior::Panic,
        );
        let requests = vec![
            ParaphraseRequest::new("Model styled sentence.", Style::Creative),
            ParaphraseRequest::new("Simple styled sentence.", Style::Simple),
        ];
        let results = svc.paraphrase_bulk(&requests).await.unwrap();
        assert_eq!(results[0].paraphrased_text, "local");
        // heuristic のパニックはカスケード内で吸収され、rule-based に落ちる
        assert!(!results[1].is_placeholder());
    }

    #[tokio::test]
    async fn bulk_size_is_validated() {
        let (svc, _h) = service(
            ParaphraserSettings::default(),
            Behavior::Result("local", 0.9),
            Behavior::Result("remote", 0.9),
            Behavior::Result("heuristic", 0.6),
        );
        let err = svc.paraphrase_bulk(&[]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BatchSize);

        let requests = vec![ParaphraseRequest::new("Valid sentence here.", Style::Simple); 11];
        let err = svc.paraphrase_bulk(&requests).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BatchSize);

        let results = svc.paraphrase_bulk(&requests[..10]).await.unwrap();
        assert_eq!(results.len(), 10);
    }

    #[tokio::test]
    async fn health_reports_every_strategy() {
        let (svc, _h) = service(
            ParaphraserSettings::default(),
            Behavior::Error(StrategyErrorKind::Unavailable),
            Behavior::Result("remote", 0.9),
            Behavior::Result("heuristic", 0.6),
        );
        let report = svc.health().await;
        let kinds: Vec<_> = report.strategies.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StrategyKind::LocalModel,
                StrategyKind::RemoteModel,
                StrategyKind::Heuristic,
                StrategyKind::RuleBased
            ]
        );
        assert!(!report.strategies[0].available);
        assert!(report.strategies[3].available);
        assert!(!report.remote_fallback_enabled);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["strategies"][0]["kind"], "local_model");
        assert_eq!(json["remoteFallbackEnabled"], false);
        assert_eq!(json["metrics"]["validationRejections"], 0);
        assert!(json["metrics"]["accepted"].get("ruleBased").is_some());
    }

    #[tokio::test]
    async fn end_to_end_with_real_strategies() {
        let mut settings = ParaphraserSettings::default();
        settings.cascade.seed = Some(11);
        settings.local_model.command = "/nonexistent/paraphrase-model".into();
        let svc = ParaphraseService::from_settings(settings);

        let request = ParaphraseRequest::new(TEXT, Style::Simple);
        let result = svc.paraphrase(&request).await.unwrap();
        assert!(!result.paraphrased_text.is_empty());
        assert!((0.0..=1.0).contains(&result.confidence));
        assert!(result.alternative_versions.len() <= 3);
        assert!(!result.alternative_versions.iter().any(|a| a == TEXT));
        if result.paraphrased_text == TEXT {
            assert!(result.confidence <= 0.3 + f32::EPSILON);
        }

        // モデル優先スタイルでもローカルモデル不在なら結果を返す
        let result = svc
            .paraphrase(&ParaphraseRequest::new(TEXT, Style::Creative))
            .await
            .unwrap();
        assert!(!result.paraphrased_text.is_empty());
        assert_eq!(svc.metrics().fallthroughs.unavailable, 1);
    }
}
