use parking_lot::Mutex;
use serde::Serialize;

use crate::domain::strategy::StrategyErrorKind;
use crate::domain::types::StrategyKind;

const MAX_LATENCY_RECORDS: usize = 1000;
const RECENT_LATENCIES: usize = 20;

/// ローカルメトリクス収集器
pub struct Metrics {
    counters: Mutex<MetricsCounters>,
    latencies: Mutex<Vec<LatencyRecord>>,
}

#[derive(Debug, Default)]
struct MetricsCounters {
    requests: u64,
    bulk_requests: u64,
    validation_rejections: u64,
    bulk_placeholders: u64,
    accepted_rule_based: u64,
    accepted_heuristic: u64,
    accepted_local_model: u64,
    accepted_remote_model: u64,
    skipped_unavailable: u64,
    skipped_timeout: u64,
    skipped_failed: u64,
    skipped_invalid_output: u64,
    skipped_low_confidence: u64,
    skipped_panic: u64,
}

/// カスケードで次のストラテジーへ進んだ理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallthroughReason {
    Error(StrategyErrorKind),
    LowConfidence,
    Panic,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatencyRecord {
    pub phase: String,
    pub duration_ms: u64,
    pub timestamp: String,
}

/// メトリクスサマリー（CLI の health 出力に含める）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSummary {
    pub requests: u64,
    pub bulk_requests: u64,
    pub validation_rejections: u64,
    pub bulk_placeholders: u64,
    pub accepted: AcceptedCounts,
    pub fallthroughs: FallthroughCounts,
    pub avg_latency_ms: AvgLatency,
    pub recent_latencies: Vec<LatencyRecord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedCounts {
    pub rule_based: u64,
    pub heuristic: u64,
    pub local_model: u64,
    pub remote_model: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FallthroughCounts {
    pub unavailable: u64,
    pub timeout: u64,
    pub failed: u64,
    pub invalid_output: u64,
    pub low_confidence: u64,
    pub panic: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvgLatency {
    pub rule_based: Option<f64>,
    pub heuristic: Option<f64>,
    pub local_model: Option<f64>,
    pub remote_model: Option<f64>,
    pub request: Option<f64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(MetricsCounters::default()),
            latencies: Mutex::new(Vec::new()),
        }
    }

    pub fn inc_requests(&self) {
        self.counters.lock().requests += 1;
    }

    pub fn inc_bulk_requests(&self) {
        self.counters.lock().bulk_requests += 1;
    }

    pub fn inc_validation_rejections(&self) {
        self.counters.lock().validation_rejections += 1;
    }

    pub fn inc_bulk_placeholders(&self) {
        self.counters.lock().bulk_placeholders += 1;
    }

    pub fn inc_accepted(&self, kind: StrategyKind) {
        let mut c = self.counters.lock();
        match kind {
            StrategyKind::RuleBased => c.accepted_rule_based += 1,
            StrategyKind::Heuristic => c.accepted_heuristic += 1,
            StrategyKind::LocalModel => c.accepted_local_model += 1,
            StrategyKind::RemoteModel => c.accepted_remote_model += 1,
        }
    }

    pub fn inc_fallthrough(&self, reason: FallthroughReason) {
        let mut c = self.counters.lock();
        match reason {
            FallthroughReason::Error(StrategyErrorKind::Unavailable) => c.skipped_unavailable += 1,
            FallthroughReason::Error(StrategyErrorKind::Timeout) => c.skipped_timeout += 1,
            FallthroughReason::Error(StrategyErrorKind::Failed) => c.skipped_failed += 1,
            FallthroughReason::Error(StrategyErrorKind::InvalidOutput) => {
                c.skipped_invalid_output += 1
            }
            FallthroughReason::LowConfidence => c.skipped_low_confidence += 1,
            FallthroughReason::Panic => c.skipped_panic += 1,
        }
    }

    pub fn record_latency(&self, phase: &str, duration_ms: u64) {
        let record = LatencyRecord {
            phase: phase.to_string(),
            duration_ms,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let mut latencies = self.latencies.lock();
        latencies.push(record);
        // 最新1000件のみ保持
        if latencies.len() > MAX_LATENCY_RECORDS {
            let excess = latencies.len() - MAX_LATENCY_RECORDS;
            latencies.drain(0..excess);
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        let c = self.counters.lock();
        let latencies = self.latencies.lock();

        let avg = |phase: &str| -> Option<f64> {
            let vals: Vec<f64> = latencies
                .iter()
                .filter(|r| r.phase == phase)
                .map(|r| r.duration_ms as f64)
                .collect();
            if vals.is_empty() {
                None
            } else {
                Some(vals.iter().sum::<f64>() / vals.len() as f64)
            }
        };

        let recent: Vec<LatencyRecord> = latencies
            .iter()
            .rev()
            .take(RECENT_LATENCIES)
            .cloned()
            .collect();

        MetricsSummary {
            requests: c.requests,
            bulk_requests: c.bulk_requests,
            validation_rejections: c.validation_rejections,
            bulk_placeholders: c.bulk_placeholders,
            accepted: AcceptedCounts {
                rule_based: c.accepted_rule_based,
                heuristic: c.accepted_heuristic,
                local_model: c.accepted_local_model,
                remote_model: c.accepted_remote_model,
            },
            fallthroughs: FallthroughCounts {
                unavailable: c.skipped_unavailable,
                timeout: c.skipped_timeout,
                failed: c.skipped_failed,
                invalid_output: c.skipped_invalid_output,
                low_confidence: c.skipped_low_confidence,
                panic: c.skipped_panic,
            },
            avg_latency_ms: AvgLatency {
                rule_based: avg(StrategyKind::RuleBased.as_str()),
                heuristic: avg(StrategyKind::Heuristic.as_str()),
                local_model: avg(StrategyKind::LocalModel.as_str()),
                remote_model: avg(StrategyKind::RemoteModel.as_str()),
                request: avg("request"),
            },
            recent_latencies: recent,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
