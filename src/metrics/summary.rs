use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use crate::error::MetricsError;

use super::{RunMetrics, Threshold, ThresholdMetric};

#[derive(Debug, Clone, Serialize)]
pub struct LatencyStats {
    pub avg_us: u64,
    pub min_us: u64,
    pub med_us: u64,
    pub max_us: u64,
    pub p90_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckSummary {
    pub name: String,
    pub passes: u64,
    pub fails: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndpointSummary {
    pub tag: String,
    pub requests: u64,
    pub failed: u64,
    pub avg_us: u64,
    pub max_us: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThresholdOutcome {
    pub metric: &'static str,
    pub expression: String,
    /// Microseconds for durations, parts per million for rates.
    pub observed: u64,
    pub passed: bool,
}

/// End-of-run report, printed and optionally exported as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub scenario: String,
    pub duration_ms: u64,
    pub vus_max: u64,
    pub sessions: usize,
    pub http_reqs: u64,
    pub http_req_failed: u64,
    pub http_req_failed_rate_ppm: u64,
    pub http_req_timeouts: u64,
    pub data_received_bytes: u64,
    pub http_req_duration: LatencyStats,
    pub iterations: u64,
    pub interrupted_iterations: u64,
    pub iteration_avg_us: u64,
    pub checks: Vec<CheckSummary>,
    pub endpoints: Vec<EndpointSummary>,
    pub thresholds: Vec<ThresholdOutcome>,
}

impl RunSummary {
    #[must_use]
    pub fn build(
        scenario: &str,
        elapsed: Duration,
        vus_max: u64,
        sessions: usize,
        metrics: &RunMetrics,
        thresholds: &[Threshold],
    ) -> Self {
        let latency = &metrics.latency;
        let checks = metrics
            .checks
            .iter()
            .map(|(name, stats)| CheckSummary {
                name: name.clone(),
                passes: stats.passes,
                fails: stats.fails,
            })
            .collect();
        let endpoints = metrics
            .tags
            .iter()
            .map(|(tag, stats)| EndpointSummary {
                tag: tag.clone(),
                requests: stats.requests,
                failed: stats.failed,
                avg_us: stats
                    .latency_sum_us
                    .checked_div(u128::from(stats.requests))
                    .map_or(0, |avg| u64::try_from(avg).unwrap_or(u64::MAX)),
                max_us: stats.max_latency_us,
            })
            .collect();
        let thresholds = thresholds
            .iter()
            .map(|threshold| {
                let observed = threshold.observe(metrics);
                ThresholdOutcome {
                    metric: threshold.metric.as_str(),
                    expression: threshold.expression.clone(),
                    observed,
                    passed: threshold.passes(observed),
                }
            })
            .collect();

        Self {
            scenario: scenario.to_owned(),
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            vus_max,
            sessions,
            http_reqs: metrics.requests,
            http_req_failed: metrics.failed_requests,
            http_req_failed_rate_ppm: metrics.failed_rate_ppm(),
            http_req_timeouts: metrics.timed_out_requests,
            data_received_bytes: metrics.data_received,
            http_req_duration: LatencyStats {
                avg_us: latency.mean_us(),
                min_us: latency.min_us(),
                med_us: latency.percentile_us(50.0),
                max_us: latency.max_us(),
                p90_us: latency.percentile_us(90.0),
                p95_us: latency.percentile_us(95.0),
                p99_us: latency.percentile_us(99.0),
            },
            iterations: metrics.iterations,
            interrupted_iterations: metrics.interrupted_iterations,
            iteration_avg_us: metrics.iteration_latency.mean_us(),
            checks,
            endpoints,
            thresholds,
        }
    }

    #[must_use]
    pub fn failed_thresholds(&self) -> usize {
        self.thresholds
            .iter()
            .filter(|outcome| !outcome.passed)
            .count()
    }
}

#[must_use]
pub fn summary_lines(summary: &RunSummary) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!(
        "scenario: {} ({} VUs max, {} sessions, {})",
        summary.scenario,
        summary.vus_max,
        summary.sessions,
        format_ms(summary.duration_ms)
    ));

    if !summary.checks.is_empty() {
        let (passes, fails) = summary
            .checks
            .iter()
            .fold((0u64, 0u64), |(passes, fails), check| {
                (
                    passes.saturating_add(check.passes),
                    fails.saturating_add(check.fails),
                )
            });
        let total = passes.saturating_add(fails);
        lines.push(format!(
            "checks: {} passed, {} failed ({})",
            passes,
            fails,
            format_ppm(super::collector::ratio_ppm(passes, total))
        ));
        for check in &summary.checks {
            let marker = if check.fails == 0 { "ok" } else { "FAIL" };
            lines.push(format!(
                "  [{}] {} ({} / {})",
                marker, check.name, check.passes, check.fails
            ));
        }
    }

    let latency = &summary.http_req_duration;
    lines.push(format!(
        "http_req_duration: avg={} min={} med={} max={} p(90)={} p(95)={} p(99)={}",
        format_us(latency.avg_us),
        format_us(latency.min_us),
        format_us(latency.med_us),
        format_us(latency.max_us),
        format_us(latency.p90_us),
        format_us(latency.p95_us),
        format_us(latency.p99_us)
    ));
    lines.push(format!(
        "http_req_failed: {} ({} of {}, {} timed out)",
        format_ppm(summary.http_req_failed_rate_ppm),
        summary.http_req_failed,
        summary.http_reqs,
        summary.http_req_timeouts
    ));
    lines.push(format!("data_received: {} B", summary.data_received_bytes));
    lines.push(format!(
        "iterations: {} complete, {} interrupted, avg {}",
        summary.iterations,
        summary.interrupted_iterations,
        format_us(summary.iteration_avg_us)
    ));

    if !summary.endpoints.is_empty() {
        lines.push("endpoints:".to_owned());
        for endpoint in &summary.endpoints {
            lines.push(format!(
                "  {} reqs={} failed={} avg={} max={}",
                endpoint.tag,
                endpoint.requests,
                endpoint.failed,
                format_us(endpoint.avg_us),
                format_us(endpoint.max_us)
            ));
        }
    }

    if !summary.thresholds.is_empty() {
        lines.push("thresholds:".to_owned());
        for outcome in &summary.thresholds {
            let observed = if outcome.metric == ThresholdMetric::HttpReqDuration.as_str() {
                format_us(outcome.observed)
            } else {
                format_ppm(outcome.observed)
            };
            let marker = if outcome.passed { "ok" } else { "FAIL" };
            lines.push(format!(
                "  [{}] {} {} (observed {})",
                marker, outcome.metric, outcome.expression, observed
            ));
        }
    }

    lines
}

/// Writes the summary as pretty JSON.
///
/// # Errors
///
/// Returns an error when encoding or writing fails.
pub async fn export_summary_json(path: &Path, summary: &RunSummary) -> Result<(), MetricsError> {
    let encoded = serde_json::to_vec_pretty(summary)
        .map_err(|err| MetricsError::EncodeSummary { source: err })?;
    tokio::fs::write(path, encoded)
        .await
        .map_err(|err| MetricsError::WriteSummary {
            path: path.to_path_buf(),
            source: err,
        })
}

pub(crate) fn format_us(us: u64) -> String {
    let ms = us.checked_div(1000).unwrap_or(0);
    let frac = us.checked_rem(1000).unwrap_or(0).checked_div(10).unwrap_or(0);
    format!("{}.{:02}ms", ms, frac)
}

pub(crate) fn format_ppm(ppm: u64) -> String {
    let whole = ppm.checked_div(10_000).unwrap_or(0);
    let frac = ppm.checked_rem(10_000).unwrap_or(0).checked_div(100).unwrap_or(0);
    format!("{}.{:02}%", whole, frac)
}

fn format_ms(ms: u64) -> String {
    let secs = ms.checked_div(1000).unwrap_or(0);
    let tenths = ms.checked_rem(1000).unwrap_or(0).checked_div(100).unwrap_or(0);
    format!("{}.{}s", secs, tenths)
}
