use std::collections::BTreeMap;

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::warn;

use crate::error::MetricsError;

use super::{LatencyHistogram, RequestSample, Sample};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckStats {
    pub passes: u64,
    pub fails: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagStats {
    pub requests: u64,
    pub failed: u64,
    pub latency_sum_us: u128,
    pub max_latency_us: u64,
}

/// Everything the run recorded, folded as samples arrive.
#[derive(Debug, Clone)]
pub struct RunMetrics {
    pub requests: u64,
    pub failed_requests: u64,
    pub timed_out_requests: u64,
    pub data_received: u64,
    pub latency: LatencyHistogram,
    pub tags: BTreeMap<String, TagStats>,
    pub checks: BTreeMap<String, CheckStats>,
    pub iterations: u64,
    pub interrupted_iterations: u64,
    pub iteration_latency: LatencyHistogram,
}

impl RunMetrics {
    /// Creates empty run metrics.
    ///
    /// # Errors
    ///
    /// Returns an error if a histogram cannot be created.
    pub fn new() -> Result<Self, MetricsError> {
        Ok(Self {
            requests: 0,
            failed_requests: 0,
            timed_out_requests: 0,
            data_received: 0,
            latency: LatencyHistogram::new()?,
            tags: BTreeMap::new(),
            checks: BTreeMap::new(),
            iterations: 0,
            interrupted_iterations: 0,
            iteration_latency: LatencyHistogram::new()?,
        })
    }

    pub fn record(&mut self, sample: Sample) {
        match sample {
            Sample::Request(request) => self.record_request(&request),
            Sample::Check(check) => {
                let stats = self.checks.entry(check.name).or_default();
                if check.passed {
                    stats.passes = stats.passes.saturating_add(1);
                } else {
                    stats.fails = stats.fails.saturating_add(1);
                }
            }
            Sample::Iteration(iteration) => {
                if iteration.interrupted {
                    self.interrupted_iterations = self.interrupted_iterations.saturating_add(1);
                } else {
                    self.iterations = self.iterations.saturating_add(1);
                    if let Err(err) = self.iteration_latency.record(iteration.duration) {
                        warn!("Failed to record iteration duration: {}", err);
                    }
                }
            }
        }
    }

    fn record_request(&mut self, request: &RequestSample) {
        let failed = request.failed();
        self.requests = self.requests.saturating_add(1);
        if failed {
            self.failed_requests = self.failed_requests.saturating_add(1);
        }
        if request.timed_out {
            self.timed_out_requests = self.timed_out_requests.saturating_add(1);
        }
        self.data_received = self.data_received.saturating_add(request.response_bytes);
        if let Err(err) = self.latency.record(request.latency) {
            warn!("Failed to record request latency: {}", err);
        }

        let latency_us = u64::try_from(request.latency.as_micros()).unwrap_or(u64::MAX);
        let tag = self.tags.entry(request.tag.clone()).or_default();
        tag.requests = tag.requests.saturating_add(1);
        if failed {
            tag.failed = tag.failed.saturating_add(1);
        }
        tag.latency_sum_us = tag.latency_sum_us.saturating_add(u128::from(latency_us));
        tag.max_latency_us = tag.max_latency_us.max(latency_us);
    }

    /// Share of failed requests in parts per million; 0 without requests.
    #[must_use]
    pub fn failed_rate_ppm(&self) -> u64 {
        ratio_ppm(self.failed_requests, self.requests)
    }

    #[must_use]
    pub fn check_totals(&self) -> CheckStats {
        self.checks
            .values()
            .fold(CheckStats::default(), |acc, stats| CheckStats {
                passes: acc.passes.saturating_add(stats.passes),
                fails: acc.fails.saturating_add(stats.fails),
            })
    }
}

pub(crate) fn ratio_ppm(part: u64, total: u64) -> u64 {
    let scaled = u128::from(part).saturating_mul(1_000_000);
    scaled
        .checked_div(u128::from(total))
        .map_or(0, |ppm| u64::try_from(ppm).unwrap_or(u64::MAX))
}

/// Drains samples until every sender is dropped, then hands back the totals.
#[must_use]
pub fn setup_metrics_collector(
    mut samples_rx: mpsc::UnboundedReceiver<Sample>,
    mut metrics: RunMetrics,
) -> JoinHandle<RunMetrics> {
    tokio::spawn(async move {
        while let Some(sample) = samples_rx.recv().await {
            metrics.record(sample);
        }
        metrics
    })
}
