//! Request samples, check results, latency histograms, and threshold checks.
mod collector;
mod histogram;
mod summary;
mod thresholds;
mod types;


pub use collector::{CheckStats, RunMetrics, TagStats, setup_metrics_collector};
pub use histogram::LatencyHistogram;
pub use summary::{RunSummary, ThresholdOutcome, export_summary_json, summary_lines};
pub use thresholds::{Aggregation, Comparison, Threshold, ThresholdMetric, parse_thresholds};
pub use types::{CheckSample, IterationSample, MetricsSink, RequestSample, Sample};
