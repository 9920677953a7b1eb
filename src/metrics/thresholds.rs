use std::collections::BTreeMap;

use crate::error::ValidationError;

use super::RunMetrics;

const US_PER_MS_DIGITS: u32 = 3;
const PPM_DIGITS: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdMetric {
    /// Request latency.
    HttpReqDuration,
    /// Share of requests outside 2xx/3xx or without a response.
    HttpReqFailed,
    /// Share of passed checks.
    Checks,
}

impl ThresholdMetric {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ThresholdMetric::HttpReqDuration => "http_req_duration",
            ThresholdMetric::HttpReqFailed => "http_req_failed",
            ThresholdMetric::Checks => "checks",
        }
    }

    fn parse(value: &str) -> Result<Self, ValidationError> {
        match value.trim() {
            "http_req_duration" => Ok(ThresholdMetric::HttpReqDuration),
            "http_req_failed" => Ok(ThresholdMetric::HttpReqFailed),
            "checks" => Ok(ThresholdMetric::Checks),
            other => Err(ValidationError::UnknownThresholdMetric {
                metric: other.to_owned(),
            }),
        }
    }

    const fn is_rate(self) -> bool {
        matches!(self, ThresholdMetric::HttpReqFailed | ThresholdMetric::Checks)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Aggregation {
    /// `p(N)`, N in 0..=100.
    Percentile(f64),
    Avg,
    Med,
    Min,
    Max,
    Rate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    const fn holds(self, observed: u64, limit: u64) -> bool {
        match self {
            Comparison::Lt => observed < limit,
            Comparison::Le => observed <= limit,
            Comparison::Gt => observed > limit,
            Comparison::Ge => observed >= limit,
        }
    }
}

/// One pass/fail criterion such as `http_req_duration: p(95)<500`.
///
/// `limit` is in microseconds for durations and parts per million for rates.
#[derive(Debug, Clone, PartialEq)]
pub struct Threshold {
    pub metric: ThresholdMetric,
    pub aggregation: Aggregation,
    pub comparison: Comparison,
    pub limit: u64,
    pub expression: String,
}

impl Threshold {
    /// Parses one expression for a metric.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown metrics, aggregations, or malformed limits.
    pub fn parse(metric: &str, expression: &str) -> Result<Self, ValidationError> {
        let metric_kind = ThresholdMetric::parse(metric)?;
        let invalid = || ValidationError::InvalidThreshold {
            metric: metric.trim().to_owned(),
            value: expression.to_owned(),
        };

        let compact: String = expression.chars().filter(|ch| !ch.is_whitespace()).collect();
        let op_idx = compact.find(['<', '>']).ok_or_else(invalid)?;
        let (agg_part, rest) = compact.split_at(op_idx);
        let (comparison, value_part) = if let Some(value) = rest.strip_prefix("<=") {
            (Comparison::Le, value)
        } else if let Some(value) = rest.strip_prefix(">=") {
            (Comparison::Ge, value)
        } else if let Some(value) = rest.strip_prefix('<') {
            (Comparison::Lt, value)
        } else if let Some(value) = rest.strip_prefix('>') {
            (Comparison::Gt, value)
        } else {
            return Err(invalid());
        };

        let aggregation = parse_aggregation(agg_part).ok_or_else(invalid)?;
        let aggregation_is_rate = matches!(aggregation, Aggregation::Rate);
        if aggregation_is_rate != metric_kind.is_rate() {
            return Err(invalid());
        }

        let digits = if metric_kind.is_rate() {
            PPM_DIGITS
        } else {
            US_PER_MS_DIGITS
        };
        let limit = parse_decimal_scaled(value_part, digits).ok_or_else(invalid)?;

        Ok(Self {
            metric: metric_kind,
            aggregation,
            comparison,
            limit,
            expression: compact,
        })
    }

    /// Observed value in the threshold's unit.
    #[must_use]
    pub fn observe(&self, metrics: &RunMetrics) -> u64 {
        match (self.metric, self.aggregation) {
            (ThresholdMetric::HttpReqDuration, Aggregation::Percentile(p)) => {
                metrics.latency.percentile_us(p)
            }
            (ThresholdMetric::HttpReqDuration, Aggregation::Med) => {
                metrics.latency.percentile_us(50.0)
            }
            (ThresholdMetric::HttpReqDuration, Aggregation::Avg) => metrics.latency.mean_us(),
            (ThresholdMetric::HttpReqDuration, Aggregation::Min) => metrics.latency.min_us(),
            (ThresholdMetric::HttpReqDuration, Aggregation::Max) => metrics.latency.max_us(),
            (ThresholdMetric::HttpReqFailed, _) => metrics.failed_rate_ppm(),
            (ThresholdMetric::Checks, _) => {
                let totals = metrics.check_totals();
                super::collector::ratio_ppm(
                    totals.passes,
                    totals.passes.saturating_add(totals.fails),
                )
            }
            (ThresholdMetric::HttpReqDuration, Aggregation::Rate) => 0,
        }
    }

    #[must_use]
    pub fn passes(&self, observed: u64) -> bool {
        self.comparison.holds(observed, self.limit)
    }
}

/// Parses a `metric -> [expression]` map, keeping metric order stable.
///
/// # Errors
///
/// Returns the first invalid metric or expression.
pub fn parse_thresholds(
    map: &BTreeMap<String, Vec<String>>,
) -> Result<Vec<Threshold>, ValidationError> {
    let mut thresholds = Vec::new();
    for (metric, expressions) in map {
        for expression in expressions {
            thresholds.push(Threshold::parse(metric, expression)?);
        }
    }
    Ok(thresholds)
}

fn parse_aggregation(value: &str) -> Option<Aggregation> {
    match value {
        "avg" => Some(Aggregation::Avg),
        "med" => Some(Aggregation::Med),
        "min" => Some(Aggregation::Min),
        "max" => Some(Aggregation::Max),
        "rate" => Some(Aggregation::Rate),
        other => {
            let inner = other.strip_prefix("p(")?.strip_suffix(')')?;
            let percentile: f64 = inner.parse().ok()?;
            if (0.0..=100.0).contains(&percentile) {
                Some(Aggregation::Percentile(percentile))
            } else {
                None
            }
        }
    }
}

/// Parses a non-negative decimal into an integer scaled by `10^digits`,
/// truncating extra fraction digits: `("0.01", 6)` is `10_000`.
pub(crate) fn parse_decimal_scaled(value: &str, digits: u32) -> Option<u64> {
    let (int_part, frac_part) = value.split_once('.').unwrap_or((value, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.chars().all(|ch| ch.is_ascii_digit())
        || !frac_part.chars().all(|ch| ch.is_ascii_digit())
    {
        return None;
    }
    let scale = 10u64.checked_pow(digits)?;
    let whole: u64 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().ok()?
    };
    let mut fraction: u64 = 0;
    let mut place = scale;
    for ch in frac_part.chars() {
        place = place.checked_div(10)?;
        if place == 0 {
            break;
        }
        let digit = u64::from(ch.to_digit(10)?);
        fraction = fraction.checked_add(digit.checked_mul(place)?)?;
    }
    whole.checked_mul(scale)?.checked_add(fraction)
}
