use std::time::Duration;

use hdrhistogram::Histogram;

use crate::error::MetricsError;

/// Latency histogram in microseconds.
#[derive(Debug, Clone)]
pub struct LatencyHistogram {
    hist: Histogram<u64>,
}

impl LatencyHistogram {
    /// Create a new latency histogram.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram cannot be created.
    pub fn new() -> Result<Self, MetricsError> {
        let hist = Histogram::<u64>::new(3).map_err(|err| MetricsError::Histogram {
            context: "create",
            source: Box::new(err),
        })?;
        Ok(Self { hist })
    }

    /// Record one latency.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be recorded.
    pub fn record(&mut self, latency: Duration) -> Result<(), MetricsError> {
        let micros = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX).max(1);
        self.hist
            .record(micros)
            .map_err(|err| MetricsError::Histogram {
                context: "record",
                source: Box::new(err),
            })
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.hist.len()
    }

    /// Value at `percentile` (0-100) in microseconds; 0 when empty.
    #[must_use]
    pub fn percentile_us(&self, percentile: f64) -> u64 {
        if self.count() == 0 {
            return 0;
        }
        self.hist.value_at_percentile(percentile)
    }

    #[must_use]
    pub fn mean_us(&self) -> u64 {
        if self.count() == 0 {
            return 0;
        }
        let mean = self.hist.mean();
        if mean.is_finite() && mean >= 0.0 {
            mean.round() as u64
        } else {
            0
        }
    }

    #[must_use]
    pub fn min_us(&self) -> u64 {
        if self.count() == 0 {
            return 0;
        }
        self.hist.min()
    }

    #[must_use]
    pub fn max_us(&self) -> u64 {
        self.hist.max()
    }
}
