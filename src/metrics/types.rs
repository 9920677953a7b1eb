use std::time::Duration;

use tokio::sync::mpsc;

/// Statuses outside this range count toward `http_req_failed`.
const EXPECTED_STATUS: std::ops::Range<u16> = 200..400;

#[derive(Debug, Clone)]
pub struct RequestSample {
    pub tag: String,
    pub status: u16,
    pub latency: Duration,
    pub timed_out: bool,
    pub transport_error: bool,
    pub response_bytes: u64,
}

impl RequestSample {
    #[must_use]
    pub fn failed(&self) -> bool {
        self.timed_out || self.transport_error || !EXPECTED_STATUS.contains(&self.status)
    }
}

#[derive(Debug, Clone)]
pub struct CheckSample {
    pub name: String,
    pub passed: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct IterationSample {
    pub vu: u64,
    pub duration: Duration,
    pub interrupted: bool,
}

#[derive(Debug, Clone)]
pub enum Sample {
    Request(RequestSample),
    Check(CheckSample),
    Iteration(IterationSample),
}

/// Cheap, cloneable handle every VU and the setup phase report through.
#[derive(Debug, Clone)]
pub struct MetricsSink {
    tx: mpsc::UnboundedSender<Sample>,
}

impl MetricsSink {
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Sample>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn request(&self, sample: RequestSample) {
        if self.tx.send(Sample::Request(sample)).is_err() {
            // Collector already finished; late samples are dropped.
        }
    }

    /// Records a named check and hands back its outcome.
    pub fn check(&self, name: impl Into<String>, passed: bool) -> bool {
        let sample = CheckSample {
            name: name.into(),
            passed,
        };
        if self.tx.send(Sample::Check(sample)).is_err() {
            // Collector already finished; late samples are dropped.
        }
        passed
    }

    pub fn iteration(&self, sample: IterationSample) {
        if self.tx.send(Sample::Iteration(sample)).is_err() {
            // Collector already finished; late samples are dropped.
        }
    }
}
