use std::time::Duration;

use crate::args::Stage;
use crate::error::ValidationError;

/// Ramping-VU schedule: the VU target moves linearly from the previous
/// stage's target to each stage's own target over the stage duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VuSchedule {
    start_vus: u64,
    stages: Vec<Stage>,
}

impl VuSchedule {
    /// Builds a schedule starting from zero VUs.
    ///
    /// # Errors
    ///
    /// Returns an error when no stage is given.
    pub fn new(stages: Vec<Stage>) -> Result<Self, ValidationError> {
        if stages.is_empty() {
            return Err(ValidationError::StagesEmpty);
        }
        Ok(Self {
            start_vus: 0,
            stages,
        })
    }

    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.stages
            .iter()
            .fold(Duration::ZERO, |acc, stage| acc.saturating_add(stage.duration))
    }

    /// Highest VU count the schedule ever asks for.
    #[must_use]
    pub fn max_vus(&self) -> u64 {
        self.stages
            .iter()
            .map(|stage| stage.target)
            .fold(self.start_vus, u64::max)
    }

    /// Target VU count `elapsed` into the run. Past the end, the last target.
    #[must_use]
    pub fn target_at(&self, elapsed: Duration) -> u64 {
        let mut stage_start = Duration::ZERO;
        let mut from = self.start_vus;
        for stage in &self.stages {
            let stage_end = stage_start.saturating_add(stage.duration);
            if elapsed < stage_end {
                let into = elapsed.saturating_sub(stage_start);
                return interpolate(from, stage.target, into, stage.duration);
            }
            stage_start = stage_end;
            from = stage.target;
        }
        from
    }
}

fn interpolate(from: u64, to: u64, into: Duration, span: Duration) -> u64 {
    let span_ms = i128::try_from(span.as_millis()).unwrap_or(i128::MAX);
    if span_ms == 0 {
        return to;
    }
    let into_ms = i128::try_from(into.as_millis())
        .unwrap_or(i128::MAX)
        .min(span_ms);
    let start = i128::from(from);
    let delta = i128::from(to).saturating_sub(start);
    let step = delta
        .saturating_mul(into_ms)
        .checked_div(span_ms)
        .unwrap_or(0);
    let value = start.saturating_add(step);
    if value < 0 {
        0
    } else {
        u64::try_from(value).unwrap_or(u64::MAX)
    }
}
