use std::collections::BTreeMap;
use std::time::Duration;

use crate::args::{
    DEFAULT_GRACEFUL_RAMP_DOWN, DEFAULT_GRACEFUL_STOP, DEFAULT_SETUP_TIMEOUT, ScenarioKind, Stage,
};
use crate::traffic::Pacing;

const SESSION_CAP: usize = 50;
const STRESS_SETUP_TIMEOUT: Duration = Duration::from_secs(300);
const SMOKE_GRACEFUL_STOP: Duration = Duration::from_secs(10);
const ONE_SECOND: Duration = Duration::from_secs(1);
const LOAD_THINK_TIME: Duration = Duration::from_secs(3);

/// Built-in defaults for one scenario. Config files and flags override them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioPreset {
    pub kind: ScenarioKind,
    pub stages: Vec<Stage>,
    pub graceful_stop: Duration,
    pub graceful_ramp_down: Duration,
    /// `metric -> [expression]`, e.g. `http_req_duration -> ["p(95)<500"]`.
    pub thresholds: BTreeMap<String, Vec<String>>,
    pub max_sessions: Option<usize>,
    pub setup_timeout: Duration,
    pub pacing: Pacing,
    /// Demo traffic is anonymous and skips account setup.
    pub needs_sessions: bool,
}

impl ScenarioPreset {
    #[must_use]
    pub fn for_kind(kind: ScenarioKind) -> Self {
        match kind {
            ScenarioKind::Smoke => smoke(),
            ScenarioKind::Load => load(),
            ScenarioKind::Stress => stress(),
            ScenarioKind::Demo => demo(),
        }
    }

    /// Sum of all stage durations.
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.stages
            .iter()
            .fold(Duration::ZERO, |acc, stage| acc.saturating_add(stage.duration))
    }
}

fn stages(spec: &[(u64, u64)]) -> Vec<Stage> {
    spec.iter()
        .map(|&(secs, target)| Stage::new(Duration::from_secs(secs), target))
        .collect()
}

fn thresholds(spec: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
    spec.iter()
        .map(|(metric, expressions)| {
            (
                (*metric).to_owned(),
                expressions.iter().map(|expr| (*expr).to_owned()).collect(),
            )
        })
        .collect()
}

fn smoke() -> ScenarioPreset {
    ScenarioPreset {
        kind: ScenarioKind::Smoke,
        stages: stages(&[(30, 5), (120, 15), (30, 50), (30, 5), (30, 0)]),
        graceful_stop: SMOKE_GRACEFUL_STOP,
        graceful_ramp_down: DEFAULT_GRACEFUL_RAMP_DOWN,
        thresholds: thresholds(&[
            ("http_req_failed", &["rate<0.01"]),
            ("http_req_duration", &["p(95)<800"]),
        ]),
        max_sessions: Some(SESSION_CAP),
        setup_timeout: DEFAULT_SETUP_TIMEOUT,
        pacing: Pacing::Fixed(ONE_SECOND),
        needs_sessions: true,
    }
}

fn load() -> ScenarioPreset {
    ScenarioPreset {
        kind: ScenarioKind::Load,
        stages: stages(&[(300, 110), (300, 110), (300, 220), (300, 220), (300, 0)]),
        graceful_stop: DEFAULT_GRACEFUL_STOP,
        graceful_ramp_down: DEFAULT_GRACEFUL_RAMP_DOWN,
        thresholds: thresholds(&[("http_req_duration", &["p(95)<500"])]),
        max_sessions: None,
        setup_timeout: DEFAULT_SETUP_TIMEOUT,
        pacing: Pacing::Uniform {
            max: LOAD_THINK_TIME,
        },
        needs_sessions: true,
    }
}

fn stress() -> ScenarioPreset {
    ScenarioPreset {
        kind: ScenarioKind::Stress,
        stages: stages(&[
            (120, 200),
            (60, 200),
            (120, 400),
            (60, 400),
            (120, 600),
            (60, 600),
            (120, 800),
            (60, 800),
            (120, 1000),
            (300, 1000),
            (120, 0),
        ]),
        graceful_stop: DEFAULT_GRACEFUL_STOP,
        graceful_ramp_down: DEFAULT_GRACEFUL_RAMP_DOWN,
        thresholds: thresholds(&[
            ("http_req_failed", &["rate<0.01"]),
            ("http_req_duration", &["p(95)<1000", "p(99)<2000"]),
        ]),
        max_sessions: Some(SESSION_CAP),
        setup_timeout: STRESS_SETUP_TIMEOUT,
        pacing: Pacing::Fixed(ONE_SECOND),
        needs_sessions: true,
    }
}

fn demo() -> ScenarioPreset {
    ScenarioPreset {
        kind: ScenarioKind::Demo,
        stages: stages(&[(120, 5000)]),
        graceful_stop: DEFAULT_GRACEFUL_STOP,
        graceful_ramp_down: DEFAULT_GRACEFUL_RAMP_DOWN,
        thresholds: BTreeMap::new(),
        max_sessions: None,
        setup_timeout: DEFAULT_SETUP_TIMEOUT,
        pacing: Pacing::Fixed(ONE_SECOND),
        needs_sessions: false,
    }
}
