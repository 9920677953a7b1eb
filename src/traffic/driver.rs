use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{error, warn};

use crate::args::ScenarioKind;
use crate::host::VuIteration;
use crate::http::{ResponseOutcome, execute_request, join_url};
use crate::metrics::{MetricsSink, RequestSample};
use crate::session::{Session, SessionPool};

use super::check::{
    NO_RETURN_CODE, ResponseCheck, extract_return_code, is_known_return_code, metric_tag,
};
use super::pacing::Pacing;
use super::plan::{CalendarQuery, PlanContext, RequestStep, build_plan};
use super::resources::ResourceScope;
use super::role::{Role, RoleBands};

/// Per-run knobs of the traffic mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrafficSettings {
    pub bands: RoleBands,
    pub calendar: CalendarQuery,
}

/// Everything one iteration of one VU needs, resolved up front.
#[derive(Debug, Clone)]
pub struct Assignment<'pool> {
    pub slot: usize,
    pub role: Role,
    pub scope: ResourceScope,
    pub session: Option<&'pool Session>,
    pub steps: Vec<RequestStep>,
}

/// Runs one iteration when the host asks. Holds no mutable state.
#[derive(Debug, Clone)]
pub struct TrafficDriver {
    client: Client,
    base_url: Url,
    pool: Option<Arc<SessionPool>>,
    scenario: ScenarioKind,
    pacing: Pacing,
    settings: TrafficSettings,
    metrics: MetricsSink,
}

impl TrafficDriver {
    #[must_use]
    pub const fn new(
        client: Client,
        base_url: Url,
        pool: Option<Arc<SessionPool>>,
        scenario: ScenarioKind,
        pacing: Pacing,
        settings: TrafficSettings,
        metrics: MetricsSink,
    ) -> Self {
        Self {
            client,
            base_url,
            pool,
            scenario,
            pacing,
            settings,
            metrics,
        }
    }

    /// Maps a 1-based VU number to its session, role, resource ids and plan.
    /// Without a pool the VU runs unauthenticated as slot `vu - 1`.
    #[must_use]
    pub fn assign(&self, vu: u64, today: &str) -> Assignment<'_> {
        let (slot, session) = match self.pool.as_deref().and_then(|pool| pool.assign(vu)) {
            Some((slot, session)) => (slot, Some(session)),
            None => (
                usize::try_from(vu.saturating_sub(1)).unwrap_or(usize::MAX),
                None,
            ),
        };
        let role = self.settings.bands.role(slot);
        let user_key = session.map_or("", |active| active.user_key.as_str());
        let scope = ResourceScope::for_session(user_key, slot);
        let steps = build_plan(&PlanContext {
            scenario: self.scenario,
            role,
            slot,
            scope,
            calendar: self.settings.calendar,
            today,
        });
        Assignment {
            slot,
            role,
            scope,
            session,
            steps,
        }
    }

    /// Runs the VU's plan once, sequentially, pacing between requests.
    pub async fn run_iteration(&self, vu: u64) {
        let today = chrono::Local::now().format("%Y-%m-%d").to_string();
        let assignment = self.assign(vu, &today);

        for step in &assignment.steps {
            let url = match join_url(&self.base_url, &step.path) {
                Ok(url) => url,
                Err(err) => {
                    error!("Skipping {}: {}", step.name, err);
                    continue;
                }
            };
            let mut request = self.client.request(step.method.clone(), url.clone());
            if let Some(session) = assignment.session {
                request = session.credential.apply(request);
            }

            let keep_body = step.check != ResponseCheck::None;
            let outcome = execute_request(request, keep_body).await;
            self.metrics.request(RequestSample {
                tag: metric_tag(url.as_str()).to_owned(),
                status: outcome.status,
                latency: outcome.latency,
                timed_out: outcome.timed_out,
                transport_error: outcome.transport_error,
                response_bytes: outcome.response_bytes,
            });

            if self.validate(step, &url, &outcome) {
                let delay = self.pacing.next_delay();
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Records the step's check. Returns false when the driver should move on
    /// without pacing.
    fn validate(&self, step: &RequestStep, url: &Url, outcome: &ResponseOutcome) -> bool {
        match step.check {
            ResponseCheck::None => true,
            ResponseCheck::Status(expected) => {
                let label = format!("{} status {}", step.name, expected);
                if !self.metrics.check(label.as_str(), outcome.status == expected) {
                    warn!(
                        "Unexpected status for {}: {}. Response body: {}",
                        label,
                        outcome.status,
                        body_text(outcome)
                    );
                }
                true
            }
            ResponseCheck::KnownReturnCode => {
                if let Some(cause) = missing_response(outcome) {
                    error!("No response from {}: {}", url, cause);
                    return false;
                }
                let body = outcome.body.as_deref().unwrap_or_default();
                let code = match extract_return_code(body) {
                    Ok(code) => code.unwrap_or_else(|| NO_RETURN_CODE.to_owned()),
                    Err(err) => {
                        error!("Invalid JSON from {}: {}", url, err);
                        return false;
                    }
                };
                let label = format!("{} {}", step.method, url);
                let known = is_known_return_code(&code);
                if !self
                    .metrics
                    .check(format!("{} - returnCode is known", label), known)
                {
                    warn!("Unexpected returnCode for {}: {}", label, code);
                    warn!("Response body: {}", body_text(outcome));
                }
                true
            }
        }
    }
}

#[async_trait]
impl VuIteration for TrafficDriver {
    async fn iterate(&self, vu: u64) {
        self.run_iteration(vu).await;
    }
}

/// Why a request produced no response to inspect, if it did not.
pub(crate) const fn missing_response(outcome: &ResponseOutcome) -> Option<&'static str> {
    if outcome.timed_out {
        Some("request timed out")
    } else if outcome.transport_error {
        Some("transport error")
    } else {
        None
    }
}

fn body_text(outcome: &ResponseOutcome) -> String {
    outcome
        .body
        .as_deref()
        .map(String::from_utf8_lossy)
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default()
}
