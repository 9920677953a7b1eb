use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::args::{AccountSourceKind, ScenarioKind};
use crate::error::ValidationError;

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub scenario: Option<ScenarioKind>,
    pub request_timeout: Option<DurationValue>,
    pub setup_timeout: Option<DurationValue>,
    pub graceful_stop: Option<DurationValue>,
    pub graceful_ramp_down: Option<DurationValue>,
    pub summary_export: Option<String>,
    pub stages: Option<Vec<StageConfig>>,
    pub thresholds: Option<BTreeMap<String, Vec<String>>>,
    pub accounts: Option<AccountsConfig>,
    pub traffic: Option<TrafficConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StageConfig {
    pub duration: String,
    pub target: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct AccountsConfig {
    pub source: Option<AccountSourceKind>,
    pub count: Option<usize>,
    pub domain: Option<String>,
    pub prefix: Option<String>,
    pub password: Option<String>,
    pub max_sessions: Option<usize>,
    pub admin: Option<AdminConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminConfig {
    pub account_id: Option<u64>,
    pub password: Option<String>,
    pub page_size: Option<u32>,
    pub roster: Option<Vec<RosterConfig>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RosterConfig {
    pub role: String,
    pub pages: u32,
    pub last_page_size: u32,
    /// Borrow passwords from accounts of this role, index by index.
    pub password_from: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrafficConfig {
    pub student_end: Option<usize>,
    pub teacher_end: Option<usize>,
    pub calendar_year: Option<i32>,
    pub calendar_month: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 {
                    Err(ValidationError::DurationZero)
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => super::parse_duration_value(text),
        }
    }
}
