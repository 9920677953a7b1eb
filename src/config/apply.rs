use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::accounts::{
    AccountSettings, AdminRoster, DEFAULT_PAGE_SIZE, RosterRequest, SyntheticAccounts,
    default_roster, validate_roster,
};
use crate::args::{AccountSourceKind, DEFAULT_REQUEST_TIMEOUT, LoadArgs, ScenarioKind, Stage};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};
use crate::metrics::{Threshold, parse_thresholds};
use crate::scenario::ScenarioPreset;
use crate::traffic::{CalendarQuery, Pacing, RoleBands, TrafficSettings};

use super::parse::parse_duration_value;
use super::types::{
    AccountsConfig, AdminConfig, ConfigFile, DurationValue, StageConfig, TrafficConfig,
};

/// Everything a run needs, after CLI, config file and preset were merged.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub scenario: ScenarioKind,
    pub base_url: Url,
    pub stages: Vec<Stage>,
    pub thresholds: Vec<Threshold>,
    pub request_timeout: Duration,
    pub setup_timeout: Duration,
    pub graceful_stop: Duration,
    pub graceful_ramp_down: Duration,
    pub accounts: AccountSettings,
    pub traffic: TrafficSettings,
    pub pacing: Pacing,
    pub needs_sessions: bool,
    pub summary_export: Option<PathBuf>,
}

/// Merges CLI flags over config file values over the scenario preset.
///
/// # Errors
///
/// Returns an error when a required value is missing or a field is invalid.
pub fn resolve_run_config(args: &LoadArgs, file: Option<ConfigFile>) -> AppResult<RunConfig> {
    let file = file.unwrap_or_default();
    let scenario = args
        .scenario
        .or(file.scenario)
        .unwrap_or(ScenarioKind::Smoke);
    let preset = ScenarioPreset::for_kind(scenario);

    let raw_base_url = args
        .base_url
        .clone()
        .or(file.base_url)
        .ok_or(ConfigError::BaseUrlRequired)
        .map_err(AppError::config)?;
    let base_url = normalize_base_url(&raw_base_url).map_err(AppError::validation)?;

    let stages = match (args.stages.clone(), file.stages) {
        (Some(stages), _) => stages.into_inner(),
        (None, Some(stages)) => file_stages(&stages)?,
        (None, None) => preset.stages.clone(),
    };
    if stages.is_empty() {
        return Err(AppError::validation(ValidationError::StagesEmpty));
    }

    let threshold_map = file.thresholds.unwrap_or_else(|| preset.thresholds.clone());
    let thresholds = parse_thresholds(&threshold_map).map_err(|err| field_error("thresholds", err))?;

    let request_timeout = pick_duration(
        args.request_timeout,
        file.request_timeout.as_ref(),
        "request_timeout",
        DEFAULT_REQUEST_TIMEOUT,
    )?;
    let setup_timeout = pick_duration(
        args.setup_timeout,
        file.setup_timeout.as_ref(),
        "setup_timeout",
        preset.setup_timeout,
    )?;
    let graceful_stop = pick_duration(
        None,
        file.graceful_stop.as_ref(),
        "graceful_stop",
        preset.graceful_stop,
    )?;
    let graceful_ramp_down = pick_duration(
        None,
        file.graceful_ramp_down.as_ref(),
        "graceful_ramp_down",
        preset.graceful_ramp_down,
    )?;

    let accounts = resolve_accounts(args, file.accounts.unwrap_or_default(), &preset)?;
    let traffic = resolve_traffic(&file.traffic.unwrap_or_default())?;
    let summary_export = args
        .summary_export
        .clone()
        .or(file.summary_export)
        .map(PathBuf::from);

    Ok(RunConfig {
        scenario,
        base_url,
        stages,
        thresholds,
        request_timeout,
        setup_timeout,
        graceful_stop,
        graceful_ramp_down,
        accounts,
        traffic,
        pacing: preset.pacing,
        needs_sessions: preset.needs_sessions,
        summary_export,
    })
}

/// Parses the base URL and makes sure relative joins keep its path.
///
/// # Errors
///
/// Returns an error for unparseable URLs or URLs that cannot be a base.
pub fn normalize_base_url(raw: &str) -> Result<Url, ValidationError> {
    let mut url = Url::parse(raw.trim()).map_err(|err| ValidationError::InvalidBaseUrl {
        url: raw.to_owned(),
        source: err,
    })?;
    if url.cannot_be_a_base() {
        return Err(ValidationError::BaseUrlNotABase {
            url: raw.to_owned(),
        });
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn field_error(field: &str, source: ValidationError) -> AppError {
    AppError::config(ConfigError::InvalidField {
        field: field.to_owned(),
        source,
    })
}

fn pick_duration(
    cli: Option<Duration>,
    file: Option<&DurationValue>,
    field: &str,
    fallback: Duration,
) -> AppResult<Duration> {
    if let Some(duration) = cli {
        return Ok(duration);
    }
    file.map_or(Ok(fallback), |value| {
        value.to_duration().map_err(|err| field_error(field, err))
    })
}

fn file_stages(stages: &[StageConfig]) -> AppResult<Vec<Stage>> {
    stages
        .iter()
        .enumerate()
        .map(|(idx, stage)| {
            let duration = parse_duration_value(&stage.duration)
                .map_err(|err| field_error(&format!("stages[{}].duration", idx), err))?;
            Ok(Stage::new(duration, stage.target))
        })
        .collect()
}

fn resolve_accounts(
    args: &LoadArgs,
    config: AccountsConfig,
    preset: &ScenarioPreset,
) -> AppResult<AccountSettings> {
    let source = args
        .account_source
        .or(config.source)
        .unwrap_or(AccountSourceKind::Synthetic);

    let defaults = SyntheticAccounts::default();
    let synthetic = SyntheticAccounts {
        count: config.count.unwrap_or(defaults.count),
        domain: config.domain.unwrap_or(defaults.domain),
        prefix: config.prefix.unwrap_or(defaults.prefix),
        password: config.password.unwrap_or(defaults.password),
    };

    let admin = config.admin.map(admin_roster).transpose()?.flatten();
    if source == AccountSourceKind::Admin && admin.is_none() {
        return Err(AppError::config(ConfigError::AdminCredentialsRequired));
    }

    let max_sessions = args
        .max_sessions
        .map(usize::from)
        .or(config.max_sessions)
        .or(preset.max_sessions);
    if max_sessions == Some(0) {
        return Err(field_error(
            "accounts.max_sessions",
            ValidationError::ValueTooSmall { min: 1 },
        ));
    }

    Ok(AccountSettings {
        source,
        synthetic,
        admin,
        max_sessions,
    })
}

fn admin_roster(config: AdminConfig) -> AppResult<Option<AdminRoster>> {
    let Some((account_id, password)) = config.account_id.zip(config.password) else {
        return Ok(None);
    };
    let roster = config.roster.map_or_else(default_roster, |entries| {
        entries
            .into_iter()
            .map(|entry| {
                let mut request =
                    RosterRequest::new(entry.role, entry.pages, entry.last_page_size);
                if let Some(lender) = entry.password_from {
                    request = request.borrowing_from(lender);
                }
                request
            })
            .collect()
    });
    validate_roster(&roster).map_err(|err| field_error("accounts.admin.roster", err))?;
    Ok(Some(AdminRoster {
        account_id,
        password,
        page_size: config.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        roster,
    }))
}

fn resolve_traffic(config: &TrafficConfig) -> AppResult<TrafficSettings> {
    let default_bands = RoleBands::default();
    let bands = RoleBands::new(
        config.student_end.unwrap_or(default_bands.student_end()),
        config.teacher_end.unwrap_or(default_bands.teacher_end()),
    )
    .map_err(|err| field_error("traffic", err))?;

    let default_calendar = CalendarQuery::default();
    let month = config.calendar_month.unwrap_or(default_calendar.month);
    if !(1..=12).contains(&month) {
        return Err(field_error(
            "traffic.calendar_month",
            ValidationError::InvalidCalendarMonth { month },
        ));
    }
    let calendar = CalendarQuery {
        year: config.calendar_year.unwrap_or(default_calendar.year),
        month,
    };

    Ok(TrafficSettings { bands, calendar })
}
