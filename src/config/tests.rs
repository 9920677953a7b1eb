use std::time::Duration;

use clap::Parser;
use tempfile::tempdir;

use super::types::DurationValue;
use super::{
    RunConfig, load_config_file, normalize_base_url, parse_duration_value, resolve_run_config,
};
use crate::accounts::PasswordRule;
use crate::args::{AccountSourceKind, LoadArgs, ScenarioKind, Stage};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};
use crate::traffic::Pacing;

fn args(extra: &[&str]) -> AppResult<LoadArgs> {
    let mut argv = vec!["loopload"];
    argv.extend_from_slice(extra);
    Ok(LoadArgs::try_parse_from(argv)?)
}

fn resolve_toml(cli: &[&str], content: &str) -> AppResult<RunConfig> {
    let dir = tempdir()?;
    let path = dir.path().join("loopload.toml");
    std::fs::write(&path, content)?;
    let file = load_config_file(&path)?;
    resolve_run_config(&args(cli)?, Some(file))
}

#[test]
fn parse_toml_config_with_accounts_and_roster() -> AppResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("loopload.toml");
    let content = r#"
base_url = "https://api.example.com/stage"
scenario = "stress"
setup_timeout = "5m"
request_timeout = 10

[[stages]]
duration = "10s"
target = 5

[accounts]
source = "admin"
max_sessions = 20

[accounts.admin]
account_id = 1
password = "secret"

[[accounts.admin.roster]]
role = "ROLE_STUDENT"
pages = 2
last_page_size = 3

[[accounts.admin.roster]]
role = "ROLE_PARENT"
pages = 1
last_page_size = 2
password_from = "ROLE_STUDENT"
"#;
    std::fs::write(&path, content)?;

    let config = load_config_file(&path)?;
    if config.scenario != Some(ScenarioKind::Stress) {
        return Err(AppError::validation(format!("Unexpected scenario: {:?}", config.scenario)));
    }
    match config.request_timeout {
        Some(DurationValue::Seconds(10)) => {}
        other => return Err(AppError::validation(format!(
            "Unexpected request timeout: {:?}",
            other
        ))),
    }
    let stages = config.stages.as_deref().unwrap_or_default();
    match stages.first() {
        Some(stage) if stage.duration == "10s" && stage.target == 5 => {}
        other => return Err(AppError::validation(format!("Unexpected stage: {:?}", other))),
    }
    let roster = config
        .accounts
        .as_ref()
        .and_then(|accounts| accounts.admin.as_ref())
        .and_then(|admin| admin.roster.as_ref())
        .ok_or_else(|| AppError::validation("Expected a roster"))?;
    if roster.len() != 2 {
        return Err(AppError::validation(format!(
            "Expected 2 roster entries, got {}",
            roster.len()
        )));
    }
    Ok(())
}

#[test]
fn parse_json_config() -> AppResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("loopload.json");
    let content = r#"{
        "base_url": "http://localhost:8080",
        "scenario": "load",
        "thresholds": { "http_req_duration": ["p(90)<300"] },
        "traffic": { "student_end": 10, "teacher_end": 20, "calendar_month": 3 }
    }"#;
    std::fs::write(&path, content)?;

    let config = load_config_file(&path)?;
    if config.base_url.as_deref() != Some("http://localhost:8080") {
        return Err(AppError::validation("Unexpected base url"));
    }
    let traffic = config.traffic.ok_or_else(|| AppError::validation("Expected traffic"))?;
    if traffic.student_end != Some(10) || traffic.calendar_month != Some(3) {
        return Err(AppError::validation(format!("Unexpected traffic: {:?}", traffic)));
    }
    Ok(())
}

#[test]
fn config_extension_is_checked() -> AppResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("loopload.yaml");
    std::fs::write(&path, "base_url: x")?;
    match load_config_file(&path) {
        Err(AppError::Config(ConfigError::UnsupportedExtension { ext })) if ext == "yaml" => Ok(()),
        other => Err(AppError::validation(format!("Expected an extension error, got {:?}", other))),
    }
}

#[test]
fn scenario_defaults_to_smoke_preset() -> AppResult<()> {
    let config = resolve_run_config(&args(&["-u", "http://localhost:8080"])?, None)?;
    if config.scenario != ScenarioKind::Smoke {
        return Err(AppError::validation(format!("Unexpected scenario: {:?}", config.scenario)));
    }
    if config.stages.len() != 5 || config.graceful_stop != Duration::from_secs(10) {
        return Err(AppError::validation(format!("Unexpected smoke preset: {:?}", config.stages)));
    }
    if config.accounts.max_sessions != Some(50) || config.thresholds.len() != 2 {
        return Err(AppError::validation("Unexpected smoke limits"));
    }
    if config.pacing != Pacing::Fixed(Duration::from_secs(1)) || !config.needs_sessions {
        return Err(AppError::validation("Unexpected smoke pacing"));
    }
    if config.base_url.as_str() != "http://localhost:8080/" {
        return Err(AppError::validation(format!("Unexpected base url: {}", config.base_url)));
    }
    Ok(())
}

#[test]
fn cli_overrides_file_overrides_preset() -> AppResult<()> {
    let content = r#"
base_url = "http://file.example.com"
scenario = "load"
setup_timeout = "2m"

[[stages]]
duration = "20s"
target = 7

[accounts]
max_sessions = 12
count = 30
"#;
    let from_file = resolve_toml(&[], content)?;
    if from_file.scenario != ScenarioKind::Load
        || from_file.stages != [Stage::new(Duration::from_secs(20), 7)]
    {
        return Err(AppError::validation(format!(
            "File values not applied: {:?}",
            from_file.stages
        )));
    }
    if from_file.setup_timeout != Duration::from_secs(120) || from_file.accounts.max_sessions != Some(12) {
        return Err(AppError::validation("File timeouts or caps not applied"));
    }
    if from_file.accounts.synthetic.count != 30 || from_file.accounts.synthetic.password != "password1234" {
        return Err(AppError::validation(format!(
            "Unexpected synthetic accounts: {:?}",
            from_file.accounts.synthetic
        )));
    }
    if !matches!(from_file.pacing, Pacing::Uniform { .. }) {
        return Err(AppError::validation("Expected the load preset pacing"));
    }

    let from_cli = resolve_toml(
        &[
            "smoke",
            "-u",
            "http://cli.example.com/api",
            "--stages",
            "1s:1",
            "--max-sessions",
            "3",
            "--setup-timeout",
            "9s",
        ],
        content,
    )?;
    if from_cli.scenario != ScenarioKind::Smoke
        || from_cli.base_url.as_str() != "http://cli.example.com/api/"
    {
        return Err(AppError::validation(format!("CLI values not applied: {}", from_cli.base_url)));
    }
    if from_cli.stages != [Stage::new(Duration::from_secs(1), 1)]
        || from_cli.accounts.max_sessions != Some(3)
        || from_cli.setup_timeout != Duration::from_secs(9)
    {
        return Err(AppError::validation("CLI overrides lost"));
    }
    Ok(())
}

#[test]
fn file_thresholds_replace_preset() -> AppResult<()> {
    let config = resolve_toml(
        &["stress"],
        r#"
base_url = "http://localhost:8080"
[thresholds]
checks = ["rate>0.9"]
"#,
    )?;
    if config.thresholds.len() != 1 {
        return Err(AppError::validation(format!("Unexpected thresholds: {:?}", config.thresholds)));
    }
    Ok(())
}

#[test]
fn admin_source_maps_roster() -> AppResult<()> {
    let config = resolve_toml(
        &["--accounts", "admin"],
        r#"
base_url = "http://localhost:8080"
[accounts.admin]
account_id = 7
password = "pw"
page_size = 10

[[accounts.admin.roster]]
role = "ROLE_STUDENT"
pages = 1
last_page_size = 2

[[accounts.admin.roster]]
role = "ROLE_PARENT"
pages = 1
last_page_size = 2
password_from = "ROLE_STUDENT"
"#,
    )?;
    if config.accounts.source != AccountSourceKind::Admin {
        return Err(AppError::validation("Expected the admin source"));
    }
    let admin = config
        .accounts
        .admin
        .ok_or_else(|| AppError::validation("Expected admin settings"))?;
    if admin.account_id != 7 || admin.page_size != 10 {
        return Err(AppError::validation(format!("Unexpected admin: {:?}", admin)));
    }
    match admin.roster.as_slice() {
        [student, parent]
            if student.password == PasswordRule::Birthday
                && parent.password == PasswordRule::BorrowFrom("ROLE_STUDENT".to_owned()) =>
        {
            Ok(())
        }
        other => Err(AppError::validation(format!("Unexpected roster: {:?}", other))),
    }
}

#[test]
fn roster_lender_must_come_first() -> AppResult<()> {
    let cases = [
        ("ROLE_GUARDIAN", "unknown lender"),
        ("ROLE_TEACHER", "later lender"),
    ];
    for (lender, case) in cases {
        let content = format!(
            r#"
base_url = "http://localhost:8080"
[accounts.admin]
account_id = 7
password = "pw"

[[accounts.admin.roster]]
role = "ROLE_PARENT"
pages = 1
last_page_size = 2
password_from = "{}"

[[accounts.admin.roster]]
role = "ROLE_TEACHER"
pages = 1
last_page_size = 2
"#,
            lender
        );
        match resolve_toml(&["--accounts", "admin"], &content) {
            Err(AppError::Config(ConfigError::InvalidField { field, source }))
                if field == "accounts.admin.roster"
                    && matches!(
                        &source,
                        ValidationError::UnknownPasswordLender { role, .. } if role == "ROLE_PARENT"
                    ) => {}
            other => {
                return Err(AppError::validation(format!(
                    "Expected a roster error for {}, got {:?}",
                    case,
                    other.map(|c| c.scenario)
                )));
            }
        }
    }
    Ok(())
}

#[test]
fn admin_source_requires_credentials() -> AppResult<()> {
    match resolve_run_config(&args(&["-u", "http://localhost:8080", "--accounts", "admin"])?, None) {
        Err(AppError::Config(ConfigError::AdminCredentialsRequired)) => Ok(()),
        other => Err(AppError::validation(format!(
            "Expected missing admin credentials, got {:?}",
            other.map(|c| c.scenario)
        ))),
    }
}

#[test]
fn base_url_is_required() -> AppResult<()> {
    // BASE_URL may be set in the environment.
    let mut cli = args(&[])?;
    cli.base_url = None;
    match resolve_run_config(&cli, None) {
        Err(AppError::Config(ConfigError::BaseUrlRequired)) => Ok(()),
        other => Err(AppError::validation(format!(
            "Expected BaseUrlRequired, got {:?}",
            other.map(|c| c.scenario)
        ))),
    }
}

#[test]
fn invalid_file_fields_name_the_field() -> AppResult<()> {
    let bad_month = resolve_toml(
        &[],
        r#"
base_url = "http://localhost:8080"
[traffic]
calendar_month = 13
"#,
    );
    match bad_month {
        Err(err) if err.to_string().contains("traffic.calendar_month") => {}
        other => return Err(AppError::validation(format!(
            "Expected a month error, got {:?}",
            other.map(|c| c.scenario)
        ))),
    }

    let bad_bands = resolve_toml(
        &[],
        r#"
base_url = "http://localhost:8080"
[traffic]
student_end = 30
teacher_end = 10
"#,
    );
    if bad_bands.is_ok() {
        return Err(AppError::validation("Expected inverted role bands to fail"));
    }

    let bad_stage = resolve_toml(
        &[],
        r#"
base_url = "http://localhost:8080"
[[stages]]
duration = "soon"
target = 1
"#,
    );
    match bad_stage {
        Err(err) if err.to_string().contains("stages[0].duration") => Ok(()),
        other => Err(AppError::validation(format!(
            "Expected a stage error, got {:?}",
            other.map(|c| c.scenario)
        ))),
    }
}

#[test]
fn base_url_normalization() -> AppResult<()> {
    let url = normalize_base_url("https://api.example.com/v2?debug=1")?;
    if url.as_str() != "https://api.example.com/v2/" {
        return Err(AppError::validation(format!("Unexpected url: {}", url)));
    }
    if !matches!(
        normalize_base_url("not a url"),
        Err(ValidationError::InvalidBaseUrl { .. })
    ) {
        return Err(AppError::validation("Expected InvalidBaseUrl"));
    }
    if !matches!(
        normalize_base_url("mailto:ops@example.com"),
        Err(ValidationError::BaseUrlNotABase { .. })
    ) {
        return Err(AppError::validation("Expected BaseUrlNotABase"));
    }
    Ok(())
}

#[test]
fn parse_duration_units() -> AppResult<()> {
    let cases = [
        ("250ms", Duration::from_millis(250)),
        ("30s", Duration::from_secs(30)),
        ("2m", Duration::from_secs(120)),
        ("1h", Duration::from_secs(3600)),
        ("45", Duration::from_secs(45)),
    ];
    for (value, expected) in cases {
        let parsed = parse_duration_value(value)?;
        if parsed != expected {
            return Err(AppError::validation(format!("{} parsed as {:?}", value, parsed)));
        }
    }
    for bad in ["", "0s", "5d", "ms"] {
        if parse_duration_value(bad).is_ok() {
            return Err(AppError::validation(format!("Expected '{}' to be rejected", bad)));
        }
    }
    Ok(())
}
