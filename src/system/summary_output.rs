use crate::config::RunConfig;
use crate::metrics::{RunSummary, summary_lines};

/// Resolved run settings, logged before setup starts.
pub(crate) fn selection_lines(config: &RunConfig) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push("Selections:".to_owned());
    lines.push(format!("scenario: {}", config.scenario.as_str()));
    lines.push(format!("base_url: {}", config.base_url));
    lines.push(format!("stages: {}", format_stages(config)));
    lines.push(format!("accounts: {}", config.accounts.source.as_str()));
    lines.push(format!(
        "max_sessions: {}",
        config
            .accounts
            .max_sessions
            .map_or_else(|| "none".to_owned(), |max| max.to_string())
    ));
    lines.push(format!(
        "request_timeout_ms: {}",
        config.request_timeout.as_millis()
    ));
    lines.push(format!("setup_timeout_ms: {}", config.setup_timeout.as_millis()));
    lines.push(format!("graceful_stop_ms: {}", config.graceful_stop.as_millis()));
    lines.push(format!(
        "role_bands: students < {}, teachers < {}",
        config.traffic.bands.student_end(),
        config.traffic.bands.teacher_end()
    ));
    lines.push(format!("thresholds: {}", config.thresholds.len()));
    lines.push(format!(
        "summary_export: {}",
        config
            .summary_export
            .as_ref()
            .map_or_else(|| "none".to_owned(), |path| path.display().to_string())
    ));
    lines
}

/// Prints the end-of-run report to stdout.
pub(crate) fn print_summary(summary: &RunSummary) {
    for line in summary_lines(summary) {
        println!("{}", line);
    }
}

fn format_stages(config: &RunConfig) -> String {
    config
        .stages
        .iter()
        .map(|stage| format!("{}ms:{}", stage.duration.as_millis(), stage.target))
        .collect::<Vec<_>>()
        .join(",")
}
