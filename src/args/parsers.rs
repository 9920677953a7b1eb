use std::time::Duration;

use super::types::{PositiveUsize, Stage, StageList};
use crate::config::parse_duration_value;
use crate::error::ValidationError;

pub(crate) fn parse_duration_arg(s: &str) -> Result<Duration, ValidationError> {
    parse_duration_value(s)
}

pub(super) fn parse_positive_usize(s: &str) -> Result<PositiveUsize, ValidationError> {
    s.parse::<PositiveUsize>()
}

/// Parses `duration:target` pairs separated by commas, e.g. `30s:5,2m:15,30s:0`.
pub(crate) fn parse_stages(s: &str) -> Result<StageList, ValidationError> {
    let mut stages = Vec::new();
    for raw in s.split(',') {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        stages.push(parse_stage(raw)?);
    }
    if stages.is_empty() {
        return Err(ValidationError::StagesEmpty);
    }
    Ok(StageList(stages))
}

pub(crate) fn parse_stage(s: &str) -> Result<Stage, ValidationError> {
    let (duration_part, target_part) =
        s.split_once(':')
            .ok_or_else(|| ValidationError::InvalidStageFormat {
                value: s.to_owned(),
            })?;
    let duration = parse_duration_value(duration_part)?;
    let target: u64 = target_part
        .trim()
        .parse()
        .map_err(|err| ValidationError::InvalidNumber { source: err })?;
    Ok(Stage::new(duration, target))
}
