use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::time::Duration;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, ValueEnum, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    Smoke,
    Load,
    Stress,
    Demo,
}

impl ScenarioKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ScenarioKind::Smoke => "smoke",
            ScenarioKind::Load => "load",
            ScenarioKind::Stress => "stress",
            ScenarioKind::Demo => "demo",
        }
    }
}

impl std::str::FromStr for ScenarioKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "smoke" => Ok(ScenarioKind::Smoke),
            "load" => Ok(ScenarioKind::Load),
            "stress" => Ok(ScenarioKind::Stress),
            "demo" => Ok(ScenarioKind::Demo),
            _ => Err(ValidationError::InvalidScenario {
                value: s.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccountSourceKind {
    /// Templated `user{n}@domain` identities sharing one password
    Synthetic,
    /// Real accounts listed by role through the admin API
    Admin,
}

impl AccountSourceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            AccountSourceKind::Synthetic => "synthetic",
            AccountSourceKind::Admin => "admin",
        }
    }
}

impl std::str::FromStr for AccountSourceKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "synthetic" => Ok(AccountSourceKind::Synthetic),
            "admin" => Ok(AccountSourceKind::Admin),
            _ => Err(ValidationError::InvalidAccountSource {
                value: s.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositiveUsize(NonZeroUsize);

impl PositiveUsize {
    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl TryFrom<usize> for PositiveUsize {
    type Error = ValidationError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        NonZeroUsize::new(value)
            .map(PositiveUsize)
            .ok_or(ValidationError::ValueTooSmall { min: 1 })
    }
}

impl std::str::FromStr for PositiveUsize {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: usize = s
            .trim()
            .parse()
            .map_err(|err| ValidationError::InvalidNumber { source: err })?;
        PositiveUsize::try_from(value)
    }
}

impl From<PositiveUsize> for usize {
    fn from(value: PositiveUsize) -> Self {
        value.get()
    }
}

/// One ramp stage: move the VU count linearly to `target` over `duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage {
    pub duration: Duration,
    pub target: u64,
}

impl Stage {
    #[must_use]
    pub const fn new(duration: Duration, target: u64) -> Self {
        Self { duration, target }
    }
}

/// Ordered ramp stages as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageList(pub Vec<Stage>);

impl StageList {
    #[must_use]
    pub fn into_inner(self) -> Vec<Stage> {
        self.0
    }
}
