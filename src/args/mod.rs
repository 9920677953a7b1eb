//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;


pub use cli::LoadArgs;
pub use types::{AccountSourceKind, PositiveUsize, ScenarioKind, Stage, StageList};

pub(crate) use defaults::{
    DEFAULT_GRACEFUL_RAMP_DOWN, DEFAULT_GRACEFUL_STOP, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_SETUP_TIMEOUT, DEFAULT_USER_AGENT,
};
