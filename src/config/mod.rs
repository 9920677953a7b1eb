//! Configuration loading and merging with CLI flags and scenario presets.
mod apply;
mod loader;
mod parse;
pub mod types;

#[cfg(test)]
mod tests;

pub use apply::{RunConfig, normalize_base_url, resolve_run_config};
pub use loader::load_config;

pub(crate) use loader::DEFAULT_CONFIG_FILES;

#[cfg(test)]
pub(crate) use loader::load_config_file;
pub(crate) use parse::parse_duration_value;
