use std::time::Duration;

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("loopload/", env!("CARGO_PKG_VERSION"));

/// Per-request timeout when nothing else is configured.
pub(crate) const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub(crate) const DEFAULT_SETUP_TIMEOUT: Duration = Duration::from_secs(60);
pub(crate) const DEFAULT_GRACEFUL_STOP: Duration = Duration::from_secs(30);
pub(crate) const DEFAULT_GRACEFUL_RAMP_DOWN: Duration = Duration::from_secs(30);
