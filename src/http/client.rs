use std::time::Duration;

use reqwest::Client;

use crate::args::DEFAULT_USER_AGENT;
use crate::error::{AppError, AppResult, HttpError};

/// Connect attempts never wait longer than this, even with long request timeouts.
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds the shared client. Cookies are carried explicitly per session, so
/// the client keeps no jar of its own.
///
/// # Errors
///
/// Returns an error when the TLS backend or client cannot be initialized.
pub fn build_client(request_timeout: Duration) -> AppResult<Client> {
    Client::builder()
        .timeout(request_timeout)
        .connect_timeout(request_timeout.min(MAX_CONNECT_TIMEOUT))
        .user_agent(DEFAULT_USER_AGENT)
        .build()
        .map_err(|err| AppError::http(HttpError::BuildClientFailed { source: err }))
}
