use reqwest::{Client, Response, Url, header::SET_COOKIE};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::accounts::Identity;
use crate::error::{AppError, AppResult};
use crate::http::join_url;
use crate::metrics::MetricsSink;

use super::types::{Credential, Session, SessionPool};

pub(crate) const LOGIN_PATH: &str = "rest-api/v1/auth/login";
pub const SUCCESS_CODE: &str = "SUCCESS";
const LOGIN_CHECK: &str = "login success";

/// Why one identity could not be turned into a session.
#[derive(Debug, Error)]
pub enum LoginFailure {
    #[error("login request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("login response is not JSON: {0}")]
    InvalidBody(#[source] serde_json::Error),
    #[error("login rejected: status {status}, returnCode {return_code}")]
    Rejected { status: u16, return_code: String },
    #[error("login succeeded without an access token or session cookie")]
    MissingCredential,
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    #[serde(rename = "returnCode")]
    return_code: Option<String>,
    data: Option<serde_json::Value>,
}

impl LoginBody {
    fn access_token(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|data| data.get("accessToken"))
            .and_then(serde_json::Value::as_str)
            .filter(|token| !token.is_empty())
    }
}

/// Logs one identity in. Bearer tokens win over cookies when both are present.
///
/// # Errors
///
/// Returns a [`LoginFailure`] describing why no credential was obtained.
pub async fn authenticate(
    client: &Client,
    login_url: &Url,
    identity: &Identity,
) -> Result<Credential, LoginFailure> {
    let response = client
        .post(login_url.clone())
        .json(&identity.login_payload())
        .send()
        .await
        .map_err(LoginFailure::Transport)?;
    let status = response.status();
    let cookies = session_cookies(&response);
    let bytes = response.bytes().await.map_err(LoginFailure::Transport)?;

    let body: LoginBody = match serde_json::from_slice(&bytes) {
        Ok(body) => body,
        Err(err) => {
            if status.is_success()
                && let Some(cookies) = cookies
            {
                return Ok(Credential::Cookies(cookies));
            }
            return Err(LoginFailure::InvalidBody(err));
        }
    };

    match body.return_code.as_deref() {
        Some(SUCCESS_CODE) => {
            if let Some(token) = body.access_token() {
                return Ok(Credential::Bearer(token.to_owned()));
            }
        }
        Some(other) => {
            return Err(LoginFailure::Rejected {
                status: status.as_u16(),
                return_code: other.to_owned(),
            });
        }
        None => {}
    }

    if status.is_success()
        && let Some(cookies) = cookies
    {
        return Ok(Credential::Cookies(cookies));
    }
    if body.return_code.is_some() {
        Err(LoginFailure::MissingCredential)
    } else {
        Err(LoginFailure::Rejected {
            status: status.as_u16(),
            return_code: crate::traffic::NO_RETURN_CODE.to_owned(),
        })
    }
}

/// Collapses every `Set-Cookie` into one `Cookie` header value.
fn session_cookies(response: &Response) -> Option<String> {
    let pairs: Vec<&str> = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::trim)
        .filter(|pair| pair.contains('='))
        .collect();
    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}

/// Logs identities in one by one, dropping those that fail.
///
/// `max_sessions` caps how many identities are tried. Each attempt records a
/// `login success` check.
///
/// # Errors
///
/// Returns an error when the login URL cannot be built or no session was
/// created.
pub async fn establish_sessions(
    client: &Client,
    base_url: &Url,
    identities: Vec<Identity>,
    max_sessions: Option<usize>,
    metrics: &MetricsSink,
) -> AppResult<SessionPool> {
    let login_url = join_url(base_url, LOGIN_PATH)?;
    let limit = max_sessions.unwrap_or(identities.len());
    let attempted = identities.len().min(limit);

    let mut sessions = Vec::with_capacity(attempted);
    for identity in identities.into_iter().take(limit) {
        let outcome = authenticate(client, &login_url, &identity).await;
        metrics.check(LOGIN_CHECK, outcome.is_ok());
        match outcome {
            Ok(credential) => sessions.push(Session {
                user_key: identity.key.to_string(),
                credential,
            }),
            Err(err) => warn!("Dropping {} from the session pool: {}", identity.key, err),
        }
    }

    info!("Created {} of {} sessions.", sessions.len(), attempted);
    SessionPool::new(sessions).map_err(AppError::setup)
}
