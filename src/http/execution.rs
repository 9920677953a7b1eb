use futures_util::StreamExt;
use reqwest::{RequestBuilder, Url};
use tokio::time::Instant;
use tracing::debug;

use crate::error::{AppError, AppResult, HttpError};

/// Status reported when no HTTP response arrived.
pub(crate) const NO_RESPONSE_STATUS: u16 = 0;

#[derive(Debug)]
pub(crate) struct ResponseOutcome {
    pub(crate) status: u16,
    /// Present only when the caller asked to keep it.
    pub(crate) body: Option<Vec<u8>>,
    pub(crate) response_bytes: u64,
    pub(crate) timed_out: bool,
    pub(crate) transport_error: bool,
    pub(crate) latency: std::time::Duration,
}

/// Sends a request and reads the full body, timing send plus body.
pub(crate) async fn execute_request(request: RequestBuilder, keep_body: bool) -> ResponseOutcome {
    let started = Instant::now();
    let response = match request.send().await {
        Ok(response) => response,
        Err(err) => {
            debug!("Request failed: {}", err);
            let timed_out = err.is_timeout();
            return ResponseOutcome {
                status: NO_RESPONSE_STATUS,
                body: None,
                response_bytes: 0,
                timed_out,
                transport_error: !timed_out,
                latency: started.elapsed(),
            };
        }
    };

    let status = response.status().as_u16();
    let mut stream = response.bytes_stream();
    let mut body = keep_body.then(Vec::new);
    let mut total_bytes: u64 = 0;
    let mut timed_out = false;
    let mut transport_error = false;
    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(bytes) => {
                total_bytes =
                    total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
                if let Some(body) = body.as_mut() {
                    body.extend_from_slice(&bytes);
                }
            }
            Err(err) => {
                debug!("Failed to read response body: {}", err);
                timed_out = err.is_timeout();
                transport_error = !timed_out;
                break;
            }
        }
    }

    ResponseOutcome {
        status,
        body,
        response_bytes: total_bytes,
        timed_out,
        transport_error,
        latency: started.elapsed(),
    }
}

/// Joins a relative path onto the base URL.
///
/// # Errors
///
/// Returns an error when the joined URL is invalid.
pub(crate) fn join_url(base: &Url, path: &str) -> AppResult<Url> {
    base.join(path).map_err(|err| {
        AppError::http(HttpError::JoinUrlFailed {
            path: path.to_owned(),
            source: err,
        })
    })
}
