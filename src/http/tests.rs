use std::time::Duration;

use reqwest::Url;

use super::execution::NO_RESPONSE_STATUS;
use super::{build_client, execute_request, join_url};
use crate::error::{AppError, AppResult, HttpError};
use crate::test_support::{MockRequest, MockResponse, MockServer, run_async_test};

#[test]
fn join_url_keeps_base_path() -> AppResult<()> {
    let base = Url::parse("https://api.example.com/stage/")
        .map_err(|err| AppError::validation(err.to_string()))?;
    let joined = join_url(&base, "rest-api/v1/member?x=1")?;
    if joined.as_str() != "https://api.example.com/stage/rest-api/v1/member?x=1" {
        return Err(AppError::validation(format!("Unexpected url: {}", joined)));
    }
    Ok(())
}

#[test]
fn join_url_reports_bad_paths() -> AppResult<()> {
    let base = Url::parse("https://api.example.com/")
        .map_err(|err| AppError::validation(err.to_string()))?;
    match join_url(&base, "http://[::1") {
        Err(AppError::Http(HttpError::JoinUrlFailed { path, .. })) if path == "http://[::1" => Ok(()),
        other => Err(AppError::validation(format!("Expected a join error, got {:?}", other))),
    }
}

#[test]
fn execute_request_reads_status_and_body() -> AppResult<()> {
    run_async_test(async {
        let server = MockServer::spawn(|_request: &MockRequest| {
            MockResponse::text(404, "missing")
        })
        .await?;
        let client = build_client(Duration::from_secs(5))?;

        let kept = execute_request(client.get(server.base_url.clone()), true).await;
        if kept.status != 404 || kept.response_bytes != 7 {
            return Err(AppError::validation(format!("Unexpected outcome: {:?}", kept)));
        }
        if kept.body.as_deref() != Some(b"missing".as_slice()) {
            return Err(AppError::validation(format!("Unexpected body: {:?}", kept.body)));
        }

        let dropped = execute_request(client.get(server.base_url.clone()), false).await;
        if dropped.body.is_some() || dropped.response_bytes != 7 {
            return Err(AppError::validation(format!(
                "Expected the body to be counted only: {:?}",
                dropped
            )));
        }

        let requests = server.requests()?;
        let agent = requests
            .first()
            .and_then(|request| request.header("user-agent"))
            .unwrap_or_default();
        if !agent.starts_with("loopload/") {
            return Err(AppError::validation(format!("Unexpected user agent: {}", agent)));
        }
        Ok(())
    })
}

#[test]
fn execute_request_flags_transport_errors() -> AppResult<()> {
    run_async_test(async {
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        drop(listener);

        let client = build_client(Duration::from_secs(2))?;
        let outcome = execute_request(client.get(format!("http://{}/", addr)), true).await;
        if outcome.status != NO_RESPONSE_STATUS || !outcome.transport_error || outcome.timed_out {
            return Err(AppError::validation(format!("Unexpected outcome: {:?}", outcome)));
        }
        Ok(())
    })
}
