use std::time::Duration;

use thiserror::Error;

use crate::session::LoginFailure;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Admin login failed: {source}")]
    AdminLogin {
        #[source]
        source: LoginFailure,
    },
    #[error("Fetching {role} page {page} failed: {source}")]
    PageRequest {
        role: String,
        page: u32,
        #[source]
        source: reqwest::Error,
    },
    #[error("Fetching {role} page {page} failed: status {status}, returnCode {return_code}.")]
    PageRejected {
        role: String,
        page: u32,
        status: u16,
        return_code: String,
    },
    #[error("Invalid {role} page {page} body: {source}")]
    PageBody {
        role: String,
        page: u32,
        #[source]
        source: serde_json::Error,
    },
    #[error("{role} page {page} has no ieduPage.contents.")]
    PageContentsMissing { role: String, page: u32 },
    #[error("Account {account_id} has an unusable birthday '{value}'.")]
    InvalidBirthday { account_id: u64, value: String },
    #[error("No sessions created in setup.")]
    NoSessions,
    #[error("Setup did not finish within {}s.", timeout.as_secs())]
    Timeout { timeout: Duration },
}
