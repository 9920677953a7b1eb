use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{AppError, AppResult, SetupError, ValidationError};
use crate::http::join_url;
use crate::metrics::MetricsSink;
use crate::session::{Credential, LOGIN_PATH, LoginFailure, SUCCESS_CODE, authenticate};
use crate::traffic::NO_RETURN_CODE;

use super::source::{AccountSource, SetupContext};
use super::types::Identity;

const ADMIN_PATH: &str = "rest-api/v1/admin";
pub const DEFAULT_PAGE_SIZE: u32 = 25;
/// Password for a borrowing role when the lender list is shorter.
pub const UNKNOWN_PASSWORD: &str = "unknown";
const ADMIN_LOGIN_CHECK: &str = "Admin login success";

/// Where a role's passwords come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordRule {
    /// Derived from each account's own birthday.
    Birthday,
    /// The i-th account reuses the i-th password of an earlier roster role.
    BorrowFrom(String),
}

/// One role to list, `pages` pages deep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRequest {
    pub role: String,
    pub pages: u32,
    pub last_page_size: u32,
    pub password: PasswordRule,
}

impl RosterRequest {
    #[must_use]
    pub fn new(role: impl Into<String>, pages: u32, last_page_size: u32) -> Self {
        Self {
            role: role.into(),
            pages,
            last_page_size,
            password: PasswordRule::Birthday,
        }
    }

    #[must_use]
    pub fn borrowing_from(mut self, role: impl Into<String>) -> Self {
        self.password = PasswordRule::BorrowFrom(role.into());
        self
    }

    /// Page size for a 0-based page index.
    #[must_use]
    pub fn page_size(&self, page: u32, default_size: u32) -> u32 {
        if page.saturating_add(1) == self.pages {
            self.last_page_size
        } else {
            default_size
        }
    }
}

/// 525 students, 51 teachers, 525 parents borrowing student passwords.
#[must_use]
pub fn default_roster() -> Vec<RosterRequest> {
    vec![
        RosterRequest::new("ROLE_STUDENT", 21, 25),
        RosterRequest::new("ROLE_TEACHER", 3, 1),
        RosterRequest::new("ROLE_PARENT", 21, 25).borrowing_from("ROLE_STUDENT"),
    ]
}

/// Checks that every borrowing role names a lender listed before it.
///
/// # Errors
///
/// Returns an error for a lender that is missing or comes later in the roster.
pub fn validate_roster(roster: &[RosterRequest]) -> Result<(), ValidationError> {
    let mut seen: Vec<&str> = Vec::with_capacity(roster.len());
    for request in roster {
        if let PasswordRule::BorrowFrom(lender) = &request.password
            && !seen.contains(&lender.as_str())
        {
            return Err(ValidationError::UnknownPasswordLender {
                role: request.role.clone(),
                lender: lender.clone(),
            });
        }
        seen.push(request.role.as_str());
    }
    Ok(())
}

/// Lists real accounts by role through the admin API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminRoster {
    pub account_id: u64,
    pub password: String,
    pub page_size: u32,
    pub roster: Vec<RosterRequest>,
}

impl AdminRoster {
    #[must_use]
    pub fn new(account_id: u64, password: impl Into<String>) -> Self {
        Self {
            account_id,
            password: password.into(),
            page_size: DEFAULT_PAGE_SIZE,
            roster: default_roster(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PageBody {
    #[serde(rename = "returnCode")]
    return_code: Option<String>,
    #[serde(rename = "ieduPage")]
    page: Option<PageContents>,
}

#[derive(Debug, Deserialize)]
struct PageContents {
    contents: Option<Vec<RosterAccount>>,
}

#[derive(Debug, Clone, Deserialize)]
struct RosterAccount {
    #[serde(rename = "accountId")]
    account_id: u64,
    birthday: Option<String>,
}

/// `2008-03-15` becomes `080315`: dashes dropped, then the first two chars.
#[must_use]
pub fn extract_password(birthday: &str) -> Option<String> {
    let password: String = birthday.chars().filter(|c| *c != '-').skip(2).collect();
    if password.is_empty() {
        None
    } else {
        Some(password)
    }
}

#[async_trait]
impl AccountSource for AdminRoster {
    fn name(&self) -> &'static str {
        "admin"
    }

    async fn load(&self, ctx: &SetupContext<'_>) -> AppResult<Vec<Identity>> {
        let token = self.admin_token(ctx).await?;
        let admin_url = join_url(ctx.base_url, ADMIN_PATH)?;

        let mut passwords: HashMap<&str, Vec<String>> = HashMap::new();
        let mut identities = Vec::new();
        for request in &self.roster {
            let accounts = self
                .fetch_role(ctx.client, &admin_url, &token, request, ctx.metrics)
                .await?;
            let mut role_passwords = Vec::with_capacity(accounts.len());
            for (index, account) in accounts.into_iter().enumerate() {
                let password = match &request.password {
                    PasswordRule::Birthday => birthday_password(&account)?,
                    PasswordRule::BorrowFrom(lender) => passwords
                        .get(lender.as_str())
                        .and_then(|lent| lent.get(index))
                        .cloned()
                        .unwrap_or_else(|| UNKNOWN_PASSWORD.to_owned()),
                };
                role_passwords.push(password.clone());
                identities.push(Identity::account_id(account.account_id, password));
            }
            info!(
                "Loaded {} {} accounts.",
                role_passwords.len(),
                request.role
            );
            passwords.insert(request.role.as_str(), role_passwords);
        }

        info!("Total accounts: {}", identities.len());
        Ok(identities)
    }
}

impl AdminRoster {
    async fn admin_token(&self, ctx: &SetupContext<'_>) -> AppResult<String> {
        let login_url = join_url(ctx.base_url, LOGIN_PATH)?;
        let identity = Identity::account_id(self.account_id, self.password.clone());
        let outcome = authenticate(ctx.client, &login_url, &identity).await;
        let token = match outcome {
            Ok(Credential::Bearer(token)) => Ok(token),
            Ok(Credential::Cookies(_)) => Err(SetupError::AdminLogin {
                source: LoginFailure::MissingCredential,
            }),
            Err(source) => Err(SetupError::AdminLogin { source }),
        };
        ctx.metrics.check(ADMIN_LOGIN_CHECK, token.is_ok());
        token.map_err(AppError::setup)
    }

    async fn fetch_role(
        &self,
        client: &Client,
        admin_url: &Url,
        token: &str,
        request: &RosterRequest,
        metrics: &MetricsSink,
    ) -> AppResult<Vec<RosterAccount>> {
        let mut accounts = Vec::new();
        for page in 0..request.pages {
            let size = request.page_size(page, self.page_size);
            let mut url = admin_url.clone();
            url.query_pairs_mut()
                .append_pair("role", &request.role)
                .append_pair("page", &page.to_string())
                .append_pair("size", &size.to_string());

            let outcome = fetch_page(client, url, token, &request.role, page).await;
            metrics.check(
                format!("Fetch {} page {} success", request.role, page),
                outcome.is_ok(),
            );
            let contents = outcome.map_err(AppError::setup)?;
            debug!(
                "Fetched {} accounts from {} page {}.",
                contents.len(),
                request.role,
                page
            );
            accounts.extend(contents);
        }
        Ok(accounts)
    }
}

async fn fetch_page(
    client: &Client,
    url: Url,
    token: &str,
    role: &str,
    page: u32,
) -> Result<Vec<RosterAccount>, SetupError> {
    let response = client
        .get(url)
        .bearer_auth(token)
        .send()
        .await
        .map_err(|source| SetupError::PageRequest {
            role: role.to_owned(),
            page,
            source,
        })?;
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|source| SetupError::PageRequest {
            role: role.to_owned(),
            page,
            source,
        })?;

    let parsed = serde_json::from_slice::<PageBody>(&bytes);
    if !status.is_success() {
        let return_code = parsed
            .ok()
            .and_then(|body| body.return_code)
            .unwrap_or_else(|| NO_RETURN_CODE.to_owned());
        return Err(SetupError::PageRejected {
            role: role.to_owned(),
            page,
            status: status.as_u16(),
            return_code,
        });
    }
    let body = parsed.map_err(|source| SetupError::PageBody {
        role: role.to_owned(),
        page,
        source,
    })?;
    if body.return_code.as_deref() != Some(SUCCESS_CODE) {
        return Err(SetupError::PageRejected {
            role: role.to_owned(),
            page,
            status: status.as_u16(),
            return_code: body
                .return_code
                .unwrap_or_else(|| NO_RETURN_CODE.to_owned()),
        });
    }
    body.page
        .and_then(|page| page.contents)
        .ok_or_else(|| SetupError::PageContentsMissing {
            role: role.to_owned(),
            page,
        })
}

fn birthday_password(account: &RosterAccount) -> AppResult<String> {
    let birthday = account.birthday.as_deref().unwrap_or_default();
    extract_password(birthday).ok_or_else(|| {
        AppError::setup(SetupError::InvalidBirthday {
            account_id: account.account_id,
            value: birthday.to_owned(),
        })
    })
}
