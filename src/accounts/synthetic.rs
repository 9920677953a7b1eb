use async_trait::async_trait;
use tracing::info;

use crate::error::AppResult;

use super::source::{AccountSource, SetupContext};
use super::types::Identity;

pub const DEFAULT_ACCOUNT_COUNT: usize = 1000;
pub const DEFAULT_DOMAIN: &str = "example.com";
pub const DEFAULT_PREFIX: &str = "user";
pub const DEFAULT_PASSWORD: &str = "password1234";

/// `user1@example.com` .. `user{count}@example.com`, all with one password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticAccounts {
    pub count: usize,
    pub domain: String,
    pub prefix: String,
    pub password: String,
}

impl Default for SyntheticAccounts {
    fn default() -> Self {
        Self {
            count: DEFAULT_ACCOUNT_COUNT,
            domain: DEFAULT_DOMAIN.to_owned(),
            prefix: DEFAULT_PREFIX.to_owned(),
            password: DEFAULT_PASSWORD.to_owned(),
        }
    }
}

impl SyntheticAccounts {
    #[must_use]
    pub fn identities(&self) -> Vec<Identity> {
        generate_emails(self.count, &self.domain, &self.prefix)
            .into_iter()
            .map(|email| Identity::email(email, self.password.clone()))
            .collect()
    }
}

#[async_trait]
impl AccountSource for SyntheticAccounts {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    async fn load(&self, _ctx: &SetupContext<'_>) -> AppResult<Vec<Identity>> {
        let identities = self.identities();
        if let (Some(first), Some(last)) = (identities.first(), identities.last()) {
            info!(
                "Generated {} synthetic accounts ({} .. {}).",
                identities.len(),
                first.key,
                last.key
            );
        }
        Ok(identities)
    }
}

/// Numbered emails starting at 1: `{prefix}{n}@{domain}`.
#[must_use]
pub fn generate_emails(count: usize, domain: &str, prefix: &str) -> Vec<String> {
    (1..=count)
        .map(|index| format!("{prefix}{index}@{domain}"))
        .collect()
}
