use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::args::AccountSourceKind;
use crate::error::{AppError, AppResult, ConfigError};
use crate::metrics::MetricsSink;

use super::admin::AdminRoster;
use super::synthetic::SyntheticAccounts;
use super::types::Identity;

/// Shared handles a source needs while provisioning.
pub struct SetupContext<'ctx> {
    pub client: &'ctx Client,
    pub base_url: &'ctx Url,
    pub metrics: &'ctx MetricsSink,
}

/// Produces the pool of identities a run logs in with.
#[async_trait]
pub trait AccountSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Loads every identity this source provides, in pool order.
    ///
    /// # Errors
    ///
    /// Returns an error when the source cannot produce its identities. For
    /// the admin roster this aborts the run.
    async fn load(&self, ctx: &SetupContext<'_>) -> AppResult<Vec<Identity>>;
}

/// Resolved account settings for one run.
#[derive(Debug, Clone)]
pub struct AccountSettings {
    pub source: AccountSourceKind,
    pub synthetic: SyntheticAccounts,
    pub admin: Option<AdminRoster>,
    pub max_sessions: Option<usize>,
}

impl AccountSettings {
    /// Builds the configured source.
    ///
    /// # Errors
    ///
    /// Returns an error when the admin source is selected without admin
    /// credentials.
    pub fn build_source(&self) -> AppResult<Box<dyn AccountSource>> {
        match self.source {
            AccountSourceKind::Synthetic => Ok(Box::new(self.synthetic.clone())),
            AccountSourceKind::Admin => {
                let admin = self
                    .admin
                    .clone()
                    .ok_or_else(|| AppError::config(ConfigError::AdminCredentialsRequired))?;
                Ok(Box::new(admin))
            }
        }
    }
}
