use std::fmt;

use serde_json::json;

/// What the login endpoint keys an account by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountKey {
    Email(String),
    AccountId(u64),
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountKey::Email(email) => f.write_str(email),
            AccountKey::AccountId(id) => write!(f, "{}", id),
        }
    }
}

/// One test account; uniquely keys one simulated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub key: AccountKey,
    pub password: String,
}

impl Identity {
    #[must_use]
    pub fn email(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            key: AccountKey::Email(email.into()),
            password: password.into(),
        }
    }

    #[must_use]
    pub fn account_id(account_id: u64, password: impl Into<String>) -> Self {
        Self {
            key: AccountKey::AccountId(account_id),
            password: password.into(),
        }
    }

    /// JSON body for `POST /rest-api/v1/auth/login`.
    #[must_use]
    pub fn login_payload(&self) -> serde_json::Value {
        match &self.key {
            AccountKey::Email(email) => json!({ "email": email, "password": self.password }),
            AccountKey::AccountId(id) => json!({ "accountId": id, "password": self.password }),
        }
    }
}
