use reqwest::{RequestBuilder, header::COOKIE};

use crate::error::SetupError;

/// What a request presents to prove who it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Bearer(String),
    /// Ready-to-send `Cookie` header value, e.g. `SESSION=abc; XSRF=def`.
    Cookies(String),
}

impl Credential {
    #[must_use]
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Credential::Bearer(token) => request.bearer_auth(token),
            Credential::Cookies(cookies) => request.header(COOKIE, cookies.as_str()),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Credential::Bearer(_) => "bearer",
            Credential::Cookies(_) => "cookie",
        }
    }
}

/// An authenticated identity, created once in setup and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_key: String,
    pub credential: Credential,
}

/// Read-only, non-empty set of sessions shared by every VU.
#[derive(Debug, Clone)]
pub struct SessionPool {
    sessions: Vec<Session>,
}

impl SessionPool {
    /// Wraps the sessions created in setup.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::NoSessions`] for an empty list.
    pub fn new(sessions: Vec<Session>) -> Result<Self, SetupError> {
        if sessions.is_empty() {
            return Err(SetupError::NoSessions);
        }
        Ok(Self { sessions })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Pool slot for a 1-based VU number. VUs past the pool size wrap.
    #[must_use]
    pub fn slot_for_vu(&self, vu: u64) -> usize {
        let len = u64::try_from(self.sessions.len()).unwrap_or(u64::MAX);
        vu.saturating_sub(1)
            .checked_rem(len)
            .and_then(|slot| usize::try_from(slot).ok())
            .unwrap_or(0)
    }

    /// Slot and session a VU drives.
    #[must_use]
    pub fn assign(&self, vu: u64) -> Option<(usize, &Session)> {
        let slot = self.slot_for_vu(vu);
        self.sessions.get(slot).map(|session| (slot, session))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter()
    }
}
