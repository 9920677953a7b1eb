//! Session establishment: one login per identity, failures dropped.
mod login;
mod types;


pub use login::{LoginFailure, SUCCESS_CODE, authenticate, establish_sessions};
pub use types::{Credential, Session, SessionPool};

pub(crate) use login::LOGIN_PATH;
