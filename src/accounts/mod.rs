//! Test identities: generated emails or real accounts listed by an admin.
mod admin;
mod source;
mod synthetic;
mod types;


pub use admin::{
    AdminRoster, DEFAULT_PAGE_SIZE, PasswordRule, RosterRequest, UNKNOWN_PASSWORD,
    default_roster, extract_password, validate_roster,
};
pub use source::{AccountSettings, AccountSource, SetupContext};
pub use synthetic::{
    DEFAULT_ACCOUNT_COUNT, DEFAULT_DOMAIN, DEFAULT_PASSWORD, DEFAULT_PREFIX, SyntheticAccounts,
    generate_emails,
};
pub use types::{AccountKey, Identity};
