//! HTTP client construction and response handling shared by setup and VUs.
mod client;
mod execution;

#[cfg(test)]
mod tests;

pub use client::build_client;
pub(crate) use execution::{ResponseOutcome, execute_request, join_url};
