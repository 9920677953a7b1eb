//! Core library for the `loopload` CLI.
//!
//! Role-aware load scenarios for the loop REST backend. The crate provisions
//! test identities, logs them in once during setup, then drives ramped
//! virtual users whose role, resource ids and request plan all derive from
//! their VU number. The primary interface is the `loopload` binary; library
//! APIs may evolve as the CLI grows.
pub mod accounts;
pub mod args;
pub mod config;
pub mod entry;
pub mod error;
pub mod host;
pub mod http;
pub mod metrics;
pub mod scenario;
pub mod session;
pub mod traffic;

mod shutdown;
mod shutdown_handlers;
mod system;

#[cfg(test)]
mod test_support;
