//! Ramping-VU executor: stage interpolation and the VU scheduler.
mod runner;
mod stages;


pub use runner::{DEFAULT_TICK, HostOptions, RunReport, VuIteration, run_schedule};
pub use stages::VuSchedule;
