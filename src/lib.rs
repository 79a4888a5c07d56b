//! Fulfillment status engine and SLA timeliness monitor.
//!
//! [`state_machine`] owns the legal transitions, per-stage SLA windows and
//! required-field rules; [`monitor`] turns stage deadlines into overdue
//! verdicts, warning notifications and reports. Both are pure over their
//! inputs, so callers may share them across threads freely.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod state_machine;
pub mod ui;

pub use error::{AppError, EngineError, TransitionError};
