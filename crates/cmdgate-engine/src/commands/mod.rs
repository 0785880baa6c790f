//! Engine operations
//!
//! ## Logging Ownership
//!
//! Mutating operations own their lifecycle logging (`log_op_start!`,
//! `log_op_end!`, `log_op_error!`). The store and core emit only
//! `tracing::debug!` / `tracing::warn!` detail.

pub mod bootstrap;
pub mod engine_command;
pub mod principals;
pub mod queries;
pub mod rules;
pub mod submit;
