//! Migration framework
//!
//! - Embedded SQL migrations applied in order, each in its own transaction
//! - Idempotent: applied migrations are recorded in `schema_version`
//! - Checksums detect an applied migration whose SQL was later edited

mod checksums;
mod embedded;
mod runner;

pub use runner::{applied_migrations, apply_migrations};
