//! cmdgate store - SQLite persistence
//!
//! Provides:
//! - Connection setup (WAL, busy timeout, foreign keys)
//! - Embedded, checksummed migrations
//! - Repositories for principals, the credit ledger, rules, commands and the audit log
//! - Idempotent bootstrap of the admin principal and default rules

pub mod bootstrap;
pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

pub use bootstrap::{bootstrap, BootstrapReport};
pub use errors::Result;
pub use repo::{AuditRepo, CommandRepo, Ledger, PrincipalRepo, RuleRepo};
