//! cmdgate engine - orchestration layer
//!
//! Drives submissions through policy, ledger, execution and audit, and
//! exposes the administrative operations around them. Every operation takes
//! an explicit `rusqlite::Connection`; concurrent callers each open their own.

pub mod commands;
pub mod config;
pub mod identity;
pub mod rule_cache;

pub use commands::bootstrap::{bootstrap_gateway, open_gateway};
pub use commands::engine_command::{
    apply_engine_command, EngineCommand, EngineCommandResult, EngineContext,
};
pub use commands::principals::{create_principal, get_credits, ProvisionedPrincipal};
pub use commands::queries::{get_audit, get_history};
pub use commands::rules::{create_rule, list_rules};
pub use commands::submit::{submit_command, RejectReason, SubmitOutcome};
pub use config::GatewayConfig;
pub use identity::{authenticate, require_admin, resolve_principal};
pub use rule_cache::RuleCache;
