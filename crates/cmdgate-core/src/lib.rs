//! cmdgate core - domain model and pure decision logic
//!
//! - Principal, Rule, CommandRecord and AuditEntry models
//! - Policy engine (pattern validation, first-match evaluation, compiled rule sets)
//! - Execution adapter seam with mock and timeout implementations
//! - Structured error facility (`ExError` / `ExErrorKind`)
//! - Structured logging facility
//!
//! Nothing here touches the database; see `cmdgate-store` and `cmdgate-engine`.

pub use cmdgate_core_types;

pub mod credential;
pub mod errors;
pub mod executor;
pub mod logging_facility;
pub mod model;
pub mod policy;

pub use errors::{ExError, ExErrorKind, GateError};
pub use executor::{ExecutionAdapter, MockExecutionAdapter, TimeoutAdapter};
pub use model::{AuditAction, AuditEntry, CommandRecord, CommandStatus, Principal, Role, Rule, RuleAction};
pub use policy::{CompiledRuleSet, PolicyDecision};
