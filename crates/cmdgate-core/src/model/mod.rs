pub mod audit;
pub mod command;
pub mod principal;
pub mod rule;

pub use audit::{AuditAction, AuditEntry};
pub use command::{CommandRecord, CommandStatus};
pub use principal::{Principal, Role, DEFAULT_CREDITS};
pub use rule::{Rule, RuleAction};
