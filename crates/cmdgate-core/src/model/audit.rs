use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::GateError;

/// Tag describing what an audit entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    CommandExecuted,
    CommandRejected,
    RuleCreated,
    PrincipalCreated,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::CommandExecuted => "command_executed",
            AuditAction::CommandRejected => "command_rejected",
            AuditAction::RuleCreated => "rule_created",
            AuditAction::PrincipalCreated => "principal_created",
        }
    }
}

impl FromStr for AuditAction {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "command_executed" => Ok(AuditAction::CommandExecuted),
            "command_rejected" => Ok(AuditAction::CommandRejected),
            "rule_created" => Ok(AuditAction::RuleCreated),
            "principal_created" => Ok(AuditAction::PrincipalCreated),
            other => Err(GateError::UnknownVariant {
                field: "audit action",
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only audit record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Insertion sequence; breaks timestamp ties
    pub id: i64,

    /// Acting principal, absent for system actions such as bootstrap
    pub actor_id: Option<String>,

    pub action: AuditAction,

    pub detail: String,

    pub timestamp: DateTime<Utc>,
}
