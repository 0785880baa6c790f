use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::GateError;

/// Lifecycle status of a submitted command
///
/// Only `Executed` and `Rejected` are ever persisted: execution is
/// synchronous, so a command is written once, in its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandStatus {
    Submitted,
    Executed,
    Rejected,
}

impl CommandStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandStatus::Submitted => "submitted",
            CommandStatus::Executed => "executed",
            CommandStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, CommandStatus::Submitted)
    }
}

impl FromStr for CommandStatus {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(CommandStatus::Submitted),
            "executed" => Ok(CommandStatus::Executed),
            "rejected" => Ok(CommandStatus::Rejected),
            other => Err(GateError::UnknownVariant {
                field: "command status",
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A submission and its outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRecord {
    /// Unique identifier (UUID v7)
    pub id: String,

    pub principal_id: String,

    /// Command text exactly as submitted
    pub command_text: String,

    pub status: CommandStatus,

    /// Adapter output for executed commands, rejection reason otherwise
    pub result: Option<String>,

    pub created_at: DateTime<Utc>,
}
