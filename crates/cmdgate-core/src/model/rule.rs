use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::GateError;

/// What happens when a rule's pattern matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleAction {
    /// Stop evaluating rules and proceed to execution (ledger checks still apply)
    AutoAccept,
    /// Stop evaluating rules and reject the command
    AutoReject,
}

impl RuleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleAction::AutoAccept => "AUTO_ACCEPT",
            RuleAction::AutoReject => "AUTO_REJECT",
        }
    }
}

impl FromStr for RuleAction {
    type Err = GateError;

    /// Accepts the stored form (`AUTO_REJECT`) as well as the kebab form
    /// used on the command line (`auto-reject`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "AUTO_ACCEPT" => Ok(RuleAction::AutoAccept),
            "AUTO_REJECT" => Ok(RuleAction::AutoReject),
            _ => Err(GateError::UnknownVariant {
                field: "rule action",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for RuleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered policy entry
///
/// Rules are immutable once created. `position` is assigned by the store at
/// insert time and defines evaluation order: lower positions are consulted
/// first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique identifier (UUID v7)
    pub id: String,

    /// Insertion sequence number
    pub position: i64,

    /// Regular expression searched (unanchored) within the command text
    pub pattern: String,

    pub action: RuleAction,

    /// Principal that created the rule; None for rules seeded without an actor
    pub created_by: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parses_stored_and_cli_forms() {
        assert_eq!(
            "AUTO_REJECT".parse::<RuleAction>().unwrap(),
            RuleAction::AutoReject
        );
        assert_eq!(
            "auto-accept".parse::<RuleAction>().unwrap(),
            RuleAction::AutoAccept
        );
        assert!("maybe".parse::<RuleAction>().is_err());
    }

    #[test]
    fn test_action_serializes_in_screaming_case() {
        let json = serde_json::to_string(&RuleAction::AutoReject).unwrap();
        assert_eq!(json, "\"AUTO_REJECT\"");
    }
}
