//! Policy engine: ordered pattern → action rules, first match wins
//!
//! Patterns are searched, not anchored: `rm\s+-rf` matches anywhere in the
//! command text unless the pattern itself carries `^`/`$`. Evaluation is a
//! pure function of the rule list and the text.

use regex::{Regex, RegexBuilder};

use crate::errors::GateError;
use crate::model::{Rule, RuleAction};

/// Upper bound on the compiled program size of a single rule pattern
pub const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Compile a rule pattern with the engine's limits
///
/// # Errors
///
/// Returns `GateError::InvalidPattern` if the pattern does not parse or
/// exceeds `PATTERN_SIZE_LIMIT`.
pub fn compile_pattern(pattern: &str) -> Result<Regex, GateError> {
    RegexBuilder::new(pattern)
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()
        .map_err(|e| GateError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

/// Whether `pattern` would be accepted as a rule
pub fn validate(pattern: &str) -> bool {
    compile_pattern(pattern).is_ok()
}

/// Scan `rules` in order and return the first whose pattern matches `text`
///
/// Rules must already be in evaluation order. A rule whose pattern no longer
/// compiles is skipped with a warning instead of failing the scan.
pub fn match_first<'a>(text: &str, rules: &'a [Rule]) -> Option<&'a Rule> {
    rules.iter().find(|rule| match compile_pattern(&rule.pattern) {
        Ok(regex) => regex.is_match(text),
        Err(e) => {
            tracing::warn!(rule_id = %rule.id, error = %e, "skipping rule with invalid pattern");
            false
        }
    })
}

/// Result of evaluating a command against the rule set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision<'a> {
    /// No rule matched; the command proceeds to execution
    NoMatch,
    /// An AUTO_ACCEPT rule matched; evaluation stops, ledger checks still apply
    Accepted(&'a Rule),
    /// An AUTO_REJECT rule matched
    Rejected(&'a Rule),
}

impl<'a> PolicyDecision<'a> {
    fn from_match(rule: Option<&'a Rule>) -> Self {
        match rule {
            None => PolicyDecision::NoMatch,
            Some(r) if r.action == RuleAction::AutoReject => PolicyDecision::Rejected(r),
            Some(r) => PolicyDecision::Accepted(r),
        }
    }
}

/// Evaluate `text` against `rules` without a precompiled set
pub fn evaluate<'a>(text: &str, rules: &'a [Rule]) -> PolicyDecision<'a> {
    PolicyDecision::from_match(match_first(text, rules))
}

struct CompiledRule {
    regex: Regex,
    rule: Rule,
}

/// A rule set compiled once and tagged with the revision it was loaded at
///
/// Callers cache this and reload when the persisted revision moves on.
pub struct CompiledRuleSet {
    revision: i64,
    rules: Vec<CompiledRule>,
    skipped: usize,
}

impl CompiledRuleSet {
    /// Compile `rules` into evaluation order (ascending `position`)
    pub fn compile(revision: i64, mut rules: Vec<Rule>) -> Self {
        rules.sort_by_key(|r| r.position);
        let total = rules.len();
        let compiled: Vec<CompiledRule> = rules
            .into_iter()
            .filter_map(|rule| match compile_pattern(&rule.pattern) {
                Ok(regex) => Some(CompiledRule { regex, rule }),
                Err(e) => {
                    tracing::warn!(
                        rule_id = %rule.id,
                        error = %e,
                        "skipping rule with invalid pattern"
                    );
                    None
                }
            })
            .collect();
        let skipped = total - compiled.len();

        Self {
            revision,
            rules: compiled,
            skipped,
        }
    }

    pub fn revision(&self) -> i64 {
        self.revision
    }

    /// Number of usable rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of rules dropped at compile time because their pattern was invalid
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn match_first(&self, text: &str) -> Option<&Rule> {
        self.rules
            .iter()
            .find(|c| c.regex.is_match(text))
            .map(|c| &c.rule)
    }

    pub fn evaluate(&self, text: &str) -> PolicyDecision<'_> {
        PolicyDecision::from_match(self.match_first(text))
    }
}

impl std::fmt::Debug for CompiledRuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledRuleSet")
            .field("revision", &self.revision)
            .field("rules", &self.rules.len())
            .field("skipped", &self.skipped)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn rule(id: &str, position: i64, pattern: &str, action: RuleAction) -> Rule {
        Rule {
            id: id.to_string(),
            position,
            pattern: pattern.to_string(),
            action,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_validate() {
        assert!(validate(r"rm\s+-rf\s+/"));
        assert!(!validate("("));
        assert!(!validate("[a-"));
    }

    #[test]
    fn test_match_is_unanchored_search() {
        let rules = vec![rule("r1", 1, r"rm\s+-rf\s+/", RuleAction::AutoReject)];
        assert!(match_first("sudo rm -rf / --no-preserve-root", &rules).is_some());
        assert!(match_first("rm -r ./build", &rules).is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let rules = vec![
            rule("accept-git", 1, r"git\s+(status|log|diff)", RuleAction::AutoAccept),
            rule("reject-all", 2, ".*", RuleAction::AutoReject),
        ];
        assert_eq!(match_first("git status", &rules).unwrap().id, "accept-git");
        assert_eq!(match_first("git push", &rules).unwrap().id, "reject-all");
    }

    #[test]
    fn test_invalid_rule_is_skipped_not_fatal() {
        let rules = vec![
            rule("broken", 1, "(", RuleAction::AutoReject),
            rule("mkfs", 2, r"mkfs\.", RuleAction::AutoReject),
        ];
        assert_eq!(match_first("mkfs.ext4 /dev/sda", &rules).unwrap().id, "mkfs");
    }

    #[test]
    fn test_evaluate_maps_actions() {
        let rules = vec![
            rule("ls", 1, "^ls", RuleAction::AutoAccept),
            rule("mkfs", 2, r"mkfs\.", RuleAction::AutoReject),
        ];
        assert!(matches!(evaluate("ls -la", &rules), PolicyDecision::Accepted(r) if r.id == "ls"));
        assert!(matches!(evaluate("mkfs.xfs", &rules), PolicyDecision::Rejected(r) if r.id == "mkfs"));
        assert_eq!(evaluate("whoami", &rules), PolicyDecision::NoMatch);
    }

    #[test]
    fn test_compiled_set_orders_by_position_and_counts_skips() {
        let set = CompiledRuleSet::compile(
            7,
            vec![
                rule("late", 9, "echo", RuleAction::AutoReject),
                rule("bad", 5, "[", RuleAction::AutoAccept),
                rule("early", 2, "echo", RuleAction::AutoAccept),
            ],
        );
        assert_eq!(set.revision(), 7);
        assert_eq!(set.len(), 2);
        assert_eq!(set.skipped(), 1);
        assert_eq!(set.match_first("echo hi").unwrap().id, "early");
    }

    #[test]
    fn test_oversized_pattern_is_invalid() {
        assert!(!validate("(a{1000}){1000}"));
    }
}
