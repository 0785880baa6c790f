//! Rule administration

#![allow(clippy::result_large_err)]

use crate::identity::require_admin;
use cmdgate_core::errors::ExError;
use cmdgate_core::model::{AuditAction, Principal, Rule, RuleAction};
use cmdgate_core::policy;
use cmdgate_core::{log_op_end, log_op_error, log_op_start};
use cmdgate_store::errors::{from_rusqlite, Result};
use cmdgate_store::{AuditRepo, RuleRepo};
use rusqlite::{Connection, TransactionBehavior};

/// Append a rule to the end of the evaluation order
///
/// The rule, the rule-set revision bump and a `rule_created` audit entry
/// commit together. Caches pick the rule up on their next snapshot.
///
/// ## Errors
///
/// - `Forbidden`: `actor` is not an admin
/// - `InvalidPattern`: the pattern does not compile; nothing is written
/// - `Persistence`: database error
pub fn create_rule(
    actor: &Principal,
    pattern: &str,
    action: RuleAction,
    conn: &mut Connection,
) -> Result<Rule> {
    log_op_start!("create_rule", principal_id = %actor.id);
    let start = std::time::Instant::now();

    let rule = create_rule_impl(actor, pattern, action, conn).map_err(|e| {
        log_op_error!(
            "create_rule",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "create_rule",
        duration_ms = start.elapsed().as_millis() as u64,
        rule_id = %rule.id
    );

    Ok(rule)
}

fn create_rule_impl(
    actor: &Principal,
    pattern: &str,
    action: RuleAction,
    conn: &mut Connection,
) -> Result<Rule> {
    require_admin(actor, "create_rule")?;
    policy::compile_pattern(pattern)
        .map_err(|e| ExError::from(e).with_principal_id(&actor.id))?;

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(from_rusqlite)?;
    let rule = RuleRepo::insert(&tx, pattern, action, Some(&actor.id))?;
    AuditRepo::append(
        &tx,
        Some(&actor.id),
        AuditAction::RuleCreated,
        &format!("{} {}", rule.action, rule.pattern),
    )?;
    tx.commit().map_err(from_rusqlite)?;

    Ok(rule)
}

/// All rules in evaluation order
pub fn list_rules(conn: &Connection) -> Result<Vec<Rule>> {
    RuleRepo::list(conn)
}
