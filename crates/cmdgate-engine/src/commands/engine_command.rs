//! Authenticated command dispatch
//!
//! Front ends build an `EngineCommand`, resolve the caller once, and hand
//! both here. Each variant maps onto one engine operation.

#![allow(clippy::result_large_err)]

use crate::commands::principals::{create_principal, get_credits, ProvisionedPrincipal};
use crate::commands::queries::{get_audit, get_history};
use crate::commands::rules::{create_rule, list_rules};
use crate::commands::submit::{submit_command, SubmitOutcome};
use crate::rule_cache::RuleCache;
use cmdgate_core::executor::ExecutionAdapter;
use cmdgate_core::model::{AuditEntry, CommandRecord, Principal, Role, Rule, RuleAction};
use cmdgate_store::errors::Result;
use rusqlite::Connection;

/// Operations a principal can request
#[derive(Debug, Clone)]
pub enum EngineCommand {
    Submit {
        text: String,
    },
    CreateRule {
        pattern: String,
        action: RuleAction,
    },
    ListRules,
    CreatePrincipal {
        name: String,
        role: Role,
        credits: Option<i64>,
    },
    GetCredits,
    GetHistory,
    GetAudit {
        limit: usize,
    },
}

/// Result of applying an engine command
#[derive(Debug, Clone)]
pub enum EngineCommandResult {
    Submitted(SubmitOutcome),
    RuleCreated(Rule),
    Rules(Vec<Rule>),
    PrincipalCreated(ProvisionedPrincipal),
    Credits(i64),
    History(Vec<CommandRecord>),
    Audit(Vec<AuditEntry>),
}

/// Everything an operation may need besides the caller
pub struct EngineContext<'a> {
    pub conn: &'a mut Connection,
    pub adapter: &'a dyn ExecutionAdapter,
    pub rules: &'a RuleCache,
}

/// Apply `cmd` on behalf of `actor`
pub fn apply_engine_command(
    cmd: EngineCommand,
    actor: &Principal,
    ctx: EngineContext<'_>,
) -> Result<EngineCommandResult> {
    match cmd {
        EngineCommand::Submit { text } => {
            submit_command(actor, &text, ctx.conn, ctx.adapter, ctx.rules)
                .map(EngineCommandResult::Submitted)
        }
        EngineCommand::CreateRule { pattern, action } => {
            create_rule(actor, &pattern, action, ctx.conn).map(EngineCommandResult::RuleCreated)
        }
        EngineCommand::ListRules => list_rules(ctx.conn).map(EngineCommandResult::Rules),
        EngineCommand::CreatePrincipal {
            name,
            role,
            credits,
        } => create_principal(actor, &name, role, credits, ctx.conn)
            .map(EngineCommandResult::PrincipalCreated),
        EngineCommand::GetCredits => get_credits(actor, ctx.conn).map(EngineCommandResult::Credits),
        EngineCommand::GetHistory => get_history(actor, ctx.conn).map(EngineCommandResult::History),
        EngineCommand::GetAudit { limit } => {
            get_audit(actor, limit, ctx.conn).map(EngineCommandResult::Audit)
        }
    }
}
