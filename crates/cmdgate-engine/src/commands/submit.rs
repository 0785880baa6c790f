//! Command admission pipeline
//!
//! One call to `submit_command` drives one submission through:
//!
//! ```text
//! START
//!   -> balance <= 0                  => REJECTED (insufficient credits)
//!   -> AUTO_REJECT rule matches      => REJECTED (rule)
//!   -> AUTO_ACCEPT match or no match => EXECUTING
//! EXECUTING
//!   -> balance <= 0 before execution => REJECTED (insufficient credits)
//!   -> adapter fails or times out    => error, nothing persisted
//!   -> adapter succeeds              => debit 1, EXECUTED
//!   -> debit finds balance drained   => REJECTED (insufficient credits)
//! ```
//!
//! Every terminal state is written in one IMMEDIATE transaction: the
//! command row, exactly one audit entry, and for EXECUTED the debit. The
//! balance reads along the way are fast paths only; the conditional debit
//! is what keeps concurrent submissions from overdrawing.
//!
//! No transaction is open while the adapter runs.

#![allow(clippy::result_large_err)]

use crate::rule_cache::RuleCache;
use cmdgate_core::errors::{ExError, ExErrorKind, GateError};
use cmdgate_core::executor::ExecutionAdapter;
use cmdgate_core::model::{AuditAction, CommandRecord, CommandStatus, Principal};
use cmdgate_core::policy::PolicyDecision;
use cmdgate_core::{log_op_end, log_op_error, log_op_start};
use cmdgate_core_types::RequestId;
use cmdgate_store::db::{from_ms, now_ms};
use cmdgate_store::errors::{from_rusqlite, Result};
use cmdgate_store::{AuditRepo, CommandRepo, Ledger};
use rusqlite::{Connection, TransactionBehavior};

/// Credits taken for one executed command
pub const COMMAND_COST: i64 = 1;

/// Why a submission ended REJECTED
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Balance was exhausted; `balance` is what the ledger held at the time
    InsufficientCredits { balance: i64 },
    /// An AUTO_REJECT rule matched
    RuleMatched { rule_id: String, pattern: String },
}

impl RejectReason {
    /// Text stored as the command's result
    pub fn describe(&self) -> String {
        match self {
            RejectReason::InsufficientCredits { .. } => "Insufficient credits".to_string(),
            RejectReason::RuleMatched { pattern, .. } => format!("Rejected by rule {}", pattern),
        }
    }
}

/// Committed result of a submission
///
/// Both variants are persisted states. Errors from `submit_command` mean
/// nothing was written.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Executed {
        record: CommandRecord,
        /// Balance after the debit
        balance: i64,
    },
    Rejected {
        record: CommandRecord,
        reason: RejectReason,
    },
}

impl SubmitOutcome {
    pub fn record(&self) -> &CommandRecord {
        match self {
            SubmitOutcome::Executed { record, .. } | SubmitOutcome::Rejected { record, .. } => {
                record
            }
        }
    }

    pub fn status(&self) -> CommandStatus {
        self.record().status
    }

    /// Surface a rejection as an error
    ///
    /// A rule rejection becomes `PolicyRejected` carrying the rule id; a
    /// ledger rejection becomes `InsufficientCredits`. The rejected command
    /// is already committed either way; the error's entity id is its id.
    ///
    /// # Errors
    ///
    /// Returns the mapped `ExError` for `Rejected`.
    pub fn into_result(self) -> Result<CommandRecord> {
        match self {
            SubmitOutcome::Executed { record, .. } => Ok(record),
            SubmitOutcome::Rejected { record, reason } => {
                let err = match reason {
                    RejectReason::RuleMatched { rule_id, pattern } => {
                        ExError::from(GateError::PolicyRejected { rule_id, pattern })
                    }
                    RejectReason::InsufficientCredits { balance } => {
                        ExError::from(GateError::InsufficientCredits {
                            principal_id: record.principal_id.clone(),
                            balance,
                        })
                    }
                };
                Err(err
                    .with_op("submit_command")
                    .with_principal_id(&record.principal_id)
                    .with_entity_id(&record.id))
            }
        }
    }
}

/// Submit `text` on behalf of `principal`
///
/// `principal` only supplies the identity; balances are always read from the
/// ledger.
///
/// ## Errors
///
/// - `InvalidInput`: blank command text
/// - `NotFound`: the principal no longer exists
/// - `ExecutionFailed` / `Timeout`: the adapter failed; nothing persisted
/// - `Persistence`: database error; the transaction rolled back
pub fn submit_command(
    principal: &Principal,
    text: &str,
    conn: &mut Connection,
    adapter: &dyn ExecutionAdapter,
    rules: &RuleCache,
) -> Result<SubmitOutcome> {
    let request_id = RequestId::new();
    log_op_start!(
        "submit_command",
        principal_id = %principal.id,
        request_id = %request_id
    );
    let start = std::time::Instant::now();

    let outcome = submit_command_impl(principal, text, conn, adapter, rules).map_err(|e| {
        let e = e.with_request_id(request_id.clone());
        log_op_error!(
            "submit_command",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            principal_id = %principal.id,
            request_id = %request_id
        );
        e
    })?;

    log_op_end!(
        "submit_command",
        duration_ms = start.elapsed().as_millis() as u64,
        principal_id = %principal.id,
        request_id = %request_id,
        command_id = %outcome.record().id,
        status = %outcome.status()
    );

    Ok(outcome)
}

fn submit_command_impl(
    principal: &Principal,
    text: &str,
    conn: &mut Connection,
    adapter: &dyn ExecutionAdapter,
    rules: &RuleCache,
) -> Result<SubmitOutcome> {
    if text.trim().is_empty() {
        return Err(ExError::new(ExErrorKind::InvalidInput)
            .with_op("submit_command")
            .with_principal_id(&principal.id)
            .with_message("Command text must not be empty"));
    }

    let created_at = now_ms();

    let balance = Ledger::get_balance(conn, &principal.id)?;
    if balance < COMMAND_COST {
        return reject(
            conn,
            principal,
            text,
            created_at,
            RejectReason::InsufficientCredits { balance },
        );
    }

    let rule_set = rules.snapshot(conn)?;
    match rule_set.evaluate(text) {
        PolicyDecision::Rejected(rule) => {
            let reason = RejectReason::RuleMatched {
                rule_id: rule.id.clone(),
                pattern: rule.pattern.clone(),
            };
            return reject(conn, principal, text, created_at, reason);
        }
        PolicyDecision::Accepted(rule) => {
            tracing::debug!(rule_id = %rule.id, "Command auto-accepted by rule");
        }
        PolicyDecision::NoMatch => {}
    }

    let balance = Ledger::get_balance(conn, &principal.id)?;
    if balance < COMMAND_COST {
        return reject(
            conn,
            principal,
            text,
            created_at,
            RejectReason::InsufficientCredits { balance },
        );
    }

    let output = adapter.execute(text)?;

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(from_rusqlite)?;

    let new_balance = match Ledger::debit(&tx, &principal.id, COMMAND_COST) {
        Ok(new_balance) => new_balance,
        Err(e) if e.kind() == ExErrorKind::InsufficientCredits => {
            // Drained by a concurrent submission after the pre-check
            let balance = Ledger::get_balance(&tx, &principal.id)?;
            tracing::debug!(principal_id = %principal.id, "Balance drained during execution");
            let reason = RejectReason::InsufficientCredits { balance };
            let record = persist_terminal(
                &tx,
                principal,
                text,
                created_at,
                CommandStatus::Rejected,
                reason.describe(),
            )?;
            tx.commit().map_err(from_rusqlite)?;
            return Ok(SubmitOutcome::Rejected { record, reason });
        }
        Err(e) => return Err(e),
    };

    let record = persist_terminal(
        &tx,
        principal,
        text,
        created_at,
        CommandStatus::Executed,
        output,
    )?;
    tx.commit().map_err(from_rusqlite)?;

    Ok(SubmitOutcome::Executed {
        record,
        balance: new_balance,
    })
}

fn reject(
    conn: &mut Connection,
    principal: &Principal,
    text: &str,
    created_at: i64,
    reason: RejectReason,
) -> Result<SubmitOutcome> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(from_rusqlite)?;
    let record = persist_terminal(
        &tx,
        principal,
        text,
        created_at,
        CommandStatus::Rejected,
        reason.describe(),
    )?;
    tx.commit().map_err(from_rusqlite)?;

    Ok(SubmitOutcome::Rejected { record, reason })
}

/// Write the command row and its single audit entry
fn persist_terminal(
    conn: &Connection,
    principal: &Principal,
    text: &str,
    created_at: i64,
    status: CommandStatus,
    result: String,
) -> Result<CommandRecord> {
    let record = CommandRecord {
        id: uuid::Uuid::now_v7().to_string(),
        principal_id: principal.id.clone(),
        command_text: text.to_string(),
        status,
        result: Some(result),
        created_at: from_ms(created_at),
    };
    let (action, detail) = match status {
        CommandStatus::Executed => (
            AuditAction::CommandExecuted,
            format!("{} -> {}", text, record.result.as_deref().unwrap_or_default()),
        ),
        CommandStatus::Rejected => (
            AuditAction::CommandRejected,
            format!("{}: {}", text, record.result.as_deref().unwrap_or_default()),
        ),
        CommandStatus::Submitted => {
            return Err(ExError::new(ExErrorKind::Internal)
                .with_op("persist_terminal")
                .with_principal_id(&principal.id)
                .with_message("Refusing to persist a non-terminal command"));
        }
    };
    CommandRepo::insert(conn, &record)?;

    AuditRepo::append(conn, Some(&principal.id), action, &detail)?;

    Ok(record)
}
