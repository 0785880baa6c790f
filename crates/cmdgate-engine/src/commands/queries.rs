//! Read-side queries

#![allow(clippy::result_large_err)]

use crate::identity::require_admin;
use cmdgate_core::model::{AuditEntry, CommandRecord, Principal};
use cmdgate_store::errors::Result;
use cmdgate_store::{AuditRepo, CommandRepo};
use rusqlite::Connection;

/// Hard cap on a single audit query
pub const MAX_AUDIT_LIMIT: usize = 1_000;

/// The principal's own commands, newest first
pub fn get_history(principal: &Principal, conn: &Connection) -> Result<Vec<CommandRecord>> {
    CommandRepo::list_for_principal(conn, &principal.id)
}

/// The most recent audit entries, newest first
///
/// `limit` is capped at `MAX_AUDIT_LIMIT`.
///
/// # Errors
///
/// `Forbidden` unless `actor` is an admin.
pub fn get_audit(actor: &Principal, limit: usize, conn: &Connection) -> Result<Vec<AuditEntry>> {
    require_admin(actor, "get_audit")?;
    AuditRepo::recent(conn, limit.min(MAX_AUDIT_LIMIT))
}
