//! Append-only audit log

use crate::db::{from_ms, now_ms};
use crate::errors::{column_parse_error, sqlite_op, Result};
use cmdgate_core::model::{AuditAction, AuditEntry};
use rusqlite::{Connection, Row};

/// SQLite repository for the audit log
pub struct AuditRepo;

impl AuditRepo {
    /// Append one entry stamped with the current time
    pub fn append(
        conn: &Connection,
        actor_id: Option<&str>,
        action: AuditAction,
        detail: &str,
    ) -> Result<AuditEntry> {
        let timestamp = now_ms();
        conn.execute(
            "INSERT INTO audit_log (actor_id, action, detail, timestamp) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![actor_id, action.as_str(), detail, timestamp],
        )
        .map_err(sqlite_op("append_audit"))?;

        Ok(AuditEntry {
            id: conn.last_insert_rowid(),
            actor_id: actor_id.map(str::to_string),
            action,
            detail: detail.to_string(),
            timestamp: from_ms(timestamp),
        })
    }

    /// The `limit` most recent entries, newest first
    ///
    /// Entries sharing a timestamp come out in reverse insertion order.
    pub fn recent(conn: &Connection, limit: usize) -> Result<Vec<AuditEntry>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = conn
            .prepare(
                "SELECT id, actor_id, action, detail, timestamp FROM audit_log
                 ORDER BY timestamp DESC, id DESC LIMIT ?1",
            )
            .map_err(sqlite_op("recent_audit"))?;
        let entries = stmt
            .query_map([limit], map_entry)
            .map_err(sqlite_op("recent_audit"))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(sqlite_op("recent_audit"))?;
        Ok(entries)
    }
}

fn map_entry(row: &Row<'_>) -> rusqlite::Result<AuditEntry> {
    let action: String = row.get(2)?;
    Ok(AuditEntry {
        id: row.get(0)?,
        actor_id: row.get(1)?,
        action: action.parse().map_err(|e| column_parse_error(2, e))?,
        detail: row.get(3)?,
        timestamp: from_ms(row.get(4)?),
    })
}
