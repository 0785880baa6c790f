//! Command record persistence

use crate::db::from_ms;
use crate::errors::{column_parse_error, sqlite_op, Result};
use cmdgate_core::model::CommandRecord;
use rusqlite::{Connection, Row};

const COMMAND_COLUMNS: &str = "id, principal_id, command_text, status, result, created_at";

/// SQLite repository for command records
pub struct CommandRepo;

impl CommandRepo {
    /// Write a command record in its final state
    pub fn insert(conn: &Connection, record: &CommandRecord) -> Result<()> {
        conn.execute(
            "INSERT INTO commands (id, principal_id, command_text, status, result, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                record.id,
                record.principal_id,
                record.command_text,
                record.status.as_str(),
                record.result,
                record.created_at.timestamp_millis(),
            ],
        )
        .map_err(sqlite_op("insert_command"))?;

        tracing::debug!(command_id = %record.id, status = %record.status, "Inserted command");

        Ok(())
    }

    /// A principal's commands, newest first
    pub fn list_for_principal(conn: &Connection, principal_id: &str) -> Result<Vec<CommandRecord>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM commands WHERE principal_id = ?1
                 ORDER BY created_at DESC, rowid DESC",
                COMMAND_COLUMNS
            ))
            .map_err(sqlite_op("list_commands"))?;
        let records = stmt
            .query_map([principal_id], map_command)
            .map_err(sqlite_op("list_commands"))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(sqlite_op("list_commands"))?;
        Ok(records)
    }
}

fn map_command(row: &Row<'_>) -> rusqlite::Result<CommandRecord> {
    let status: String = row.get(3)?;
    Ok(CommandRecord {
        id: row.get(0)?,
        principal_id: row.get(1)?,
        command_text: row.get(2)?,
        status: status.parse().map_err(|e| column_parse_error(3, e))?,
        result: row.get(4)?,
        created_at: from_ms(row.get(5)?),
    })
}
