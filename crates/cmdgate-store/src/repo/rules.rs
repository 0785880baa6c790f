//! Rule persistence
//!
//! Rules are insert-only. Each insert bumps `rule_set_state.revision` in the
//! same statement batch so compiled caches can tell their snapshot is stale.

use crate::db::{from_ms, now_ms};
use crate::errors::{column_parse_error, sqlite_op, Result};
use cmdgate_core::model::{Rule, RuleAction};
use rusqlite::{Connection, Row};

/// SQLite repository for policy rules
pub struct RuleRepo;

impl RuleRepo {
    /// Append a rule at the end of the evaluation order
    ///
    /// The pattern is stored as given; callers validate it first. Run inside
    /// a transaction so the rule and the revision bump land together.
    pub fn insert(
        conn: &Connection,
        pattern: &str,
        action: RuleAction,
        created_by: Option<&str>,
    ) -> Result<Rule> {
        let id = uuid::Uuid::now_v7().to_string();
        let created_at = now_ms();

        conn.execute(
            "INSERT INTO rules (id, pattern, action, created_by, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![id, pattern, action.as_str(), created_by, created_at],
        )
        .map_err(sqlite_op("insert_rule"))?;
        let position = conn.last_insert_rowid();

        conn.execute(
            "UPDATE rule_set_state SET revision = revision + 1 WHERE id = 1",
            [],
        )
        .map_err(sqlite_op("bump_rule_revision"))?;

        tracing::debug!(rule_id = %id, position, "Inserted rule");

        Ok(Rule {
            id,
            position,
            pattern: pattern.to_string(),
            action,
            created_by: created_by.map(str::to_string),
            created_at: from_ms(created_at),
        })
    }

    /// All rules in evaluation order
    pub fn list(conn: &Connection) -> Result<Vec<Rule>> {
        let mut stmt = conn
            .prepare(
                "SELECT id, position, pattern, action, created_by, created_at
                 FROM rules ORDER BY position",
            )
            .map_err(sqlite_op("list_rules"))?;
        let rules = stmt
            .query_map([], map_rule)
            .map_err(sqlite_op("list_rules"))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(sqlite_op("list_rules"))?;
        Ok(rules)
    }

    pub fn count(conn: &Connection) -> Result<i64> {
        conn.query_row("SELECT COUNT(*) FROM rules", [], |row| row.get(0))
            .map_err(sqlite_op("count_rules"))
    }

    /// Revision of the rule set; changes whenever a rule is added
    pub fn revision(conn: &Connection) -> Result<i64> {
        conn.query_row(
            "SELECT revision FROM rule_set_state WHERE id = 1",
            [],
            |row| row.get(0),
        )
        .map_err(sqlite_op("rule_revision"))
    }
}

fn map_rule(row: &Row<'_>) -> rusqlite::Result<Rule> {
    let action: String = row.get(3)?;
    Ok(Rule {
        id: row.get(0)?,
        position: row.get(1)?,
        pattern: row.get(2)?,
        action: action.parse().map_err(|e| column_parse_error(3, e))?,
        created_by: row.get(4)?,
        created_at: from_ms(row.get(5)?),
    })
}
