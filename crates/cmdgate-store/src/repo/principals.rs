//! Principal persistence

use crate::db::{from_ms, now_ms};
use crate::errors::{column_parse_error, from_rusqlite, Result};
use cmdgate_core::errors::{ExError, ExErrorKind};
use cmdgate_core::model::{Principal, Role};
use rusqlite::{Connection, OptionalExtension, Row};

const PRINCIPAL_COLUMNS: &str = "id, name, role, balance, created_at";

/// SQLite repository for principals
pub struct PrincipalRepo;

impl PrincipalRepo {
    /// Insert a new principal
    ///
    /// `credential_digest` must be unique; a collision surfaces as
    /// `Persistence` from the UNIQUE constraint.
    pub fn insert(
        conn: &Connection,
        name: &str,
        role: Role,
        balance: i64,
        credential_digest: &str,
    ) -> Result<Principal> {
        if balance < 0 {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("insert_principal")
                .with_message("Initial balance cannot be negative"));
        }

        let principal = Principal {
            id: uuid::Uuid::now_v7().to_string(),
            name: name.to_string(),
            role,
            balance,
            created_at: from_ms(now_ms()),
        };

        conn.execute(
            "INSERT INTO principals (id, name, credential_digest, role, balance, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                principal.id,
                principal.name,
                credential_digest,
                principal.role.as_str(),
                principal.balance,
                principal.created_at.timestamp_millis(),
            ],
        )
        .map_err(from_rusqlite)?;

        tracing::debug!(principal_id = %principal.id, role = %principal.role, "Inserted principal");

        Ok(principal)
    }

    /// Look up the principal owning a credential digest
    pub fn find_by_credential_digest(
        conn: &Connection,
        credential_digest: &str,
    ) -> Result<Option<Principal>> {
        conn.query_row(
            &format!(
                "SELECT {} FROM principals WHERE credential_digest = ?1",
                PRINCIPAL_COLUMNS
            ),
            [credential_digest],
            map_principal,
        )
        .optional()
        .map_err(from_rusqlite)
    }

    /// The earliest-created admin, if any
    pub fn first_admin(conn: &Connection) -> Result<Option<Principal>> {
        conn.query_row(
            &format!(
                "SELECT {} FROM principals WHERE role = 'admin' ORDER BY created_at, rowid LIMIT 1",
                PRINCIPAL_COLUMNS
            ),
            [],
            map_principal,
        )
        .optional()
        .map_err(from_rusqlite)
    }
}

fn map_principal(row: &Row<'_>) -> rusqlite::Result<Principal> {
    let role: String = row.get(2)?;
    Ok(Principal {
        id: row.get(0)?,
        name: row.get(1)?,
        role: role.parse().map_err(|e| column_parse_error(2, e))?,
        balance: row.get(3)?,
        created_at: from_ms(row.get(4)?),
    })
}
