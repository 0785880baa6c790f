//! Credit ledger
//!
//! Balances live on the `principals` row. The only mutation is `debit`, a
//! single conditional UPDATE: the balance test and the decrement happen in
//! one statement, so concurrent debits cannot both pass a stale check.

use crate::errors::{sqlite_op, Result};
use cmdgate_core::errors::{ExError, ExErrorKind, GateError};
use rusqlite::{Connection, OptionalExtension};

/// Credit ledger over the principals table
pub struct Ledger;

impl Ledger {
    /// Current balance of a principal
    ///
    /// # Errors
    ///
    /// `NotFound` if the principal does not exist.
    pub fn get_balance(conn: &Connection, principal_id: &str) -> Result<i64> {
        conn.query_row(
            "SELECT balance FROM principals WHERE id = ?1",
            [principal_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(sqlite_op("get_balance"))?
        .ok_or_else(|| not_found("get_balance", principal_id))
    }

    /// Atomically take `amount` credits from a principal
    ///
    /// Returns the new balance. Must run on the caller's transaction when it
    /// has to commit together with other writes.
    ///
    /// # Errors
    ///
    /// - `InsufficientCredits` if the balance is below `amount`; nothing changes
    /// - `NotFound` if the principal does not exist
    /// - `InvalidInput` if `amount` is not positive
    pub fn debit(conn: &Connection, principal_id: &str, amount: i64) -> Result<i64> {
        if amount <= 0 {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("debit")
                .with_principal_id(principal_id)
                .with_message(format!("Debit amount must be positive, got {}", amount)));
        }

        let new_balance: Option<i64> = conn
            .query_row(
                "UPDATE principals SET balance = balance - ?1
                 WHERE id = ?2 AND balance >= ?1
                 RETURNING balance",
                rusqlite::params![amount, principal_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(sqlite_op("debit"))?;

        match new_balance {
            Some(balance) => {
                tracing::debug!(principal_id, amount, balance, "Debited credits");
                Ok(balance)
            }
            None => {
                let balance = Self::get_balance(conn, principal_id)?;
                Err(ExError::from(GateError::InsufficientCredits {
                    principal_id: principal_id.to_string(),
                    balance,
                })
                .with_op("debit"))
            }
        }
    }
}

fn not_found(op: &'static str, principal_id: &str) -> ExError {
    ExError::new(ExErrorKind::NotFound)
        .with_op(op)
        .with_principal_id(principal_id)
        .with_message("Principal not found")
}
