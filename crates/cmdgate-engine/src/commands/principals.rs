//! Principal provisioning and balance lookup

#![allow(clippy::result_large_err)]

use crate::identity::require_admin;
use cmdgate_core::credential::{credential_digest, generate_api_key};
use cmdgate_core::errors::{ExError, ExErrorKind};
use cmdgate_core::model::{AuditAction, Principal, Role, DEFAULT_CREDITS};
use cmdgate_core::{log_op_end, log_op_error, log_op_start};
use cmdgate_core_types::Sensitive;
use cmdgate_store::errors::{from_rusqlite, Result};
use cmdgate_store::{AuditRepo, Ledger, PrincipalRepo};
use rusqlite::{Connection, TransactionBehavior};

/// A newly created principal and its API key
///
/// The key is not stored anywhere; this is the only time it is available.
#[derive(Debug, Clone)]
pub struct ProvisionedPrincipal {
    pub principal: Principal,
    pub api_key: Sensitive<String>,
}

/// Create a principal with a fresh API key
///
/// `credits` defaults to `DEFAULT_CREDITS`.
///
/// ## Errors
///
/// - `Forbidden`: `actor` is not an admin
/// - `InvalidInput`: blank name or negative credits
pub fn create_principal(
    actor: &Principal,
    name: &str,
    role: Role,
    credits: Option<i64>,
    conn: &mut Connection,
) -> Result<ProvisionedPrincipal> {
    log_op_start!("create_principal", principal_id = %actor.id);
    let start = std::time::Instant::now();

    let provisioned = create_principal_impl(actor, name, role, credits, conn).map_err(|e| {
        log_op_error!(
            "create_principal",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "create_principal",
        duration_ms = start.elapsed().as_millis() as u64,
        created_id = %provisioned.principal.id
    );

    Ok(provisioned)
}

fn create_principal_impl(
    actor: &Principal,
    name: &str,
    role: Role,
    credits: Option<i64>,
    conn: &mut Connection,
) -> Result<ProvisionedPrincipal> {
    require_admin(actor, "create_principal")?;

    let name = name.trim();
    if name.is_empty() {
        return Err(ExError::new(ExErrorKind::InvalidInput)
            .with_op("create_principal")
            .with_message("Principal name must not be empty"));
    }
    let credits = credits.unwrap_or(DEFAULT_CREDITS);

    let api_key = generate_api_key();

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(from_rusqlite)?;
    let principal = PrincipalRepo::insert(
        &tx,
        name,
        role,
        credits,
        &credential_digest(api_key.expose()),
    )?;
    AuditRepo::append(
        &tx,
        Some(&actor.id),
        AuditAction::PrincipalCreated,
        &format!(
            "{} ({}) role={} credits={}",
            principal.name, principal.id, principal.role, principal.balance
        ),
    )?;
    tx.commit().map_err(from_rusqlite)?;

    Ok(ProvisionedPrincipal { principal, api_key })
}

/// Current balance of `principal`, read from the ledger
pub fn get_credits(principal: &Principal, conn: &Connection) -> Result<i64> {
    Ledger::get_balance(conn, &principal.id)
}
