//! First-run provisioning: an admin principal and the default rule set
//!
//! Runs in a single IMMEDIATE transaction and is safe to repeat. A second
//! run creates nothing new.

use crate::errors::{from_rusqlite, Result};
use crate::repo::{AuditRepo, PrincipalRepo, RuleRepo};
use cmdgate_core::credential::{credential_digest, generate_api_key};
use cmdgate_core::errors::{ExError, ExErrorKind};
use cmdgate_core::model::{AuditAction, Role, RuleAction};
use cmdgate_core::policy;
use cmdgate_core_types::Sensitive;
use rusqlite::{Connection, TransactionBehavior};

/// Credits granted to the bootstrap admin
pub const ADMIN_CREDITS: i64 = 9999;

pub const ADMIN_NAME: &str = "admin";

/// Rules installed on an empty rule table, in evaluation order
pub const DEFAULT_RULES: &[(&str, RuleAction)] = &[
    (r":\(\)\{ :\|:& \};:", RuleAction::AutoReject),
    (r"rm\s+-rf\s+/", RuleAction::AutoReject),
    (r"mkfs\.", RuleAction::AutoReject),
    (r"git\s+(status|log|diff)", RuleAction::AutoAccept),
    (r"^(ls|cat|pwd|echo)", RuleAction::AutoAccept),
];

/// What a bootstrap run did
#[derive(Debug)]
pub struct BootstrapReport {
    pub admin_id: String,

    /// Set only when this run generated the admin key; shown to the operator once
    pub generated_api_key: Option<Sensitive<String>>,

    pub admin_created: bool,

    pub rules_seeded: usize,
}

/// Ensure an admin principal and the default rules exist
///
/// With `admin_api_key`, the admin owning that key is reused or created.
/// Without it, an existing admin is reused; if there is none, a key is
/// generated and returned in the report.
///
/// # Errors
///
/// `InvalidInput` if the supplied key already belongs to a non-admin.
pub fn bootstrap(conn: &mut Connection, admin_api_key: Option<&str>) -> Result<BootstrapReport> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(from_rusqlite)?;

    let mut generated_api_key = None;
    let existing = match admin_api_key {
        Some(key) => PrincipalRepo::find_by_credential_digest(&tx, &credential_digest(key))?,
        None => PrincipalRepo::first_admin(&tx)?,
    };

    let (admin_id, admin_created) = match existing {
        Some(principal) if principal.is_admin() => (principal.id, false),
        Some(principal) => {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("bootstrap")
                .with_principal_id(principal.id)
                .with_message("Supplied admin key belongs to a non-admin principal"));
        }
        None => {
            let key = match admin_api_key {
                Some(key) => key.to_string(),
                None => {
                    let key = generate_api_key();
                    let exposed = key.expose().clone();
                    generated_api_key = Some(key);
                    exposed
                }
            };
            let admin = PrincipalRepo::insert(
                &tx,
                ADMIN_NAME,
                Role::Admin,
                ADMIN_CREDITS,
                &credential_digest(&key),
            )?;
            AuditRepo::append(
                &tx,
                None,
                AuditAction::PrincipalCreated,
                &format!("{} ({}) role=admin credits={}", admin.name, admin.id, ADMIN_CREDITS),
            )?;
            (admin.id, true)
        }
    };

    let mut rules_seeded = 0;
    if RuleRepo::count(&tx)? == 0 {
        for (pattern, action) in DEFAULT_RULES {
            if !policy::validate(pattern) {
                tracing::warn!(pattern = %pattern, "default rule pattern does not compile, not seeding");
                continue;
            }
            let rule = RuleRepo::insert(&tx, pattern, *action, Some(&admin_id))?;
            AuditRepo::append(
                &tx,
                Some(&admin_id),
                AuditAction::RuleCreated,
                &format!("{} {}", rule.action, rule.pattern),
            )?;
            rules_seeded += 1;
        }
    }

    tx.commit().map_err(from_rusqlite)?;

    tracing::debug!(admin_id = %admin_id, admin_created, rules_seeded, "Bootstrap complete");

    Ok(BootstrapReport {
        admin_id,
        generated_api_key,
        admin_created,
        rules_seeded,
    })
}
