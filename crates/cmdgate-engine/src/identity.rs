//! Credential lookup and role checks
//!
//! Identity issuance is out of scope for the engine: a credential is an
//! opaque API key whose SHA-256 digest is matched against the principals
//! table. Failures here never mutate anything and never write audit entries.

#![allow(clippy::result_large_err)]

use cmdgate_core::credential::credential_digest;
use cmdgate_core::errors::{ExError, ExErrorKind};
use cmdgate_core::model::Principal;
use cmdgate_store::errors::Result;
use cmdgate_store::PrincipalRepo;
use rusqlite::Connection;

/// Find the principal owning `credential`, if any
pub fn resolve_principal(conn: &Connection, credential: &str) -> Result<Option<Principal>> {
    PrincipalRepo::find_by_credential_digest(conn, &credential_digest(credential))
}

/// Resolve a credential that must be present and known
///
/// # Errors
///
/// `Unauthenticated` when the credential is missing, blank, or unknown.
pub fn authenticate(conn: &Connection, credential: Option<&str>) -> Result<Principal> {
    let credential = credential
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| {
            ExError::new(ExErrorKind::Unauthenticated)
                .with_op("authenticate")
                .with_message("Missing API key")
        })?;

    resolve_principal(conn, credential)?.ok_or_else(|| {
        ExError::new(ExErrorKind::Unauthenticated)
            .with_op("authenticate")
            .with_message("Invalid API key")
    })
}

/// # Errors
///
/// `Forbidden` unless `actor` is an admin.
pub fn require_admin(actor: &Principal, op: &'static str) -> Result<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(ExError::new(ExErrorKind::Forbidden)
            .with_op(op)
            .with_principal_id(&actor.id)
            .with_message("Admin role required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdgate_core::model::Role;
    use cmdgate_store::{db, migrations};

    fn setup() -> Connection {
        let mut conn = db::open_in_memory().unwrap();
        migrations::apply_migrations(&mut conn).unwrap();
        PrincipalRepo::insert(&conn, "alice", Role::Member, 5, &credential_digest("k-alice")).unwrap();
        conn
    }

    #[test]
    fn test_authenticate_known_key() {
        let conn = setup();
        let p = authenticate(&conn, Some("k-alice")).unwrap();
        assert_eq!(p.name, "alice");
    }

    #[test]
    fn test_missing_or_unknown_key_is_unauthenticated() {
        let conn = setup();
        for key in [None, Some(""), Some("   "), Some("k-mallory")] {
            let err = authenticate(&conn, key).unwrap_err();
            assert_eq!(err.kind(), ExErrorKind::Unauthenticated, "key {:?}", key);
        }
    }

    #[test]
    fn test_require_admin() {
        let conn = setup();
        let member = authenticate(&conn, Some("k-alice")).unwrap();
        let err = require_admin(&member, "create_rule").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Forbidden);
        assert_eq!(err.op(), Some("create_rule"));

        let admin = Principal {
            role: Role::Admin,
            ..member
        };
        assert!(require_admin(&admin, "create_rule").is_ok());
    }
}
