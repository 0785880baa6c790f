//! Opening and provisioning a gateway database

#![allow(clippy::result_large_err)]

use cmdgate_core::{log_op_end, log_op_error, log_op_start};
use cmdgate_store::errors::Result;
use cmdgate_store::{db, migrations, BootstrapReport};
use rusqlite::Connection;
use std::path::Path;

/// Open the database at `path` and bring its schema up to date
pub fn open_gateway(path: &Path) -> Result<Connection> {
    let mut conn = db::open(path)?;
    migrations::apply_migrations(&mut conn)?;
    Ok(conn)
}

/// Ensure the admin principal and default rules exist
///
/// Idempotent. See `cmdgate_store::bootstrap` for how the admin key is chosen.
pub fn bootstrap_gateway(
    conn: &mut Connection,
    admin_api_key: Option<&str>,
) -> Result<BootstrapReport> {
    log_op_start!("bootstrap");
    let start = std::time::Instant::now();

    let report = cmdgate_store::bootstrap(conn, admin_api_key).map_err(|e| {
        log_op_error!(
            "bootstrap",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "bootstrap",
        duration_ms = start.elapsed().as_millis() as u64,
        admin_created = report.admin_created,
        rules_seeded = report.rules_seeded
    );

    Ok(report)
}
