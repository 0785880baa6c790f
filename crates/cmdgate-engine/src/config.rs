//! Gateway configuration
//!
//! Read from an optional TOML file. Every field has a default, so an empty
//! file (or no file) is a valid configuration. The CLI layers flags and
//! environment variables on top.

#![allow(clippy::result_large_err)]

use cmdgate_core::errors::{ExError, ExErrorKind};
use cmdgate_core::executor::{ExecutionAdapter, MockExecutionAdapter, TimeoutAdapter};
use cmdgate_core::logging_facility::Profile;
use cmdgate_store::errors::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_DB_PATH: &str = ".cmdgate/gateway.db";
pub const DEFAULT_EXECUTION_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_AUDIT_LIMIT: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    /// SQLite database file
    pub db_path: PathBuf,

    /// Upper bound on one adapter call; 0 disables the bound
    pub execution_timeout_ms: u64,

    /// Entries returned by an audit query when the caller gives no limit
    pub audit_limit: usize,

    pub log_profile: Profile,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            execution_timeout_ms: DEFAULT_EXECUTION_TIMEOUT_MS,
            audit_limit: DEFAULT_AUDIT_LIMIT,
            log_profile: Profile::default(),
        }
    }
}

impl GatewayConfig {
    /// Parse a TOML document
    ///
    /// # Errors
    ///
    /// `Config` if the document is malformed or names an unknown field.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| {
            ExError::new(ExErrorKind::Config)
                .with_op("load_config")
                .with_message(e.to_string())
        })
    }

    /// # Errors
    ///
    /// `Io` if the file cannot be read, `Config` if it does not parse.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ExError::new(ExErrorKind::Io)
                .with_op("load_config")
                .with_message(format!("{}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Load `path` if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn execution_timeout(&self) -> Option<Duration> {
        (self.execution_timeout_ms > 0).then(|| Duration::from_millis(self.execution_timeout_ms))
    }

    /// The mock adapter, bounded by the configured timeout
    pub fn execution_adapter(&self) -> Arc<dyn ExecutionAdapter> {
        let mock: Arc<dyn ExecutionAdapter> = Arc::new(MockExecutionAdapter);
        match self.execution_timeout() {
            Some(timeout) => Arc::new(TimeoutAdapter::new(mock, timeout)),
            None => mock,
        }
    }
}
