//! Subcommand implementations
//!
//! Every subcommand prints its result as JSON on stdout.

pub mod init;
pub mod principal;
pub mod query;
pub mod rule;
pub mod submit;

use cmdgate_core::errors::ExError;
use cmdgate_core_types::Sensitive;
use cmdgate_engine::{
    apply_engine_command, authenticate, open_gateway, EngineCommand, EngineCommandResult,
    EngineContext, GatewayConfig, RuleCache,
};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Resolved configuration and caller credential
pub struct Context {
    pub config: GatewayConfig,
    api_key: Option<Sensitive<String>>,
}

impl Context {
    pub fn load(
        config_path: Option<&Path>,
        db: Option<PathBuf>,
        api_key: Option<String>,
    ) -> Result<Self, ExError> {
        let mut config = GatewayConfig::load_or_default(config_path)?;
        if let Some(db) = db {
            config.db_path = db;
        }
        Ok(Self {
            config,
            api_key: api_key.map(Sensitive::new),
        })
    }

    pub fn open(&self) -> Result<Connection, ExError> {
        open_gateway(&self.config.db_path)
    }

    /// Authenticate the caller and run `cmd` on their behalf
    pub fn dispatch(&self, cmd: EngineCommand) -> Result<EngineCommandResult, ExError> {
        let mut conn = self.open()?;
        let actor = authenticate(&conn, self.api_key.as_ref().map(|k| k.expose().as_str()))?;
        let adapter = self.config.execution_adapter();
        let rules = RuleCache::new();

        apply_engine_command(
            cmd,
            &actor,
            EngineContext {
                conn: &mut conn,
                adapter: adapter.as_ref(),
                rules: &rules,
            },
        )
    }
}

pub(crate) fn print_json<T: serde::Serialize + ?Sized>(
    value: &T,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn unexpected(result: EngineCommandResult) -> Box<dyn std::error::Error> {
    format!("unexpected engine result: {:?}", result).into()
}
