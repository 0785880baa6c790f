//! Read-only queries: credits, history, audit

use super::{print_json, unexpected, Context};
use clap::Args;
use cmdgate_engine::{EngineCommand, EngineCommandResult};

#[derive(Debug, Args)]
pub struct AuditArgs {
    /// Number of entries (default from configuration)
    #[arg(long)]
    pub limit: Option<usize>,
}

pub fn credits(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    match ctx.dispatch(EngineCommand::GetCredits)? {
        EngineCommandResult::Credits(credits) => {
            print_json(&serde_json::json!({ "credits": credits }))
        }
        other => Err(unexpected(other)),
    }
}

pub fn history(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    match ctx.dispatch(EngineCommand::GetHistory)? {
        EngineCommandResult::History(records) => print_json(&records),
        other => Err(unexpected(other)),
    }
}

pub fn audit(ctx: &Context, args: AuditArgs) -> Result<(), Box<dyn std::error::Error>> {
    let limit = args.limit.unwrap_or(ctx.config.audit_limit);
    match ctx.dispatch(EngineCommand::GetAudit { limit })? {
        EngineCommandResult::Audit(entries) => print_json(&entries),
        other => Err(unexpected(other)),
    }
}
