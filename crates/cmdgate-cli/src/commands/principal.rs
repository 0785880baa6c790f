//! Principal provisioning

use super::{print_json, unexpected, Context};
use clap::{Args, Subcommand};
use cmdgate_core::model::Role;
use cmdgate_engine::{EngineCommand, EngineCommandResult};

#[derive(Debug, Args)]
pub struct PrincipalArgs {
    #[command(subcommand)]
    pub command: PrincipalCommand,
}

#[derive(Debug, Subcommand)]
pub enum PrincipalCommand {
    /// Create a principal and print its API key (shown only once)
    Create(CreateArgs),
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub name: String,

    /// admin or member
    #[arg(long, default_value = "member")]
    pub role: Role,

    /// Starting credits (default 100)
    #[arg(long)]
    pub credits: Option<i64>,
}

pub fn execute(ctx: &Context, args: PrincipalArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        PrincipalCommand::Create(create) => {
            let result = ctx.dispatch(EngineCommand::CreatePrincipal {
                name: create.name,
                role: create.role,
                credits: create.credits,
            })?;
            let EngineCommandResult::PrincipalCreated(provisioned) = result else {
                return Err(unexpected(result));
            };
            print_json(&serde_json::json!({
                "principal": provisioned.principal,
                "api_key": provisioned.api_key.expose(),
            }))
        }
    }
}
