//! Rule administration

use super::{print_json, unexpected, Context};
use clap::{Args, Subcommand};
use cmdgate_core::model::RuleAction;
use cmdgate_engine::{EngineCommand, EngineCommandResult};

#[derive(Debug, Args)]
pub struct RuleArgs {
    #[command(subcommand)]
    pub command: RuleCommand,
}

#[derive(Debug, Subcommand)]
pub enum RuleCommand {
    /// Append a rule (admin only)
    Add(AddArgs),
    /// List rules in evaluation order
    List,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Regular expression searched within the command text
    #[arg(long)]
    pub pattern: String,

    /// auto-accept or auto-reject
    #[arg(long)]
    pub action: RuleAction,
}

pub fn execute(ctx: &Context, args: RuleArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        RuleCommand::Add(add) => {
            let result = ctx.dispatch(EngineCommand::CreateRule {
                pattern: add.pattern,
                action: add.action,
            })?;
            let EngineCommandResult::RuleCreated(rule) = result else {
                return Err(unexpected(result));
            };
            print_json(&rule)
        }
        RuleCommand::List => {
            let result = ctx.dispatch(EngineCommand::ListRules)?;
            let EngineCommandResult::Rules(rules) = result else {
                return Err(unexpected(result));
            };
            print_json(&rules)
        }
    }
}
