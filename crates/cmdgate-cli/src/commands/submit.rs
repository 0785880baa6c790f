//! Command submission

use super::{print_json, unexpected, Context};
use clap::Args;
use cmdgate_engine::{EngineCommand, EngineCommandResult};

#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// Command text, passed to the execution backend unchanged
    pub text: String,
}

/// Prints the command record; a rejection also exits non-zero
pub fn execute(ctx: &Context, args: SubmitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let result = ctx.dispatch(EngineCommand::Submit { text: args.text })?;
    let EngineCommandResult::Submitted(outcome) = result else {
        return Err(unexpected(result));
    };

    print_json(outcome.record())?;
    outcome.into_result()?;
    Ok(())
}
