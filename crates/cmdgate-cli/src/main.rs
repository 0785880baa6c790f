//! cmdgate CLI
//!
//! Command-line front end for the gated command-submission service

use clap::{Parser, Subcommand};
use cmdgate_core::logging_facility::{self, Profile};
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "cmdgate")]
#[command(about = "cmdgate - policy- and credit-gated command submission", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "CMDGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Database file (overrides the configuration)
    #[arg(long, global = true, env = "CMDGATE_DB")]
    db: Option<PathBuf>,

    /// API key of the calling principal
    #[arg(long, global = true, env = "CMDGATE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Logging profile: development, production or test
    #[arg(long, global = true)]
    log_profile: Option<Profile>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create the database, the admin principal and the default rules
    Init(commands::init::InitArgs),
    /// Principal administration
    Principal(commands::principal::PrincipalArgs),
    /// Policy rule administration
    Rule(commands::rule::RuleArgs),
    /// Submit a command for admission and execution
    Submit(commands::submit::SubmitArgs),
    /// Show the caller's remaining credits
    Credits,
    /// Show the caller's command history, newest first
    History,
    /// Show recent audit entries (admin only)
    Audit(commands::query::AuditArgs),
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = commands::Context::load(cli.config.as_deref(), cli.db, cli.api_key)?;
    logging_facility::init(cli.log_profile.unwrap_or(ctx.config.log_profile));

    match cli.command {
        Commands::Init(args) => commands::init::execute(&ctx, args),
        Commands::Principal(args) => commands::principal::execute(&ctx, args),
        Commands::Rule(args) => commands::rule::execute(&ctx, args),
        Commands::Submit(args) => commands::submit::execute(&ctx, args),
        Commands::Credits => commands::query::credits(&ctx),
        Commands::History => commands::query::history(&ctx),
        Commands::Audit(args) => commands::query::audit(&ctx, args),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
