//! Database initialisation and bootstrap

use super::{print_json, Context};
use clap::Args;
use cmdgate_engine::bootstrap_gateway;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Key for the admin principal; generated and printed once if omitted
    #[arg(long, env = "CMDGATE_ADMIN_API_KEY", hide_env_values = true)]
    pub admin_api_key: Option<String>,
}

pub fn execute(ctx: &Context, args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = ctx.open()?;
    let report = bootstrap_gateway(&mut conn, args.admin_api_key.as_deref())?;

    print_json(&serde_json::json!({
        "db_path": ctx.config.db_path.display().to_string(),
        "admin_id": report.admin_id,
        "admin_created": report.admin_created,
        "rules_seeded": report.rules_seeded,
        "admin_api_key": report.generated_api_key.as_ref().map(|k| k.expose()),
    }))
}
