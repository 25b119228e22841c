use clap::Args;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::config;

#[derive(Args)]
pub struct TokenArgs {
    #[arg(help = "User id placed in the token subject")]
    pub user_id: Uuid,

    #[arg(long, help = "Lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
    pub hours: Option<u64>,

    #[arg(long, help = "Email claim")]
    pub email: Option<String>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config();
    config.validate()?;

    let hours = args.hours.unwrap_or(config.security.jwt_expiry_hours);
    let claims = Claims::new(args.user_id, args.email, hours);
    let token = generate_jwt(&claims, &config.security.jwt_secret)?;

    match output_format {
        OutputFormat::Json => output_success(
            &output_format,
            "Token issued",
            Some(json!({ "token": token, "expires_at": claims.exp })),
        ),
        OutputFormat::Text => {
            // bare token so it can be captured with $(agro token ...)
            println!("{}", token);
            Ok(())
        }
    }
}
