pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "agro")]
#[command(about = "AgroBagual CLI - database, user and payload tooling for the AgroBagual API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply database migrations")]
    Migrate,

    #[command(about = "User management")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Mint a bearer token for a user")]
    Token(commands::token::TokenArgs),

    #[command(about = "Validate a JSON or YAML payload against an insert shape")]
    Validate(commands::validate::ValidateArgs),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, output_format).await,
        Commands::Token(args) => commands::token::handle(args, output_format),
        Commands::Validate(args) => commands::validate::handle(args, output_format),
    }
}
