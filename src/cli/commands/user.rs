use chrono::NaiveDate;
use clap::Subcommand;
use uuid::Uuid;

use crate::cli::utils::{connect_store, output_success};
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::models::UpsertUser;
use crate::database::Store;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a user or refresh an existing one's profile")]
    Upsert {
        #[arg(long, help = "User id (generated when omitted)")]
        id: Option<Uuid>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        profile_image_url: Option<String>,
        #[arg(long, help = "Birth date (YYYY-MM-DD)")]
        birth_date: Option<NaiveDate>,
        #[arg(long, help = "Role on the farm, e.g. produtor")]
        role: Option<String>,
    },

    #[command(about = "Show a user")]
    Show {
        #[arg(help = "User id")]
        id: Uuid,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = connect_store(config()).await?;

    match cmd {
        UserCommands::Upsert {
            id,
            email,
            first_name,
            last_name,
            profile_image_url,
            birth_date,
            role,
        } => {
            let user = store
                .upsert_user(UpsertUser {
                    id: id.unwrap_or_else(Uuid::new_v4),
                    email,
                    first_name,
                    last_name,
                    profile_image_url,
                    birth_date,
                    role,
                })
                .await?;
            output_success(
                &output_format,
                &format!("User {} saved", user.id),
                Some(serde_json::json!({ "user": user })),
            )
        }
        UserCommands::Show { id } => match store.get_user(id).await? {
            Some(user) => output_success(
                &output_format,
                &format!("User {}", user.id),
                Some(serde_json::json!({ "user": user })),
            ),
            None => anyhow::bail!("User {} not found", id),
        },
    }
}
