use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::DatabaseManager;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let mut database = config().database.clone();
    if database.url.is_none() {
        anyhow::bail!("DATABASE_URL is required to run migrations");
    }
    // connect() applies migrations when asked to
    database.run_migrations = true;
    DatabaseManager::connect(&database).await?;

    output_success(&output_format, "Migrations applied", None)
}
