use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, PgStore};

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
            if let Some(data) = data {
                println!("{}", serde_json::to_string_pretty(&data)?);
            }
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    details: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(details) = details {
                response["details"] = details;
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
            if let Some(Value::Object(map)) = details {
                for (field, problem) in map {
                    eprintln!("  {}: {}", field, problem.as_str().unwrap_or_default());
                }
            }
        }
    }
    Ok(())
}

/// PostgreSQL store from the environment's DATABASE_URL
pub async fn connect_store(config: &AppConfig) -> anyhow::Result<PgStore> {
    if config.database.url.is_none() {
        anyhow::bail!("DATABASE_URL is required for this command");
    }
    let pool = DatabaseManager::connect(&config.database).await?;
    Ok(PgStore::new(pool))
}
