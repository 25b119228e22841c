use clap::Args;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::types::EntityKind;
use crate::validation::validate_insert;

#[derive(Args)]
pub struct ValidateArgs {
    #[arg(help = "Entity kind: animal, vaccination, reminder, note, market_listing, gps_route")]
    pub kind: EntityKind,

    #[arg(help = "Payload file (.json, .yaml or .yml)")]
    pub file: PathBuf,
}

/// Parse a payload file, choosing YAML or JSON by extension.
pub fn read_payload(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let value = if is_yaml {
        serde_yaml::from_str(&text)?
    } else {
        serde_json::from_str(&text)?
    };
    Ok(value)
}

pub fn handle(args: ValidateArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let raw = read_payload(&args.file)?;

    match validate_insert(args.kind, &raw) {
        Ok(record) => output_success(
            &output_format,
            &format!("Valid {} payload", record.kind()),
            Some(json!({ "record": record })),
        ),
        Err(errors) => {
            output_error(
                &output_format,
                &format!("Invalid {} payload", args.kind),
                Some(json!(errors.field_messages())),
            )?;
            anyhow::bail!("{} field error(s)", errors.errors.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("agro-{}-{}", uuid::Uuid::new_v4(), name));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn reads_yaml_payloads() {
        let path = temp_file("animal.yaml", "type: vaca\nname: Mimosa\nweight: 450.5\n");
        let raw = read_payload(&path).unwrap();
        assert_eq!(raw["name"], "Mimosa");
        assert!(validate_insert(EntityKind::Animal, &raw).is_ok());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn reads_json_payloads() {
        let path = temp_file("note.json", r#"{ "category": "ordenha" }"#);
        let raw = read_payload(&path).unwrap();
        let err = validate_insert(EntityKind::Note, &raw).unwrap_err();
        assert!(err.has("title"));
        std::fs::remove_file(path).ok();
    }
}
