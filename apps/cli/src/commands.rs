//! Subcommand implementations.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{debug, info};
use vigil_validator::prelude::*;

use crate::cli::{CheckArgs, SchemaArg};
use crate::config::Settings;

/// Result of `check`: the JSON report plus whether the data was accepted.
#[derive(Debug)]
pub struct CheckReport {
    pub accepted: bool,
    pub body: Value,
}

#[derive(Serialize)]
struct Rejection<'a> {
    valid: bool,
    errors: Vec<&'a FieldError>,
}

/// Reads a rule schema; `.toml` files are TOML, anything else JSON.
pub fn load_schema(path: &Path) -> Result<Schema> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read schema {}", path.display()))?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let schema = if is_toml {
        Schema::from_toml_str(&text)
    } else {
        Schema::from_json_str(&text)
    };
    schema.with_context(|| format!("invalid schema {}", path.display()))
}

fn load_data(path: &Path) -> Result<Value> {
    let text = if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read data from stdin")?;
        text
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("failed to read data {}", path.display()))?
    };
    serde_json::from_str(&text).context("data is not valid JSON")
}

fn build_validator(schema: Schema, settings: &Settings) -> Validator {
    Validator::builder()
        .schema(schema)
        .pattern_cache_capacity(settings.pattern_cache)
        .collaborators(
            Collaborators::new()
                .with_files(InlineFiles)
                .with_dns(SystemResolver),
        )
        .build()
}

/// `vigil check`.
pub fn run_check(args: &CheckArgs, settings: &Settings) -> Result<CheckReport> {
    let validator = build_validator(load_schema(&args.schema.schema)?, settings);
    let data = load_data(&args.data)?;
    if !data.is_object() {
        bail!("data must be a JSON object");
    }

    let target = match args.scene.as_deref() {
        Some(scene) if !validator.has_scene(scene) => bail!("unknown scene `{scene}`"),
        Some(scene) => Target::Scene(scene),
        None => Target::Base,
    };
    let opts = ValidateOptions::new()
        .batch(settings.batch)
        .fail_exception(true)
        .security(settings.security)
        .filter_nulls(settings.filter_nulls);
    debug!(scene = args.scene.as_deref(), ?opts, "checking data");

    match validator.validate(&data, target, &opts) {
        Ok(cleaned) => {
            info!("data accepted");
            Ok(CheckReport {
                accepted: true,
                body: json!({ "valid": true, "data": cleaned }),
            })
        }
        Err(ValidationError::Collaborator(err)) => Err(err).context("validation could not finish"),
        Err(err) => {
            let unexpected;
            let errors = match &err {
                ValidationError::UnexpectedField { field } => {
                    unexpected = FieldError::new(field.as_str(), err.to_string());
                    vec![&unexpected]
                }
                other => other.field_errors(),
            };
            info!(failures = errors.len(), "data rejected");
            Ok(CheckReport {
                accepted: false,
                body: serde_json::to_value(Rejection {
                    valid: false,
                    errors,
                })?,
            })
        }
    }
}

/// `vigil scenes`: every scene with the fields it covers.
pub fn run_scenes(args: &SchemaArg) -> Result<Value> {
    let validator = build_validator(load_schema(&args.schema)?, &Settings::default());
    let scenes: Map<String, Value> = validator
        .scene_names()
        .map(|name| (name.to_owned(), json!(validator.scene_fields(name))))
        .collect();
    Ok(Value::Object(scenes))
}
