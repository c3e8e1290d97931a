use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use replique_core::config::AppConfig;
use secrecy::ExposeSecret;
use serde::Serialize;
use toml::Value;

use crate::commands::{load_config, to_data, CommandResult};

#[derive(Debug, Serialize)]
struct ConfigEntry {
    key: &'static str,
    value: String,
    source: String,
}

pub fn run() -> CommandResult {
    let config = match load_config() {
        Ok(config) => config,
        Err(failure) => return failure.into_result("config"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let entries = effective_values(&config)
        .into_iter()
        .map(|(key, value, env_keys)| ConfigEntry {
            key,
            value,
            source: field_source(
                key,
                env_keys,
                config_file_doc.as_ref(),
                config_file_path.as_deref(),
            ),
        })
        .collect::<Vec<_>>();

    let mut lines =
        vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(entries.iter().map(render_line));

    match to_data(&entries) {
        Ok(data) => CommandResult::success_with_data("config", lines.join("\n"), data),
        Err(failure) => failure.into_result("config"),
    }
}

type Entry = (&'static str, String, &'static [&'static str]);

fn entry(key: &'static str, value: String, env_keys: &'static [&'static str]) -> Entry {
    (key, value, env_keys)
}

/// Every reported key with its display value and the env vars that can set it, in order of
/// preference. Secrets are redacted here.
fn effective_values(config: &AppConfig) -> Vec<Entry> {
    let recommender = &config.recommender;
    vec![
        entry("database.url", config.database.url.clone(), &["REPLIQUE_DATABASE_URL"]),
        entry(
            "database.max_connections",
            config.database.max_connections.to_string(),
            &["REPLIQUE_DATABASE_MAX_CONNECTIONS"],
        ),
        entry(
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            &["REPLIQUE_DATABASE_TIMEOUT_SECS"],
        ),
        entry(
            "pricing.assembly_fee",
            config.pricing.assembly_fee.to_string(),
            &["REPLIQUE_PRICING_ASSEMBLY_FEE"],
        ),
        entry(
            "pricing.delivery_fee",
            config.pricing.delivery_fee.to_string(),
            &["REPLIQUE_PRICING_DELIVERY_FEE"],
        ),
        entry(
            "cart.snapshot_slot",
            config.cart.snapshot_slot.clone(),
            &["REPLIQUE_CART_SNAPSHOT_SLOT"],
        ),
        entry(
            "recommender.enabled",
            recommender.enabled.to_string(),
            &["REPLIQUE_RECOMMENDER_ENABLED"],
        ),
        entry(
            "recommender.provider",
            recommender.provider.as_str().to_string(),
            &["REPLIQUE_RECOMMENDER_PROVIDER"],
        ),
        entry("recommender.model", recommender.model.clone(), &["REPLIQUE_RECOMMENDER_MODEL"]),
        entry(
            "recommender.base_url",
            recommender.base_url.clone().unwrap_or_else(|| "<unset>".to_string()),
            &["REPLIQUE_RECOMMENDER_BASE_URL"],
        ),
        entry(
            "recommender.api_key",
            recommender
                .api_key
                .as_ref()
                .map(|key| redact_secret(key.expose_secret()))
                .unwrap_or_else(|| "<unset>".to_string()),
            &["REPLIQUE_RECOMMENDER_API_KEY", "GEMINI_API_KEY"],
        ),
        entry(
            "recommender.timeout_secs",
            recommender.timeout_secs.to_string(),
            &["REPLIQUE_RECOMMENDER_TIMEOUT_SECS"],
        ),
        entry(
            "logging.level",
            config.logging.level.clone(),
            &["REPLIQUE_LOGGING_LEVEL", "REPLIQUE_LOG_LEVEL"],
        ),
        entry(
            "logging.format",
            format!("{:?}", config.logging.format).to_lowercase(),
            &["REPLIQUE_LOGGING_FORMAT", "REPLIQUE_LOG_FORMAT"],
        ),
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("replique.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/replique.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(entry: &ConfigEntry) -> String {
    format!("- {} = {} (source: {})", entry.key, entry.value, entry.source)
}

/// Keeps a short, non-secret prefix so operators can tell keys apart.
fn redact_secret(secret: &str) -> String {
    let trimmed = secret.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    match trimmed.get(..4) {
        Some(prefix) if trimmed.len() > 12 => format!("{prefix}***"),
        _ => "<redacted>".to_string(),
    }
}
