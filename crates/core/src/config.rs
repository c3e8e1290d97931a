use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::DEFAULT_SNAPSHOT_SLOT;
use crate::cpq::pricing::{FeeSchedule, DEFAULT_ASSEMBLY_FEE, DEFAULT_DELIVERY_FEE};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub pricing: PricingConfig,
    pub cart: CartConfig,
    pub recommender: RecommenderConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PricingConfig {
    pub assembly_fee: u64,
    pub delivery_fee: u64,
}

impl PricingConfig {
    pub fn fee_schedule(&self) -> FeeSchedule {
        FeeSchedule { assembly_fee: self.assembly_fee, delivery_fee: self.delivery_fee }
    }
}

#[derive(Clone, Debug)]
pub struct CartConfig {
    pub snapshot_slot: String,
}

#[derive(Clone, Debug)]
pub struct RecommenderConfig {
    pub enabled: bool,
    pub provider: RecommenderProvider,
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommenderProvider {
    Gemini,
    Ollama,
}

impl RecommenderProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Ollama => "ollama",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub recommender_enabled: Option<bool>,
    pub recommender_provider: Option<RecommenderProvider>,
    pub recommender_model: Option<String>,
    pub recommender_api_key: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://replique.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            pricing: PricingConfig {
                assembly_fee: DEFAULT_ASSEMBLY_FEE,
                delivery_fee: DEFAULT_DELIVERY_FEE,
            },
            cart: CartConfig { snapshot_slot: DEFAULT_SNAPSHOT_SLOT.to_string() },
            recommender: RecommenderConfig {
                enabled: false,
                provider: RecommenderProvider::Gemini,
                api_key: None,
                base_url: None,
                model: "gemini-2.5-flash".to_string(),
                timeout_secs: 30,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl FromStr for RecommenderProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::Validation(format!(
                "unsupported recommender provider `{other}` (expected gemini|ollama)"
            ))),
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("replique.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(pricing) = patch.pricing {
            if let Some(assembly_fee) = pricing.assembly_fee {
                self.pricing.assembly_fee = assembly_fee;
            }
            if let Some(delivery_fee) = pricing.delivery_fee {
                self.pricing.delivery_fee = delivery_fee;
            }
        }

        if let Some(cart) = patch.cart {
            if let Some(snapshot_slot) = cart.snapshot_slot {
                self.cart.snapshot_slot = snapshot_slot;
            }
        }

        if let Some(recommender) = patch.recommender {
            if let Some(enabled) = recommender.enabled {
                self.recommender.enabled = enabled;
            }
            if let Some(provider) = recommender.provider {
                self.recommender.provider = provider;
            }
            if let Some(api_key) = recommender.api_key {
                self.recommender.api_key = Some(secret_value(api_key));
            }
            if let Some(base_url) = recommender.base_url {
                self.recommender.base_url = Some(base_url);
            }
            if let Some(model) = recommender.model {
                self.recommender.model = model;
            }
            if let Some(timeout_secs) = recommender.timeout_secs {
                self.recommender.timeout_secs = timeout_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("REPLIQUE_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("REPLIQUE_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_env("REPLIQUE_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("REPLIQUE_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_env("REPLIQUE_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("REPLIQUE_PRICING_ASSEMBLY_FEE") {
            self.pricing.assembly_fee = parse_env("REPLIQUE_PRICING_ASSEMBLY_FEE", &value)?;
        }
        if let Some(value) = read_env("REPLIQUE_PRICING_DELIVERY_FEE") {
            self.pricing.delivery_fee = parse_env("REPLIQUE_PRICING_DELIVERY_FEE", &value)?;
        }

        if let Some(value) = read_env("REPLIQUE_CART_SNAPSHOT_SLOT") {
            self.cart.snapshot_slot = value;
        }

        if let Some(value) = read_env("REPLIQUE_RECOMMENDER_ENABLED") {
            self.recommender.enabled = parse_env("REPLIQUE_RECOMMENDER_ENABLED", &value)?;
        }
        if let Some(value) = read_env("REPLIQUE_RECOMMENDER_PROVIDER") {
            self.recommender.provider = value.parse()?;
        }
        // GEMINI_API_KEY is what the storefront's own tooling exports.
        let api_key =
            read_env("REPLIQUE_RECOMMENDER_API_KEY").or_else(|| read_env("GEMINI_API_KEY"));
        if let Some(value) = api_key {
            self.recommender.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("REPLIQUE_RECOMMENDER_BASE_URL") {
            self.recommender.base_url = Some(value);
        }
        if let Some(value) = read_env("REPLIQUE_RECOMMENDER_MODEL") {
            self.recommender.model = value;
        }
        if let Some(value) = read_env("REPLIQUE_RECOMMENDER_TIMEOUT_SECS") {
            self.recommender.timeout_secs =
                parse_env("REPLIQUE_RECOMMENDER_TIMEOUT_SECS", &value)?;
        }

        let log_level =
            read_env("REPLIQUE_LOGGING_LEVEL").or_else(|| read_env("REPLIQUE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("REPLIQUE_LOGGING_FORMAT").or_else(|| read_env("REPLIQUE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(enabled) = overrides.recommender_enabled {
            self.recommender.enabled = enabled;
        }
        if let Some(provider) = overrides.recommender_provider {
            self.recommender.provider = provider;
        }
        if let Some(model) = overrides.recommender_model {
            self.recommender.model = model;
        }
        if let Some(api_key) = overrides.recommender_api_key {
            self.recommender.api_key = Some(secret_value(api_key));
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_cart(&self.cart)?;
        validate_recommender(&self.recommender)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("replique.toml"), PathBuf::from("config/replique.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

/// Expands `${VAR}` references. Every referenced variable must be set.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let end = after_open.find('}').ok_or(ConfigError::UnterminatedInterpolation)?;
        let var = &after_open[..end];
        let value = env::var(var)
            .map_err(|_| ConfigError::MissingEnvInterpolation { var: var.to_string() })?;
        output.push_str(&value);
        rest = &after_open[end + 1..];
    }

    output.push_str(rest);
    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_cart(cart: &CartConfig) -> Result<(), ConfigError> {
    if cart.snapshot_slot.trim().is_empty() {
        return Err(ConfigError::Validation("cart.snapshot_slot must not be blank".to_string()));
    }
    Ok(())
}

fn validate_recommender(recommender: &RecommenderConfig) -> Result<(), ConfigError> {
    if recommender.timeout_secs == 0 || recommender.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "recommender.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if let Some(base_url) = &recommender.base_url {
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "recommender.base_url must start with http:// or https://".to_string(),
            ));
        }
    }

    if !recommender.enabled {
        return Ok(());
    }

    if recommender.model.trim().is_empty() {
        return Err(ConfigError::Validation(
            "recommender.model is required when the recommender is enabled".to_string(),
        ));
    }

    match recommender.provider {
        RecommenderProvider::Gemini => {
            let missing = recommender
                .api_key
                .as_ref()
                .map(|value| value.expose_secret().trim().is_empty())
                .unwrap_or(true);
            if missing {
                return Err(ConfigError::Validation(
                    "recommender.api_key is required for the gemini provider (set \
                     REPLIQUE_RECOMMENDER_API_KEY or GEMINI_API_KEY)"
                        .to_string(),
                ));
            }
        }
        RecommenderProvider::Ollama => {
            let missing =
                recommender.base_url.as_ref().map(|value| value.trim().is_empty()).unwrap_or(true);
            if missing {
                return Err(ConfigError::Validation(
                    "recommender.base_url is required for the ollama provider".to_string(),
                ));
            }
        }
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    pricing: Option<PricingPatch>,
    cart: Option<CartPatch>,
    recommender: Option<RecommenderPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct PricingPatch {
    assembly_fee: Option<u64>,
    delivery_fee: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct CartPatch {
    snapshot_slot: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RecommenderPatch {
    enabled: Option<bool>,
    provider: Option<RecommenderProvider>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{
        interpolate_env_vars, AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat,
        RecommenderProvider,
    };

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_match_storefront_fees_and_slot() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.pricing.assembly_fee == 15_000, "default assembly fee is 15000")?;
        ensure(config.pricing.delivery_fee == 5_000, "default delivery fee is 5000")?;
        ensure(config.cart.snapshot_slot == "replique_cart", "default slot is replique_cart")?;
        ensure(!config.recommender.enabled, "recommender is disabled by default")?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_REPLIQUE_GEMINI_KEY", "key-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("replique.toml");
            fs::write(
                &path,
                r#"
[recommender]
enabled = true
provider = "gemini"
api_key = "${TEST_REPLIQUE_GEMINI_KEY}"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            let api_key = config.recommender.api_key.as_ref().map(|key| key.expose_secret());
            ensure(api_key == Some("key-from-env"), "api key should be loaded from environment")
        })();

        clear_vars(&["TEST_REPLIQUE_GEMINI_KEY"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("REPLIQUE_LOG_LEVEL", "warn");
        env::set_var("REPLIQUE_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )
        })();

        clear_vars(&["REPLIQUE_LOG_LEVEL", "REPLIQUE_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("REPLIQUE_DATABASE_URL", "sqlite://from-env.db");
        env::set_var("REPLIQUE_PRICING_DELIVERY_FEE", "7500");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("replique.toml");
            fs::write(
                &path,
                r#"
[database]
url = "sqlite://from-file.db"

[pricing]
assembly_fee = 20000
delivery_fee = 6000

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    database_url: Some("sqlite://from-override.db".to_string()),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.database.url == "sqlite://from-override.db",
                "override database url should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(config.pricing.assembly_fee == 20_000, "file assembly fee should apply")?;
            ensure(config.pricing.delivery_fee == 7_500, "env delivery fee should beat file")?;
            ensure(
                config.pricing.fee_schedule().delivery_fee == 7_500,
                "fee schedule mirrors pricing section",
            )
        })();

        clear_vars(&["REPLIQUE_DATABASE_URL", "REPLIQUE_PRICING_DELIVERY_FEE"]);
        result
    }

    #[test]
    fn enabled_gemini_without_key_fails_fast() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("REPLIQUE_RECOMMENDER_ENABLED", "true");
        env::remove_var("GEMINI_API_KEY");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("recommender.api_key")
            );
            ensure(has_message, "validation failure should mention recommender.api_key")
        })();

        clear_vars(&["REPLIQUE_RECOMMENDER_ENABLED"]);
        result
    }

    #[test]
    fn ollama_requires_base_url_when_enabled() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let error = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                recommender_enabled: Some(true),
                recommender_provider: Some(RecommenderProvider::Ollama),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .err();

        ensure(
            matches!(
                error,
                Some(ConfigError::Validation(ref message)) if message.contains("base_url")
            ),
            "ollama without base_url should be rejected",
        )
    }

    #[test]
    fn invalid_numeric_env_override_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("REPLIQUE_PRICING_ASSEMBLY_FEE", "-5");
        let result = match AppConfig::load(LoadOptions::default()) {
            Err(ConfigError::InvalidEnvOverride { key, .. }) => {
                ensure(key == "REPLIQUE_PRICING_ASSEMBLY_FEE", "error should name the variable")
            }
            _ => Err("negative fee should be rejected".to_string()),
        };

        clear_vars(&["REPLIQUE_PRICING_ASSEMBLY_FEE"]);
        result
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("REPLIQUE_RECOMMENDER_API_KEY", "gm-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(!debug.contains("gm-secret-value"), "debug output should not contain api key")
        })();

        clear_vars(&["REPLIQUE_RECOMMENDER_API_KEY"]);
        result
    }

    #[test]
    fn interpolation_passes_plain_text_through_and_rejects_open_references() {
        let plain = "slot = \"cart\"";
        assert_eq!(interpolate_env_vars(plain).ok().as_deref(), Some(plain));
        assert!(matches!(
            interpolate_env_vars("api_key = \"${NEVER_CLOSED"),
            Err(ConfigError::UnterminatedInterpolation)
        ));
    }
}
