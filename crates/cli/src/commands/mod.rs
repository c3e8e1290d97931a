pub mod cart;
pub mod config;
pub mod doctor;
pub mod migrate;
pub mod price;
pub mod recommend;
pub mod seed;

use replique_core::config::{AppConfig, LoadOptions};
use replique_core::{ApplicationError, Catalog};
use replique_db::{connect_with_settings, load_catalog, migrations, DbPool, SqlProductRepository};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with_data(command, message, None)
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// A command that stopped early, with the class and exit code it reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFailure {
    pub error_class: &'static str,
    pub message: String,
    pub exit_code: u8,
}

impl CommandFailure {
    pub fn new(error_class: &'static str, message: impl Into<String>, exit_code: u8) -> Self {
        Self { error_class, message: message.into(), exit_code }
    }

    pub fn into_result(self, command: &str) -> CommandResult {
        CommandResult::failure(command, self.error_class, self.message, self.exit_code)
    }
}

impl From<ApplicationError> for CommandFailure {
    fn from(error: ApplicationError) -> Self {
        let error_class = error.error_class();
        let exit_code = match error_class {
            "configuration" => 2,
            "persistence" => 5,
            "product_not_found" => 8,
            "integration" => 9,
            _ => 7,
        };
        Self::new(error_class, error.to_string(), exit_code)
    }
}

/// Successful command body: a human message plus optional structured data.
pub type CommandOutput = (String, Option<Value>);

pub(crate) fn load_config() -> Result<AppConfig, CommandFailure> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandFailure::new("config_validation", format!("configuration issue: {error}"), 2)
    })
}

pub(crate) fn build_runtime() -> Result<tokio::runtime::Runtime, CommandFailure> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandFailure::new(
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            3,
        )
    })
}

/// Loads config, builds a runtime and drives `body` to completion on it.
pub(crate) fn execute<F, Fut>(command: &str, body: F) -> CommandResult
where
    F: FnOnce(AppConfig) -> Fut,
    Fut: std::future::Future<Output = Result<CommandOutput, CommandFailure>>,
{
    let config = match load_config() {
        Ok(config) => config,
        Err(failure) => return failure.into_result(command),
    };
    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err(failure) => return failure.into_result(command),
    };

    match runtime.block_on(body(config)) {
        Ok((message, data)) => CommandResult::success_with_data(command, message, data),
        Err(failure) => failure.into_result(command),
    }
}

/// Connects and applies pending migrations so every command sees the current schema.
pub(crate) async fn open_database(config: &AppConfig) -> Result<DbPool, CommandFailure> {
    let pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(|error| CommandFailure::new("db_connectivity", error.to_string(), 4))?;
    migrations::run_pending(&pool)
        .await
        .map_err(|error| CommandFailure::new("migration", error.to_string(), 5))?;
    Ok(pool)
}

pub(crate) async fn read_catalog(pool: &DbPool) -> Result<Catalog, CommandFailure> {
    let repository = SqlProductRepository::new(pool.clone());
    load_catalog(&repository).await.map_err(|error| ApplicationError::from(error).into())
}

pub(crate) fn to_data<T: Serialize>(value: &T) -> Result<Option<Value>, CommandFailure> {
    serde_json::to_value(value)
        .map(Some)
        .map_err(|error| CommandFailure::new("serialization", error.to_string(), 1))
}
