use replique_core::config::AppConfig;

use crate::commands::{execute, open_database, CommandFailure, CommandOutput, CommandResult};

pub fn run() -> CommandResult {
    execute("migrate", migrate)
}

async fn migrate(config: AppConfig) -> Result<CommandOutput, CommandFailure> {
    let pool = open_database(&config).await?;
    pool.close().await;
    Ok(("applied pending migrations".to_string(), None))
}
