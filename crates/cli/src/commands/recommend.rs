use replique_agent::{
    client_from_config, RecommendationRequest, RecommendationResponse, Recommender,
};
use replique_core::config::AppConfig;
use serde_json::json;
use tracing::info;

use crate::commands::{
    execute, open_database, read_catalog, to_data, CommandFailure, CommandOutput, CommandResult,
};

pub fn run(text: Vec<String>) -> CommandResult {
    execute("recommend", |config| recommend(config, text.join(" ")))
}

async fn recommend(config: AppConfig, message: String) -> Result<CommandOutput, CommandFailure> {
    if message.trim().is_empty() {
        return Err(CommandFailure::new(
            "domain_validation",
            "tell the assistant what you are looking for",
            7,
        ));
    }

    if !config.recommender.enabled {
        info!(event_name = "recommender.disabled", "recommender disabled, serving fallback reply");
        let response = RecommendationResponse::fallback();
        return Ok((response.message.clone(), with_source(&response, "fallback")?));
    }

    let client = client_from_config(&config.recommender)
        .map_err(|error| CommandFailure::new("configuration", error.to_string(), 2))?;
    let pool = open_database(&config).await?;
    let catalog = read_catalog(&pool).await;
    pool.close().await;

    let request = RecommendationRequest::new(message, &catalog?);
    let response = Recommender::new(client).recommend(&request).await;
    let source =
        if response.is_fallback() { "fallback" } else { config.recommender.provider.as_str() };
    Ok((response.message.clone(), with_source(&response, source)?))
}

fn with_source(
    response: &RecommendationResponse,
    source: &str,
) -> Result<Option<serde_json::Value>, CommandFailure> {
    let data = to_data(response)?;
    Ok(Some(json!({ "source": source, "response": data })))
}
