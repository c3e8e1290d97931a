use std::time::Duration;

use async_trait::async_trait;
use replique_core::config::{RecommenderConfig, RecommenderProvider};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::recommender::RecommendationError;

pub const GEMINI_DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone, Copy, Debug)]
pub struct LlmPrompt<'a> {
    pub system_instruction: &'a str,
    pub user_message: &'a str,
}

/// A text-in, JSON-text-out model endpoint.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &LlmPrompt<'_>) -> Result<String, RecommendationError>;
}

#[async_trait]
impl<T: LlmClient + ?Sized> LlmClient for Box<T> {
    async fn complete(&self, prompt: &LlmPrompt<'_>) -> Result<String, RecommendationError> {
        (**self).complete(prompt).await
    }
}

/// Builds the client named by `recommender.provider`. Callers check `recommender.enabled`.
pub fn client_from_config(
    config: &RecommenderConfig,
) -> Result<Box<dyn LlmClient>, RecommendationError> {
    let timeout = Duration::from_secs(config.timeout_secs);
    match config.provider {
        RecommenderProvider::Gemini => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                RecommendationError::Configuration("gemini requires an api key".to_string())
            })?;
            let client = GeminiClient::new(
                api_key,
                config.base_url.as_deref(),
                config.model.clone(),
                timeout,
            )?;
            Ok(Box::new(client))
        }
        RecommenderProvider::Ollama => {
            let base_url = config.base_url.as_deref().ok_or_else(|| {
                RecommendationError::Configuration("ollama requires a base url".to_string())
            })?;
            Ok(Box::new(OllamaClient::new(base_url, config.model.clone(), timeout)?))
        }
    }
}

fn http_client(timeout: Duration) -> Result<reqwest::Client, RecommendationError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|error| RecommendationError::Transport(error.to_string()))
}

async fn read_success_body(response: reqwest::Response) -> Result<String, RecommendationError> {
    let status = response.status();
    let body =
        response.text().await.map_err(|error| RecommendationError::Transport(error.to_string()))?;
    if !status.is_success() {
        return Err(RecommendationError::Status { status: status.as_u16(), body });
    }
    Ok(body)
}

pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
}

impl GeminiClient {
    pub fn new(
        api_key: SecretString,
        base_url: Option<&str>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RecommendationError> {
        let base_url = base_url.unwrap_or(GEMINI_DEFAULT_BASE_URL).trim_end_matches('/');
        let model = model.into();
        Ok(Self {
            http: http_client(timeout)?,
            endpoint: format!("{base_url}/models/{model}:generateContent"),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, prompt: &LlmPrompt<'_>) -> Result<String, RecommendationError> {
        debug!(event_name = "recommender.gemini.request", endpoint = %self.endpoint);

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&generate_content_body(prompt))
            .send()
            .await
            .map_err(|error| RecommendationError::Transport(error.to_string()))?;
        let body = read_success_body(response).await?;

        let decoded: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|error| RecommendationError::Decode(error.to_string()))?;
        decoded.text().ok_or(RecommendationError::EmptyResponse)
    }
}

/// `generateContent` payload asking for JSON constrained to the recommendation shape.
pub fn generate_content_body(prompt: &LlmPrompt<'_>) -> Value {
    json!({
        "systemInstruction": { "parts": [{ "text": prompt.system_instruction }] },
        "contents": [{ "role": "user", "parts": [{ "text": prompt.user_message }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "message": { "type": "STRING" },
                    "recommendedProductIds": {
                        "type": "ARRAY",
                        "items": { "type": "STRING" }
                    },
                    "preferences": {
                        "type": "OBJECT",
                        "nullable": true,
                        "properties": {
                            "color": {
                                "type": "STRING",
                                "description": "Preferred color inferred from the request."
                            },
                            "material": {
                                "type": "STRING",
                                "description": "Preferred material inferred from the request."
                            }
                        }
                    }
                }
            }
        }
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text parts of the first candidate, joined. `None` when there is nothing to read.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().filter_map(|part| part.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

pub struct OllamaClient {
    http: reqwest::Client,
    generate_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    format: &'static str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
}

impl OllamaClient {
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RecommendationError> {
        Ok(Self {
            http: http_client(timeout)?,
            generate_url: format!("{}/api/generate", base_url.trim_end_matches('/')),
            model: model.into(),
        })
    }

    pub fn generate_url(&self) -> &str {
        &self.generate_url
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn complete(&self, prompt: &LlmPrompt<'_>) -> Result<String, RecommendationError> {
        debug!(event_name = "recommender.ollama.request", endpoint = %self.generate_url);

        let request = OllamaRequest {
            model: &self.model,
            prompt: prompt.user_message,
            system: prompt.system_instruction,
            format: "json",
            stream: false,
        };
        let response = self
            .http
            .post(&self.generate_url)
            .json(&request)
            .send()
            .await
            .map_err(|error| RecommendationError::Transport(error.to_string()))?;
        let body = read_success_body(response).await?;

        let decoded: OllamaResponse = serde_json::from_str(&body)
            .map_err(|error| RecommendationError::Decode(error.to_string()))?;
        if decoded.response.trim().is_empty() {
            return Err(RecommendationError::EmptyResponse);
        }
        Ok(decoded.response)
    }
}
