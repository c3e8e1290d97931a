use std::collections::HashSet;

use replique_core::domain::options::OptionLabel;
use replique_core::{Catalog, PreferenceHint, Product};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::guardrails::{GuardrailDecision, GuardrailIntent, GuardrailPolicy, PreferenceField};
use crate::llm::{LlmClient, LlmPrompt};

pub const FALLBACK_MESSAGE: &str = "I'm having a little trouble thinking clearly right now. \
Feel free to browse our categories above!";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RecommendationError {
    #[error("recommender transport failure: {0}")]
    Transport(String),
    #[error("recommender returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("recommender returned an empty response")]
    EmptyResponse,
    #[error("recommender response could not be decoded: {0}")]
    Decode(String),
    #[error("recommender misconfigured: {0}")]
    Configuration(String),
}

/// Compact view of a product as the model sees it. Prices are never included.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSummaryEntry {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub colors: Vec<String>,
    pub materials: Vec<String>,
}

impl From<&Product> for CatalogSummaryEntry {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.0.clone(),
            name: product.name.clone(),
            category: product.category.label().to_string(),
            description: product.description.clone(),
            colors: product.available_colors.iter().map(|c| c.label().to_string()).collect(),
            materials: product.available_materials.iter().map(|m| m.label().to_string()).collect(),
        }
    }
}

impl CatalogSummaryEntry {
    pub fn summary_line(&self) -> String {
        format!(
            "ID: {}, Name: {}, Category: {}, Desc: {}, Colors: {}, Materials: {}",
            self.id,
            self.name,
            self.category,
            self.description,
            self.colors.join(", "),
            self.materials.join(", ")
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub message: String,
    pub catalog: Vec<CatalogSummaryEntry>,
}

impl RecommendationRequest {
    pub fn new(message: impl Into<String>, catalog: &Catalog) -> Self {
        Self {
            message: message.into(),
            catalog: catalog.products().iter().map(CatalogSummaryEntry::from).collect(),
        }
    }

    pub fn system_instruction(&self) -> String {
        let summary =
            self.catalog.iter().map(CatalogSummaryEntry::summary_line).collect::<Vec<_>>();
        format!(
            "You are 'Replique Bot', a friendly sales assistant for Replique Crafts, a DIY \
furniture store.

We only sell the pre-designed templates listed below. We never design furniture from scratch.

CATALOG:
{catalog}

INSTRUCTIONS:
1. Work out what the shopper is looking for.
2. Recommend matching templates from the catalog by their ID.
3. Note any COLOR (e.g. black, white, walnut) or MATERIAL (e.g. plywood, pine) preference.
4. If we do not offer exactly what they ask for, explain the closest thing we DO offer.
5. For custom shapes or items outside the catalog, explain politely that we only offer the \
templates above, with adjustable material and dimensions.
6. Never quote prices.
7. Reply in JSON with a friendly 'message', an array 'recommendedProductIds' and optional \
'preferences' with 'color' and 'material'.",
            catalog = summary.join("\n")
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub message: String,
    #[serde(default)]
    pub recommended_product_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<PreferenceHint>,
}

impl RecommendationResponse {
    pub fn fallback() -> Self {
        Self {
            message: FALLBACK_MESSAGE.to_string(),
            recommended_product_ids: Vec::new(),
            preferences: None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.message == FALLBACK_MESSAGE && self.recommended_product_ids.is_empty()
    }

    /// Hint for seeding a configurator session, when the model detected anything usable.
    pub fn preference_hint(&self) -> Option<PreferenceHint> {
        self.preferences.clone().filter(|hint| !hint.is_empty())
    }
}

pub struct Recommender<C> {
    client: C,
    policy: GuardrailPolicy,
}

impl<C: LlmClient> Recommender<C> {
    pub fn new(client: C) -> Self {
        Self { client, policy: GuardrailPolicy::default() }
    }

    pub fn with_policy(client: C, policy: GuardrailPolicy) -> Self {
        Self { client, policy }
    }

    /// Never fails: any model or decoding problem yields the fallback reply.
    pub async fn recommend(&self, request: &RecommendationRequest) -> RecommendationResponse {
        match self.try_recommend(request).await {
            Ok(response) => {
                info!(
                    event_name = "recommender.answered",
                    recommended = response.recommended_product_ids.len(),
                    has_preferences = response.preferences.is_some(),
                    "recommendation produced"
                );
                response
            }
            Err(error) => {
                warn!(
                    event_name = "recommender.fallback",
                    error = %error,
                    "recommender failed, serving fallback reply"
                );
                RecommendationResponse::fallback()
            }
        }
    }

    pub async fn try_recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResponse, RecommendationError> {
        let system_instruction = request.system_instruction();
        let prompt =
            LlmPrompt { system_instruction: &system_instruction, user_message: &request.message };
        let raw = self.client.complete(&prompt).await?;
        let response = decode_response(&raw)?;
        Ok(self.screen(response, &request.catalog))
    }

    fn screen(
        &self,
        response: RecommendationResponse,
        catalog: &[CatalogSummaryEntry],
    ) -> RecommendationResponse {
        let known: HashSet<&str> = catalog.iter().map(|entry| entry.id.as_str()).collect();

        let mut recommended: Vec<String> = Vec::new();
        for product_id in response.recommended_product_ids {
            let product_id = product_id.trim().to_string();
            if recommended.contains(&product_id) {
                continue;
            }
            let admitted = self.admits(&GuardrailIntent::RecommendProduct {
                product_id: &product_id,
                in_catalog: known.contains(product_id.as_str()),
                already_recommended: recommended.len(),
            });
            if admitted {
                recommended.push(product_id);
            }
        }

        let preferences = response.preferences.and_then(|hint| {
            let hint = PreferenceHint {
                color: self.screen_preference(PreferenceField::Color, hint.color),
                material: self.screen_preference(PreferenceField::Material, hint.material),
            };
            (!hint.is_empty()).then_some(hint)
        });

        RecommendationResponse {
            message: response.message,
            recommended_product_ids: recommended,
            preferences,
        }
    }

    fn screen_preference(&self, field: PreferenceField, value: Option<String>) -> Option<String> {
        let value = value?;
        self.admits(&GuardrailIntent::SeedPreference { field, value: &value })
            .then(|| value.trim().to_string())
    }

    fn admits(&self, intent: &GuardrailIntent<'_>) -> bool {
        let decision = self.policy.evaluate(intent);
        if let GuardrailDecision::Deny { reason_code } = &decision {
            debug!(
                event_name = "recommender.output_dropped",
                action = %intent.action_key(),
                intent = ?intent,
                reason_code = *reason_code,
                "model output dropped"
            );
        }
        decision.is_allowed()
    }
}

/// Strict decode of the model's JSON reply. A missing or blank message counts as undecodable.
pub fn decode_response(raw: &str) -> Result<RecommendationResponse, RecommendationError> {
    let body = strip_code_fence(raw.trim());
    if body.is_empty() {
        return Err(RecommendationError::EmptyResponse);
    }

    let response: RecommendationResponse = serde_json::from_str(body)
        .map_err(|error| RecommendationError::Decode(error.to_string()))?;
    if response.message.trim().is_empty() {
        return Err(RecommendationError::Decode("response carried no message".to_string()));
    }
    Ok(response)
}

fn strip_code_fence(raw: &str) -> &str {
    let Some(inner) = raw.strip_prefix("```") else {
        return raw;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
