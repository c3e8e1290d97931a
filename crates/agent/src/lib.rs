//! Recommender collaborator for the storefront.
//!
//! Turns a shopper's free-text request into a short reply, a list of catalog product ids and
//! an optional color/material preference hint. The hint is only ever used to seed a
//! configurator session's defaults.
//!
//! # Layout
//!
//! - `llm` - the `LlmClient` seam plus HTTP clients for Gemini and Ollama
//! - `recommender` - request/response contract, catalog prompt, guaranteed fallback
//! - `guardrails` - filters model output down to what the catalog actually offers
//!
//! # Safety Principle
//!
//! The model never prices anything and never sees the cart. Whatever it returns is filtered
//! against the catalog, and any failure degrades to a fixed fallback reply.

pub mod guardrails;
pub mod llm;
pub mod recommender;

pub use guardrails::{GuardrailDecision, GuardrailIntent, GuardrailPolicy};
pub use llm::{client_from_config, GeminiClient, LlmClient, LlmPrompt, OllamaClient};
pub use recommender::{
    CatalogSummaryEntry, RecommendationError, RecommendationRequest, RecommendationResponse,
    Recommender, FALLBACK_MESSAGE,
};
