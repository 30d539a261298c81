//! Gemini Explainer - Generative Rationale for Routing Decisions
//!
//! Calls `models/{model}:generateContent` with a prompt built from the
//! finished decision. The prompt carries the data only; the model has
//! no say in which chain was chosen.

use std::fmt::Write as _;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::ExplanationConfig;
use crate::domain::metric::ChainMetric;
use crate::domain::routing::RoutingRequest;
use crate::ports::explainer::{ExplainError, Explainer};

/// `generateContent` request body.
#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// `generateContent` response body (only the fields we read).
#[derive(Debug, Deserialize)]
struct GenerateResponse {
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

/// Gemini REST explainer.
pub struct GeminiExplainer {
    /// Underlying HTTP client.
    http: Client,
    /// API base URL (no trailing slash).
    base_url: String,
    /// Model name, e.g. "gemini-2.0-flash".
    model: String,
    /// API key; `None` means the explainer is unavailable.
    api_key: Option<String>,
}

impl GeminiExplainer {
    /// Create an explainer from the `[explanation]` config section.
    ///
    /// A disabled section or a missing key yields an explainer that
    /// always reports `Unavailable`.
    pub fn new(config: &ExplanationConfig, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let api_key = if config.enabled {
            std::env::var(&config.api_key_env)
                .ok()
                .filter(|key| !key.is_empty())
        } else {
            None
        };

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl Explainer for GeminiExplainer {
    #[instrument(skip_all, fields(model = %self.model, chain = %chosen.chain_id()))]
    async fn explain(
        &self,
        request: &RoutingRequest,
        chosen: &ChainMetric,
        reason: &str,
        metrics: &[ChainMetric],
    ) -> Result<String, ExplainError> {
        let Some(key) = &self.api_key else {
            return Err(ExplainError::Unavailable("API key missing".to_string()));
        };

        let prompt = build_prompt(request, chosen, reason, metrics);
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: &prompt }],
            }],
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let response = self
            .http
            .post(&url)
            .query(&[("key", key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| ExplainError::Unavailable(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExplainError::GenerationError(format!("HTTP {status}")));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ExplainError::GenerationError(format!("malformed response: {e}")))?;

        let text = first_text(parsed)
            .ok_or_else(|| ExplainError::GenerationError("no candidate text".to_string()))?;

        debug!(chars = text.len(), "Explanation generated");
        Ok(text)
    }
}

fn first_text(response: GenerateResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .find_map(|p| {
            p.text
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
        })
}

/// Format a USD fee the way responses do (4 dp, "N/A" when incomparable).
fn fee_text(metric: &ChainMetric) -> String {
    metric
        .estimated_fee_usd
        .usd()
        .map_or_else(|| "N/A".to_string(), |usd| format!("${usd:.4}"))
}

/// Prompt for the text-generation model.
fn build_prompt(
    request: &RoutingRequest,
    chosen: &ChainMetric,
    reason: &str,
    metrics: &[ChainMetric],
) -> String {
    let mut prompt = String::from(
        "You are an expert blockchain financial advisor for a personal finance app. \
         Explain a blockchain routing recommendation in a clear, concise, and helpful way. \
         Highlight why the recommended chain was chosen based on the user's preference and \
         current market data, and briefly mention how the other considered chains compare. \
         Keep the tone professional yet easy to understand. \
         Do not include disclaimers about 'not financial advice'.\n\n",
    );

    let _ = writeln!(
        prompt,
        "User request: transaction_type={}, amount_usd={:.2}, preference={}",
        request.transaction_type, request.amount_usd, request.user_preference
    );
    let _ = writeln!(
        prompt,
        "Recommended chain: {} (reason: {reason})",
        chosen.display_name()
    );
    let _ = writeln!(
        prompt,
        "Recommended chain details: gas_price_gwei={:.2}, estimated_fee_usd={}, \
         avg_block_time_seconds={}, native_token={}, native_token_price_usd={}",
        chosen.gas_price_gwei_equivalent,
        fee_text(chosen),
        chosen.avg_block_time_seconds(),
        chosen.descriptor.native_token_symbol,
        chosen
            .native_token_price_usd
            .map_or_else(|| "N/A".to_string(), |p| format!("{p}")),
    );

    prompt.push_str("Metrics for all considered chains:\n");
    for m in metrics {
        let _ = writeln!(
            prompt,
            "- {}: estimated_fee_usd={}, estimated_fee_gwei={:.2}, avg_block_time_seconds={}",
            m.display_name(),
            fee_text(m),
            m.estimated_fee_gwei,
            m.avg_block_time_seconds()
        );
    }

    prompt.push_str("\nBased on this information, provide a concise explanation (max 150 words):");
    prompt
}
