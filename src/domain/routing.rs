//! Routing request and decision types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::RoutingError;
use super::metric::ChainMetric;
use super::ranking::Preference;

/// A user's request for a chain recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingRequest {
    /// Free-form label such as "simple_transfer". Not interpreted.
    pub transaction_type: String,
    /// USD value of the transaction. Validated but not used for ranking.
    pub amount_usd: f64,
    /// Raw preference text, parsed by [`RoutingRequest::preference`].
    #[serde(default = "default_preference")]
    pub user_preference: String,
}

fn default_preference() -> String {
    Preference::Cheapest.as_str().to_string()
}

impl RoutingRequest {
    pub fn new(
        transaction_type: impl Into<String>,
        amount_usd: f64,
        user_preference: impl Into<String>,
    ) -> Self {
        Self {
            transaction_type: transaction_type.into(),
            amount_usd,
            user_preference: user_preference.into(),
        }
    }

    /// Parse the preference and check the amount.
    ///
    /// # Errors
    /// `InvalidPreference` for unknown preferences, `InvalidRequest` when
    /// `amount_usd` is not a positive finite number.
    pub fn preference(&self) -> Result<Preference, RoutingError> {
        let preference = self.user_preference.parse::<Preference>()?;

        if !(self.amount_usd.is_finite() && self.amount_usd > 0.0) {
            return Err(RoutingError::InvalidRequest(format!(
                "amount_usd must be positive, got {}",
                self.amount_usd
            )));
        }

        Ok(preference)
    }
}

/// Outcome of a successful routing request.
#[derive(Debug, Clone)]
pub struct RoutingDecision {
    /// Correlation id for logs.
    pub request_id: Uuid,
    /// Preference the decision was made under.
    pub preference: Preference,
    /// The recommended chain.
    pub chosen: ChainMetric,
    /// Every successfully collected chain, in registry order.
    pub metrics: Vec<ChainMetric>,
    /// Deterministic one-line reason.
    pub reason: String,
    /// Collaborator rationale or a fixed fallback text.
    pub explanation: String,
    /// When the decision was computed.
    pub decided_at: DateTime<Utc>,
}

/// Reason text for a chosen chain.
pub fn decision_reason(preference: Preference, chosen: &ChainMetric) -> String {
    format!(
        "Based on your preference for the {preference} transaction, {} was chosen.",
        chosen.display_name()
    )
}
