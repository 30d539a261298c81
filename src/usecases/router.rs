//! Routing Service - Multi-source Aggregation and Ranking
//!
//! The request-scoped pipeline behind `route`:
//! 1. Parse the preference and validate the request (no I/O on failure)
//! 2. Fan out: one task per chain for gas prices, one batched price fetch
//! 3. Barrier: wait for every task to finish, fail or time out
//! 4. Normalize fees, rank, build the reason
//! 5. Ask the explainer for a rationale (bounded, never fatal)
//!
//! Collection tasks send their results back as values. Failed chains
//! are logged and dropped; they never reach the ranking engine.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::task::JoinSet;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::chain::ChainRegistry;
use crate::domain::cost::CostNormalizer;
use crate::domain::error::RoutingError;
use crate::domain::metric::{ChainMetric, TokenPrices};
use crate::domain::ranking::RankingEngine;
use crate::domain::routing::{decision_reason, RoutingDecision, RoutingRequest};
use crate::ports::explainer::Explainer;
use crate::ports::metrics_sink::RoutingMetricsSink;

use super::metrics_collector::ChainMetricsCollector;
use super::price_oracle::PriceOracleClient;

/// Returned in place of a rationale whenever the explainer fails.
pub const FALLBACK_EXPLANATION: &str =
  "AI explanation is currently unavailable. The recommendation is based on live network data only.";

/// Request-scoped routing coordinator. Holds no per-request state.
pub struct RoutingService {
  /// Immutable chain catalog.
  registry: Arc<ChainRegistry>,
  /// Per-chain gas collector.
  collector: Arc<ChainMetricsCollector>,
  /// Batched token pricing.
  oracle: PriceOracleClient,
  /// Gas → USD conversion.
  normalizer: CostNormalizer,
  /// Preference-based selection.
  ranking: RankingEngine,
  /// Rationale generator.
  explainer: Arc<dyn Explainer>,
  /// Upper bound for the explanation call.
  explanation_timeout: Duration,
  /// Optional metrics sink.
  metrics: Option<Arc<dyn RoutingMetricsSink>>,
}

impl RoutingService {
  /// Create a new routing service.
  pub fn new(
    registry: Arc<ChainRegistry>,
    collector: ChainMetricsCollector,
    oracle: PriceOracleClient,
    explainer: Arc<dyn Explainer>,
    explanation_timeout: Duration,
  ) -> Self {
    Self {
      registry,
      collector: Arc::new(collector),
      oracle,
      normalizer: CostNormalizer::reference_transfer(),
      ranking: RankingEngine::new(),
      explainer,
      explanation_timeout,
      metrics: None,
    }
  }

  /// Attach a metrics sink.
  #[must_use]
  pub fn with_metrics<M: RoutingMetricsSink>(mut self, metrics: Arc<M>) -> Self {
    self.metrics = Some(metrics);
    self
  }

  pub fn registry(&self) -> &ChainRegistry {
    &self.registry
  }

  /// Number of chains with a connected endpoint.
  pub fn connected_chains(&self) -> usize {
    self.collector.source().connected_count()
  }

  /// Recommend a chain for `request`.
  ///
  /// # Errors
  /// - `InvalidPreference` / `InvalidRequest` before any network call
  /// - `NoViableChains` when no chain could be collected
  /// - `NoComparableChains` for `cheapest` when no chain has a USD fee
  #[instrument(
    skip(self, request),
    fields(request_id = tracing::field::Empty, preference = %request.user_preference)
  )]
  pub async fn route(&self, request: &RoutingRequest) -> Result<RoutingDecision, RoutingError> {
    let preference = request.preference()?;

    let request_id = Uuid::new_v4();
    tracing::Span::current().record("request_id", tracing::field::display(request_id));
    let started = Instant::now();

    let symbols = self.registry.native_symbols();
    let (collected, prices) = tokio::join!(self.collect_all(), self.oracle.fetch_prices(&symbols));
    self.record_prices(&prices);

    let metrics: Vec<ChainMetric> = collected
      .into_iter()
      .map(|m| self.normalizer.apply(m, &prices))
      .collect();

    let chosen = match self.ranking.select(&metrics, preference) {
      Ok(chosen) => chosen.clone(),
      Err(e) => {
        warn!(error = %e, collected = metrics.len(), "No recommendation possible");
        if let Some(m) = &self.metrics {
          m.record_route(preference, Err(&e), started.elapsed());
        }
        return Err(e);
      }
    };

    let reason = decision_reason(preference, &chosen);
    info!(
      chain = %chosen.chain_id(),
      compared = metrics.len(),
      fee_usd = ?chosen.estimated_fee_usd.usd(),
      block_time_s = chosen.avg_block_time_seconds(),
      latency_ms = started.elapsed().as_millis(),
      "Routing decision made"
    );

    let explanation = self.explain(request, &chosen, &reason, &metrics).await;

    if let Some(m) = &self.metrics {
      m.record_route(preference, Ok(()), started.elapsed());
    }

    Ok(RoutingDecision {
      request_id,
      preference,
      chosen,
      metrics,
      reason,
      explanation,
      decided_at: Utc::now(),
    })
  }

  /// Live metrics for a single chain, without USD pricing.
  ///
  /// # Errors
  /// `UnsupportedChain` for unknown ids, `Collection` when the chain
  /// cannot be collected.
  #[instrument(skip(self))]
  pub async fn chain_metric(&self, chain_id: &str) -> Result<ChainMetric, RoutingError> {
    let descriptor = self
      .registry
      .get(chain_id)
      .cloned()
      .ok_or_else(|| RoutingError::UnsupportedChain(chain_id.to_string()))?;

    match self.collector.collect(descriptor).await {
      Ok(metric) => {
        if let Some(m) = &self.metrics {
          m.observe_gas_price(metric.chain_id(), metric.gas_price_gwei_equivalent);
        }
        Ok(self.normalizer.apply(metric, &TokenPrices::new()))
      }
      Err(failure) => {
        if let Some(m) = &self.metrics {
          m.record_collection_failure(&failure);
        }
        Err(failure.into())
      }
    }
  }

  /// Spawn one collection task per chain and wait for all of them.
  ///
  /// Output keeps registry order. Dropping the returned future aborts
  /// any task still in flight.
  async fn collect_all(&self) -> Vec<ChainMetric> {
    let mut tasks = JoinSet::new();
    for (index, descriptor) in self.registry.iter().enumerate() {
      let collector = Arc::clone(&self.collector);
      let descriptor = Arc::clone(descriptor);
      tasks.spawn(async move { (index, collector.collect(descriptor).await) });
    }

    let mut slots: Vec<Option<ChainMetric>> = vec![None; self.registry.len()];
    while let Some(joined) = tasks.join_next().await {
      match joined {
        Ok((index, Ok(metric))) => {
          if let Some(m) = &self.metrics {
            m.observe_gas_price(metric.chain_id(), metric.gas_price_gwei_equivalent);
          }
          slots[index] = Some(metric);
        }
        Ok((_, Err(failure))) => {
          warn!(chain = %failure.chain(), error = %failure, "Skipping chain");
          if let Some(m) = &self.metrics {
            m.record_collection_failure(&failure);
          }
        }
        Err(e) => {
          warn!(error = %e, "Collection task did not complete");
        }
      }
    }

    slots.into_iter().flatten().collect()
  }

  fn record_prices(&self, prices: &TokenPrices) {
    if let Some(m) = &self.metrics {
      for symbol in prices.unresolved() {
        m.record_unresolved_price(symbol);
      }
    }
  }

  /// Rationale text, or the fixed fallback on any failure.
  async fn explain(
    &self,
    request: &RoutingRequest,
    chosen: &ChainMetric,
    reason: &str,
    metrics: &[ChainMetric],
  ) -> String {
    let call = self.explainer.explain(request, chosen, reason, metrics);
    match tokio::time::timeout(self.explanation_timeout, call).await {
      Ok(Ok(text)) if !text.trim().is_empty() => text,
      Ok(Ok(_)) => {
        warn!("Explainer returned empty text, using fallback");
        FALLBACK_EXPLANATION.to_string()
      }
      Ok(Err(e)) => {
        warn!(error = %e, "Explanation failed, using fallback");
        FALLBACK_EXPLANATION.to_string()
      }
      Err(_) => {
        warn!(
          timeout_ms = self.explanation_timeout.as_millis(),
          "Explanation timed out, using fallback"
        );
        FALLBACK_EXPLANATION.to_string()
      }
    }
  }
}
