//! Orchestrator: sequences the layers, applies the short-circuit rule and keeps
//! running statistics.

mod batch;
mod stats;

use crate::aggregate::Aggregator;
use crate::automated::AutomatedLayer;
use crate::config::SiftConfig;
use crate::errors::ConfigError;
use crate::judge::JudgmentClient;
use crate::model::{LayerKind, QcItem, QcResult, QcStats};
use crate::semantic::SemanticLayer;
use async_trait::async_trait;
use serde_json::json;
use stats::{Outcome, StatsRecorder};
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument};

/// One independent validation strategy.
///
/// `check` is infallible: a layer absorbs its own failures and reports them
/// as diagnostics in the returned result.
#[async_trait]
pub trait QcLayer: Send + Sync {
    fn kind(&self) -> LayerKind;

    async fn check(&self, item: &QcItem) -> QcResult;
}

pub struct Orchestrator {
    /// Cheap layers; always run, and their results gate the costly ones.
    gates: Vec<Arc<dyn QcLayer>>,
    /// Expensive layers, skipped when a gate result is below `short_circuit_below`.
    costly: Vec<Arc<dyn QcLayer>>,
    aggregator: Aggregator,
    short_circuit_below: f64,
    stats: StatsRecorder,
}

impl Orchestrator {
    /// Automated layer as gate, plus a semantic layer when `client` is given
    /// and semantic validation is enabled in `config`.
    pub fn new(
        config: SiftConfig,
        client: Option<Arc<dyn JudgmentClient>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Self::builder(config);
        if let Some(client) = client {
            builder = builder.judgment_client(client);
        }
        builder.build()
    }

    pub fn builder(config: SiftConfig) -> OrchestratorBuilder {
        OrchestratorBuilder {
            config,
            client: None,
            gates: None,
            costly: None,
        }
    }

    /// Validates with every configured layer enabled.
    pub async fn validate(&self, item: &QcItem) -> QcResult {
        self.validate_with(item, true).await
    }

    /// Validates one item. With `enable_semantic = false` the costly layers are
    /// not consulted; they are also skipped when a gate layer scores below the
    /// short-circuit threshold.
    pub async fn validate_with(&self, item: &QcItem, enable_semantic: bool) -> QcResult {
        let span = info_span!("qc.validate", item.id = %item.id);
        async move {
            let mut results = Vec::with_capacity(self.gates.len() + self.costly.len());
            for layer in &self.gates {
                let result = layer.check(item).await;
                debug!(
                    layer = %result.layer,
                    confidence = result.confidence,
                    passed = result.passed,
                    issues = result.issues.len(),
                    "gate layer finished"
                );
                results.push(result);
            }

            let weakest_gate = results
                .iter()
                .map(|r| r.confidence)
                .fold(f64::INFINITY, f64::min);
            let short_circuit = enable_semantic
                && !self.costly.is_empty()
                && weakest_gate < self.short_circuit_below;
            if short_circuit {
                info!(
                    confidence = weakest_gate,
                    threshold = self.short_circuit_below,
                    "gate confidence too low; skipping costly layers"
                );
            }

            let run_costly = enable_semantic && !short_circuit;
            let mut semantic_failed = false;
            let mut skipped = Vec::new();
            for layer in &self.costly {
                if !run_costly {
                    skipped.push(layer.kind().to_string());
                    continue;
                }
                let result = layer.check(item).await;
                debug!(
                    layer = %result.layer,
                    confidence = result.confidence,
                    passed = result.passed,
                    fail_open = result.is_fail_open(),
                    "costly layer finished"
                );
                semantic_failed |= result.is_fail_open();
                results.push(result);
            }

            let mut aggregate = self.aggregator.aggregate(item, &results);
            aggregate
                .metadata
                .insert("short_circuit".to_string(), json!(short_circuit));
            aggregate
                .metadata
                .insert("skipped_layers".to_string(), json!(skipped));

            self.stats.record(Outcome {
                passed: aggregate.passed,
                confidence: aggregate.confidence,
                short_circuited: short_circuit,
                semantic_failed,
            });
            info!(
                passed = aggregate.passed,
                confidence = aggregate.confidence,
                "item validated"
            );
            aggregate
        }
        .instrument(span)
        .await
    }

    /// Snapshot of the running statistics.
    pub fn stats(&self) -> QcStats {
        self.stats.snapshot()
    }

    /// Kinds of the configured layers, gates first.
    pub fn layer_kinds(&self) -> Vec<LayerKind> {
        self.gates
            .iter()
            .chain(self.costly.iter())
            .map(|l| l.kind())
            .collect()
    }
}

pub struct OrchestratorBuilder {
    config: SiftConfig,
    client: Option<Arc<dyn JudgmentClient>>,
    gates: Option<Vec<Arc<dyn QcLayer>>>,
    costly: Option<Vec<Arc<dyn QcLayer>>>,
}

impl OrchestratorBuilder {
    /// Backend for the default semantic layer.
    pub fn judgment_client(mut self, client: Arc<dyn JudgmentClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Adds a gate layer; the first call replaces the default automated layer.
    pub fn gate_layer(mut self, layer: Arc<dyn QcLayer>) -> Self {
        self.gates.get_or_insert_with(Vec::new).push(layer);
        self
    }

    /// Adds a costly layer; the first call replaces the default semantic layer.
    pub fn costly_layer(mut self, layer: Arc<dyn QcLayer>) -> Self {
        self.costly.get_or_insert_with(Vec::new).push(layer);
        self
    }

    pub fn build(self) -> Result<Orchestrator, ConfigError> {
        let config = self.config;
        config.validate()?;

        let gates = self.gates.unwrap_or_else(|| {
            vec![Arc::new(AutomatedLayer::new(config.thresholds.clone())) as Arc<dyn QcLayer>]
        });
        let costly = match (self.costly, self.client) {
            (Some(layers), _) => layers,
            (None, Some(client)) if config.semantic.enabled => {
                vec![Arc::new(SemanticLayer::new(client, &config.semantic)) as Arc<dyn QcLayer>]
            }
            (None, _) => Vec::new(),
        };

        Ok(Orchestrator {
            gates,
            costly,
            aggregator: Aggregator::new(config.weights, config.thresholds.min_confidence),
            short_circuit_below: config.short_circuit_below,
            stats: StatsRecorder::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayerWeights;
    use crate::providers::fake::FakeJudgmentClient;

    #[test]
    fn default_layers_depend_on_client() {
        let without = Orchestrator::new(SiftConfig::default(), None).unwrap();
        assert_eq!(without.layer_kinds(), vec![LayerKind::Automated]);

        let with = Orchestrator::new(
            SiftConfig::default(),
            Some(Arc::new(FakeJudgmentClient::new())),
        )
        .unwrap();
        assert_eq!(
            with.layer_kinds(),
            vec![LayerKind::Automated, LayerKind::Semantic]
        );
    }

    #[test]
    fn disabled_semantic_settings_drop_the_layer() {
        let mut config = SiftConfig::default();
        config.semantic.enabled = false;
        let orch = Orchestrator::new(config, Some(Arc::new(FakeJudgmentClient::new()))).unwrap();
        assert_eq!(orch.layer_kinds(), vec![LayerKind::Automated]);
    }

    #[test]
    fn invalid_weights_fail_construction() {
        let config = SiftConfig {
            weights: LayerWeights {
                automated: 0.6,
                semantic: 0.6,
                source_authority: 0.2,
            },
            ..Default::default()
        };
        let err = Orchestrator::new(config, None).err().unwrap();
        assert!(err.to_string().contains("sum to at most 1.0"));
    }

    #[tokio::test]
    async fn fresh_orchestrator_has_empty_stats() {
        let orch = Orchestrator::new(SiftConfig::default(), None).unwrap();
        assert_eq!(orch.stats(), QcStats::default());
        orch.validate(&QcItem::default()).await;
        assert_eq!(orch.stats().total_checked, 1);
        assert_eq!(orch.stats().failed, 1);
    }
}
