//! Confidence aggregation across layers plus a source-authority signal.
//!
//! Each present layer contributes `confidence * weight`. A layer that did not
//! run contributes nothing and its weight is not redistributed, so skipping a
//! layer lowers the reachable ceiling.

use crate::config::LayerWeights;
use crate::model::{LayerKind, QcItem, QcResult};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::warn;

/// Metadata keys carrying a popularity/engagement signal, in lookup order.
pub const AUTHORITY_KEYS: &[&str] = &["view_count", "views", "stars", "popularity"];

/// Authority assumed when an item carries no signal at all.
pub const DEFAULT_AUTHORITY: f64 = 0.7;

/// `(exclusive lower bound, score)`, checked from the top.
const AUTHORITY_TIERS: &[(f64, f64)] = &[
    (1_000_000.0, 1.0),
    (100_000.0, 0.9),
    (10_000.0, 0.8),
    (1_000.0, 0.7),
];
const LOWEST_TIER: f64 = 0.6;

pub fn authority_tier(signal: f64) -> f64 {
    AUTHORITY_TIERS
        .iter()
        .find(|(bound, _)| signal > *bound)
        .map_or(LOWEST_TIER, |(_, score)| *score)
}

/// First authority signal found in the item metadata.
pub fn authority_signal(item: &QcItem) -> Option<(&'static str, f64)> {
    AUTHORITY_KEYS
        .iter()
        .find_map(|key| item.metadata_f64(key).map(|v| (*key, v)))
}

pub fn source_authority(item: &QcItem) -> f64 {
    authority_signal(item).map_or(DEFAULT_AUTHORITY, |(_, signal)| authority_tier(signal))
}

#[derive(Debug, Clone)]
pub struct Aggregator {
    weights: LayerWeights,
    min_confidence: f64,
}

impl Aggregator {
    pub fn new(weights: LayerWeights, min_confidence: f64) -> Self {
        Self {
            weights,
            min_confidence,
        }
    }

    /// Combines layer results (in execution order) into the final verdict.
    pub fn aggregate(&self, item: &QcItem, layer_results: &[QcResult]) -> QcResult {
        let mut scores = BTreeMap::new();
        let mut weights = BTreeMap::new();
        let mut contributing = Vec::new();

        for result in layer_results {
            let weight = self.weights.weight_for(&result.layer);
            if weight == 0.0 && matches!(result.layer, LayerKind::Custom(_)) {
                warn!(
                    layer = %result.layer,
                    "layer has no aggregation weight; only its diagnostics are kept"
                );
            }
            let name = result.layer.to_string();
            if scores.insert(name.clone(), result.confidence).is_some() {
                warn!(layer = %name, "duplicate layer result; keeping the last one");
            }
            weights.insert(name.clone(), weight);
            contributing.push(name);
        }

        let authority = source_authority(item);
        scores.insert(LayerWeights::SOURCE_AUTHORITY.to_string(), authority);
        weights.insert(
            LayerWeights::SOURCE_AUTHORITY.to_string(),
            self.weights.source_authority,
        );

        let mut result = QcResult::from_weighted(LayerKind::Aggregate, scores, &weights);
        result.passed = result.confidence >= self.min_confidence;

        for layer in layer_results {
            result.issues.extend(layer.issues.iter().cloned());
            result.strengths.extend(layer.strengths.iter().cloned());
            result
                .recommendations
                .extend(layer.recommendations.iter().cloned());
        }
        if !result.passed {
            result.recommendations.push(format!(
                "Confidence {:.2} is below the required threshold {:.2}",
                result.confidence, self.min_confidence
            ));
        }

        let signal = authority_signal(item)
            .map_or(Value::Null, |(key, value)| json!({ "key": key, "value": value }));
        result
            .metadata
            .insert("item_id".to_string(), json!(item.id));
        result.metadata.insert("weights".to_string(), json!(weights));
        result
            .metadata
            .insert("min_confidence".to_string(), json!(self.min_confidence));
        result
            .metadata
            .insert("layers".to_string(), json!(contributing));
        result
            .metadata
            .insert("authority_signal".to_string(), signal);
        result
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(LayerWeights::default(), 0.75)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(kind: LayerKind, confidence: f64) -> QcResult {
        QcResult::from_mean(kind, BTreeMap::from([("overall".to_string(), confidence)]))
    }

    fn item_with_views(views: u64) -> QcItem {
        QcItem::new("1", "t", "u").with_metadata("view_count", views)
    }

    #[test]
    fn tiers_follow_signal_thresholds() {
        assert_eq!(authority_tier(2_000_000.0), 1.0);
        assert_eq!(authority_tier(1_000_000.0), 0.9);
        assert_eq!(authority_tier(150_000.0), 0.9);
        assert_eq!(authority_tier(10_001.0), 0.8);
        assert_eq!(authority_tier(5_000.0), 0.7);
        assert_eq!(authority_tier(1_000.0), 0.6);
        assert_eq!(authority_tier(0.0), 0.6);
    }

    #[test]
    fn missing_signal_is_neutral_positive() {
        assert_eq!(source_authority(&QcItem::new("1", "t", "u")), DEFAULT_AUTHORITY);
    }

    #[test]
    fn signal_lookup_falls_back_across_keys() {
        let item = QcItem::new("1", "t", "u").with_metadata("stars", 25_000);
        assert_eq!(authority_signal(&item), Some(("stars", 25_000.0)));
        assert_eq!(source_authority(&item), 0.8);
    }

    #[test]
    fn weighted_sum_of_layers_and_authority() {
        let (a, s) = (0.64, 0.42);
        let item = item_with_views(50_000);
        let o = 0.8;
        let r = Aggregator::default().aggregate(
            &item,
            &[layer(LayerKind::Automated, a), layer(LayerKind::Semantic, s)],
        );
        assert!((r.confidence - (0.30 * a + 0.50 * s + 0.20 * o)).abs() < 1e-9);
        assert_eq!(r.layer, LayerKind::Aggregate);
        assert_eq!(r.score("automated"), Some(a));
        assert_eq!(r.score("semantic"), Some(s));
        assert_eq!(r.score("source_authority"), Some(o));
    }

    #[test]
    fn skipped_layer_weight_is_not_redistributed() {
        let item = item_with_views(2_000_000);
        let r = Aggregator::default().aggregate(&item, &[layer(LayerKind::Automated, 1.0)]);
        assert!((r.confidence - 0.5).abs() < 1e-9);
        assert!(!r.passed);
        assert!(r.score("semantic").is_none());
        assert_eq!(r.metadata["layers"], json!(["automated"]));
    }

    #[test]
    fn failing_aggregate_recommends_with_threshold() {
        let r = Aggregator::default()
            .aggregate(&QcItem::new("1", "t", "u"), &[layer(LayerKind::Automated, 0.2)]);
        assert!(!r.passed);
        assert_eq!(
            r.recommendations.last().unwrap(),
            "Confidence 0.20 is below the required threshold 0.75"
        );
    }

    #[test]
    fn diagnostics_are_concatenated_in_layer_order() {
        let mut automated = layer(LayerKind::Automated, 1.0);
        automated.issues = vec!["dup".into(), "a-issue".into()];
        automated.strengths = vec!["a-strength".into()];
        let mut semantic = layer(LayerKind::Semantic, 1.0);
        semantic.issues = vec!["dup".into()];
        semantic.recommendations = vec!["s-rec".into()];

        let r = Aggregator::default().aggregate(&item_with_views(2_000_000), &[automated, semantic]);
        assert!(r.passed);
        assert_eq!(r.issues, vec!["dup", "a-issue", "dup"]);
        assert_eq!(r.strengths, vec!["a-strength"]);
        assert_eq!(r.recommendations, vec!["s-rec"]);
    }

    #[test]
    fn pass_is_inclusive_at_threshold() {
        let agg = Aggregator::new(
            LayerWeights {
                automated: 0.5,
                semantic: 0.5,
                source_authority: 0.0,
            },
            0.75,
        );
        let r = agg.aggregate(
            &QcItem::new("1", "t", "u"),
            &[layer(LayerKind::Automated, 0.75), layer(LayerKind::Semantic, 0.75)],
        );
        assert!((r.confidence - 0.75).abs() < 1e-12);
        assert!(r.passed);
    }

    #[test]
    fn custom_layer_keeps_diagnostics_without_weight() {
        let mut custom = layer(LayerKind::Custom("toxicity".into()), 0.1);
        custom.issues = vec!["flagged language".into()];
        let r = Aggregator::default().aggregate(&item_with_views(10), &[custom]);
        assert!((r.confidence - 0.2 * 0.6).abs() < 1e-12);
        assert_eq!(r.issues, vec!["flagged language"]);
    }
}
