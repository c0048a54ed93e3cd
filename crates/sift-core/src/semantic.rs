//! Semantic validation layer.
//!
//! Wraps a [`JudgmentClient`] and converts its answer into a [`QcResult`]. Any
//! failure (timeout, transport, undecodable answer) yields a neutral fail-open
//! result instead of an error, so a flaky backend never blocks the pipeline.

use crate::config::SemanticSettings;
use crate::engine::QcLayer;
use crate::errors::JudgmentError;
use crate::judge::{JudgmentClient, JudgmentRequest, JudgmentResponse};
use crate::model::{LayerKind, QcItem, QcResult};
use async_trait::async_trait;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info_span, warn, Instrument};

/// Above this confidence the layer passes regardless of the judge's own flag.
pub const PASS_CONFIDENCE: f64 = 0.7;
/// Confidence reported when the judge could not be consulted.
pub const NEUTRAL_CONFIDENCE: f64 = 0.5;

pub struct SemanticLayer {
    client: Arc<dyn JudgmentClient>,
    timeout: Duration,
    sample_chars: usize,
}

impl SemanticLayer {
    pub fn new(client: Arc<dyn JudgmentClient>, settings: &SemanticSettings) -> Self {
        Self {
            client,
            timeout: settings.timeout(),
            sample_chars: settings.sample_chars,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn judge(&self, request: &JudgmentRequest) -> Result<JudgmentResponse, JudgmentError> {
        let span = info_span!(
            "judge.request",
            provider = self.client.provider_name(),
            latency_ms = tracing::field::Empty
        );
        async move {
            let started = Instant::now();
            let outcome = timeout(self.timeout, self.client.complete(request)).await;
            tracing::Span::current().record("latency_ms", started.elapsed().as_millis() as u64);

            let raw = outcome
                .map_err(|_| JudgmentError::timeout(self.timeout))?
                .map_err(JudgmentError::transport)?;
            JudgmentResponse::parse(&raw)
        }
        .instrument(span)
        .await
    }

    fn to_result(&self, response: JudgmentResponse) -> QcResult {
        let scores: BTreeMap<String, f64> = response
            .scores()
            .into_iter()
            .map(|(name, score)| (name.to_string(), score))
            .collect();

        let mut result = QcResult::from_mean(LayerKind::Semantic, scores);
        result.passed = response.passed.unwrap_or(false) || result.confidence > PASS_CONFIDENCE;
        result.metadata.insert(
            "overall_quality".to_string(),
            json!(response.overall_quality.to_string()),
        );
        result
            .metadata
            .insert("provider".to_string(), json!(self.client.provider_name()));
        if let Some(judge_passed) = response.passed {
            result
                .metadata
                .insert("judge_passed".to_string(), json!(judge_passed));
        }
        result.issues = response.issues;
        result.strengths = response.strengths;
        result.recommendations = response.recommendations;
        result
    }

    fn fail_open(&self, err: &JudgmentError) -> QcResult {
        let scores = ["coherence", "value", "accuracy", "completeness"]
            .into_iter()
            .map(|name| (name.to_string(), NEUTRAL_CONFIDENCE))
            .collect();

        let mut result = QcResult::from_mean(LayerKind::Semantic, scores);
        result.passed = true;
        result.issues = vec![err.kind.describe().to_string()];
        result
            .metadata
            .insert("error".to_string(), json!(err.to_string()));
        result
            .metadata
            .insert("error_kind".to_string(), json!(err.kind.as_str()));
        result
            .metadata
            .insert("provider".to_string(), json!(self.client.provider_name()));
        result
    }
}

#[async_trait]
impl QcLayer for SemanticLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Semantic
    }

    async fn check(&self, item: &QcItem) -> QcResult {
        let request = JudgmentRequest::from_item(item, self.sample_chars);
        match self.judge(&request).await {
            Ok(response) => {
                debug!(
                    item_id = %item.id,
                    quality = %response.overall_quality,
                    "semantic judgment received"
                );
                self.to_result(response)
            }
            Err(err) => {
                warn!(
                    item_id = %item.id,
                    error_kind = err.kind.as_str(),
                    error = %err.message,
                    "semantic validation failed open"
                );
                self.fail_open(&err)
            }
        }
    }
}
