use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of source an item was extracted from.
///
/// Known tags are matched case-insensitively; anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Video,
    #[default]
    Document,
    Repository,
    Web,
    #[serde(untagged)]
    Other(String),
}

impl SourceType {
    pub fn as_str(&self) -> &str {
        match self {
            SourceType::Video => "video",
            SourceType::Document => "document",
            SourceType::Repository => "repository",
            SourceType::Web => "web",
            SourceType::Other(s) => s.as_str(),
        }
    }
}

impl From<&str> for SourceType {
    fn from(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "video" => SourceType::Video,
            "document" => SourceType::Document,
            "repository" => SourceType::Repository,
            "web" => SourceType::Web,
            _ => SourceType::Other(tag.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for SourceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(SourceType::from(tag.as_str()))
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An extracted content item, as handed over by the extraction pipeline.
///
/// Required fields default to empty strings when absent from the input so that
/// a malformed item is rejected by the automated layer instead of failing to load.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QcItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, alias = "sourceType")]
    pub source_type: SourceType,
    #[serde(default, alias = "sourceName")]
    pub source_name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl QcItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_source(mut self, source_type: SourceType, source_name: impl Into<String>) -> Self {
        self.source_type = source_type;
        self.source_name = source_name.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Numeric metadata value; numeric strings such as `"12000"` are accepted.
    pub fn metadata_f64(&self, key: &str) -> Option<f64> {
        let v = match self.metadata.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
            _ => None,
        }?;
        v.is_finite().then_some(v)
    }
}

/// Producer of a [`QcResult`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Automated,
    Semantic,
    Aggregate,
    #[serde(untagged)]
    Custom(String),
}

impl LayerKind {
    pub fn as_str(&self) -> &str {
        match self {
            LayerKind::Automated => "automated",
            LayerKind::Semantic => "semantic",
            LayerKind::Aggregate => "aggregate",
            LayerKind::Custom(name) => name.as_str(),
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict of one layer, or of the whole pipeline when `layer` is [`LayerKind::Aggregate`].
///
/// `confidence` is always derived from `scores`; use [`QcResult::from_mean`] or
/// [`QcResult::from_weighted`] to build one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QcResult {
    pub passed: bool,
    pub confidence: f64,
    pub layer: LayerKind,
    pub scores: BTreeMap<String, f64>,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl QcResult {
    /// Confidence is the unweighted mean of `scores` (0.0 when there are none).
    pub fn from_mean(layer: LayerKind, scores: BTreeMap<String, f64>) -> Self {
        let scores = clamp_scores(scores);
        let confidence = if scores.is_empty() {
            0.0
        } else {
            scores.values().sum::<f64>() / scores.len() as f64
        };
        Self::with_confidence(layer, scores, confidence)
    }

    /// Confidence is `sum(scores[k] * weights[k])`; scores without a weight contribute nothing.
    pub fn from_weighted(
        layer: LayerKind,
        scores: BTreeMap<String, f64>,
        weights: &BTreeMap<String, f64>,
    ) -> Self {
        let scores = clamp_scores(scores);
        let confidence = scores
            .iter()
            .map(|(name, score)| score * weights.get(name).copied().unwrap_or(0.0))
            .sum();
        Self::with_confidence(layer, scores, confidence)
    }

    fn with_confidence(layer: LayerKind, scores: BTreeMap<String, f64>, confidence: f64) -> Self {
        Self {
            passed: false,
            confidence: clamp_unit(confidence),
            layer,
            scores,
            issues: Vec::new(),
            strengths: Vec::new(),
            recommendations: Vec::new(),
            metadata: Map::new(),
        }
    }

    pub fn score(&self, name: &str) -> Option<f64> {
        self.scores.get(name).copied()
    }

    /// True for the neutral result a layer emits after its backend failed.
    pub fn is_fail_open(&self) -> bool {
        self.metadata.contains_key("error")
    }
}

/// Running statistics of an orchestrator instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QcStats {
    pub total_checked: u64,
    pub passed: u64,
    pub failed: u64,
    pub pass_rate: f64,
    pub avg_confidence: f64,
    pub short_circuited: u64,
    pub semantic_failures: u64,
}

/// Clamps into `[0.0, 1.0]`; NaN maps to 0.0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn clamp_scores(scores: BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    scores
        .into_iter()
        .map(|(name, score)| (name, clamp_unit(score)))
        .collect()
}
