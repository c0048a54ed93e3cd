//! Automated check layer: cheap, deterministic heuristics with no network access.
//!
//! Four subscores are averaged into the layer confidence:
//!
//! - `completeness`: actual vs. expected content length
//! - `format`: required item fields present
//! - `content_quality`: repetition, sentence structure and word length
//! - `error_rate`: `1 - error rate` over transcription/scrape artifacts and punctuation noise
//!
//! Malformed input never fails the check itself; it yields worst-case subscores and issues.

pub mod text;

use crate::config::Thresholds;
use crate::engine::QcLayer;
use crate::model::{clamp_unit, LayerKind, QcItem, QcResult, SourceType};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Above this confidence the layer passes even when issues were recorded.
pub const PASS_CONFIDENCE: f64 = 0.7;

const MIN_UNIQUE_WORD_RATIO: f64 = 0.3;
const MIN_SENTENCES: usize = 5;
const MIN_AVG_WORD_LEN: f64 = 3.0;
const MAX_AVG_WORD_LEN: f64 = 15.0;
const MAX_PUNCTUATION_DENSITY: f64 = 0.15;

const REPETITION_PENALTY: f64 = 0.3;
const FEW_SENTENCES_PENALTY: f64 = 0.2;
const WORD_LENGTH_PENALTY: f64 = 0.2;

/// Metadata keys holding a media duration in seconds, in lookup order.
const DURATION_KEYS: &[&str] = &["duration_seconds", "expected_duration_seconds"];

#[derive(Debug, Clone, Default)]
pub struct AutomatedLayer {
    thresholds: Thresholds,
}

impl AutomatedLayer {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }
}

#[async_trait]
impl QcLayer for AutomatedLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Automated
    }

    async fn check(&self, item: &QcItem) -> QcResult {
        check(item, &self.thresholds)
    }
}

/// Accumulates diagnostics while the subscores are computed.
#[derive(Default)]
struct Findings {
    issues: Vec<String>,
    strengths: Vec<String>,
    recommendations: Vec<String>,
    metadata: Map<String, Value>,
}

pub fn check(item: &QcItem, thresholds: &Thresholds) -> QcResult {
    let mut findings = Findings::default();
    let content = item.content.trim();
    let words = text::words(content);

    let format = format_score(item, &mut findings);
    let completeness = completeness_score(item, content, thresholds, &mut findings);
    let (content_quality, error_rate) = if words.is_empty() {
        findings.issues.push("content is empty".to_string());
        findings
            .recommendations
            .push("re-run extraction for this item; no text was captured".to_string());
        (0.0, 0.0)
    } else {
        (
            content_quality_score(content, &words, &mut findings),
            error_rate_score(content, &words, thresholds, &mut findings),
        )
    };

    let scores = BTreeMap::from([
        ("completeness".to_string(), completeness),
        ("format".to_string(), format),
        ("content_quality".to_string(), content_quality),
        ("error_rate".to_string(), error_rate),
    ]);

    findings.metadata.insert(
        "thresholds".to_string(),
        json!({
            "min_content_length": thresholds.min_content_length,
            "min_completeness": thresholds.min_completeness,
            "max_error_rate": thresholds.max_error_rate,
            "pass_confidence": PASS_CONFIDENCE,
        }),
    );

    let mut result = QcResult::from_mean(LayerKind::Automated, scores);
    result.passed = findings.issues.is_empty() || result.confidence > PASS_CONFIDENCE;
    result.issues = findings.issues;
    result.strengths = findings.strengths;
    result.recommendations = findings.recommendations;
    result.metadata = findings.metadata;
    result
}

fn format_score(item: &QcItem, findings: &mut Findings) -> f64 {
    let missing: Vec<&str> = [("id", &item.id), ("title", &item.title), ("url", &item.url)]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

    if missing.is_empty() {
        return 1.0;
    }
    findings.issues.push(format!(
        "missing required field(s): {}",
        missing.join(", ")
    ));
    0.0
}

fn expected_length(item: &QcItem, thresholds: &Thresholds) -> Option<f64> {
    if item.source_type != SourceType::Video {
        return None;
    }
    let duration = DURATION_KEYS
        .iter()
        .find_map(|key| item.metadata_f64(key))
        .filter(|d| *d > 0.0)?;
    Some(duration * thresholds.words_per_second * thresholds.avg_chars_per_word)
}

fn completeness_score(
    item: &QcItem,
    content: &str,
    thresholds: &Thresholds,
    findings: &mut Findings,
) -> f64 {
    let actual = content.chars().count();
    findings
        .metadata
        .insert("content_length".to_string(), json!(actual));

    if let Some(expected) = expected_length(item, thresholds) {
        findings
            .metadata
            .insert("expected_length".to_string(), json!(expected.round()));
        let ratio = clamp_unit(actual as f64 / expected);
        if ratio < thresholds.min_completeness {
            findings.issues.push(format!(
                "content appears incomplete: {:.0}% of expected length",
                ratio * 100.0
            ));
            findings.recommendations.push(
                "check whether the transcript was truncated during extraction".to_string(),
            );
        } else if ratio >= 1.0 {
            findings
                .strengths
                .push("content length matches the source duration".to_string());
        }
        return ratio;
    }

    if actual >= thresholds.min_content_length {
        1.0
    } else {
        findings.issues.push(format!(
            "content too short: {} characters (minimum {})",
            actual, thresholds.min_content_length
        ));
        0.0
    }
}

fn content_quality_score(content: &str, words: &[&str], findings: &mut Findings) -> f64 {
    let unique_ratio = text::unique_word_ratio(words);
    let sentences = text::sentence_count(content);
    let avg_len = text::avg_word_length(words);

    findings
        .metadata
        .insert("word_count".to_string(), json!(words.len()));
    findings
        .metadata
        .insert("unique_word_ratio".to_string(), json!(unique_ratio));
    findings
        .metadata
        .insert("sentence_count".to_string(), json!(sentences));
    findings
        .metadata
        .insert("avg_word_length".to_string(), json!(avg_len));

    let mut penalty = 0.0;
    if unique_ratio < MIN_UNIQUE_WORD_RATIO {
        penalty += REPETITION_PENALTY;
        findings.issues.push(format!(
            "high repetition: unique word ratio {:.2} (minimum {:.2})",
            unique_ratio, MIN_UNIQUE_WORD_RATIO
        ));
        findings
            .recommendations
            .push("look for looping or duplicated segments in the source".to_string());
    }
    if sentences < MIN_SENTENCES {
        penalty += FEW_SENTENCES_PENALTY;
        findings.issues.push(format!(
            "too few sentences: {} (minimum {})",
            sentences, MIN_SENTENCES
        ));
    }
    if !(MIN_AVG_WORD_LEN..=MAX_AVG_WORD_LEN).contains(&avg_len) {
        penalty += WORD_LENGTH_PENALTY;
        findings.issues.push(format!(
            "unusual average word length: {:.1} characters (expected {}-{})",
            avg_len, MIN_AVG_WORD_LEN, MAX_AVG_WORD_LEN
        ));
    }

    if penalty == 0.0 {
        findings
            .strengths
            .push("varied vocabulary and regular sentence structure".to_string());
    }
    (1.0 - penalty).max(0.0)
}

fn error_rate_score(
    content: &str,
    words: &[&str],
    thresholds: &Thresholds,
    findings: &mut Findings,
) -> f64 {
    let artifacts = text::artifact_count(content);
    let density = text::punctuation_density(content);

    // Two checks, each contributing an error fraction in [0, 1].
    let artifact_rate = (artifacts as f64 / words.len() as f64).min(1.0);
    let punctuation_rate = if density > MAX_PUNCTUATION_DENSITY {
        1.0
    } else {
        0.0
    };
    let error_rate = clamp_unit((artifact_rate + punctuation_rate) / 2.0);

    findings
        .metadata
        .insert("artifact_count".to_string(), json!(artifacts));
    findings
        .metadata
        .insert("punctuation_density".to_string(), json!(density));
    findings
        .metadata
        .insert("error_rate".to_string(), json!(error_rate));

    if error_rate > thresholds.max_error_rate {
        findings.issues.push(format!(
            "high error rate: {:.2} (maximum {:.2})",
            error_rate, thresholds.max_error_rate
        ));
    }
    if artifacts > 0 {
        findings.recommendations.push(format!(
            "strip {} transcription/scrape artifact(s) before ingestion",
            artifacts
        ));
    }
    if density > MAX_PUNCTUATION_DENSITY {
        findings.issues.push(format!(
            "excessive punctuation density: {:.2} (maximum {:.2})",
            density, MAX_PUNCTUATION_DENSITY
        ));
    }
    if artifacts == 0 && density <= MAX_PUNCTUATION_DENSITY {
        findings
            .strengths
            .push("no transcription or scrape artifacts detected".to_string());
    }

    1.0 - error_rate
}
