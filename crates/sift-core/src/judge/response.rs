use crate::errors::{JudgmentError, JudgmentErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const SCORE_FIELDS: [&str; 4] = [
    "coherence_score",
    "value_score",
    "accuracy_score",
    "completeness_score",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl fmt::Display for OverallQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OverallQuality::Excellent => "excellent",
            OverallQuality::Good => "good",
            OverallQuality::Fair => "fair",
            OverallQuality::Poor => "poor",
        })
    }
}

/// Decoded judge verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgmentResponse {
    pub coherence_score: f64,
    pub value_score: f64,
    pub accuracy_score: f64,
    pub completeness_score: f64,
    pub overall_quality: OverallQuality,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub passed: Option<bool>,
}

impl JudgmentResponse {
    /// Decodes raw judge output. Tolerates a surrounding markdown code fence and
    /// prose before the JSON object; everything else is an error.
    pub fn parse(raw: &str) -> Result<Self, JudgmentError> {
        let text = strip_code_fence(raw);
        if text.is_empty() {
            return Err(JudgmentError::new(
                JudgmentErrorKind::EmptyResponse,
                "judge returned no text",
            ));
        }

        let start = text.find('{').ok_or_else(|| {
            JudgmentError::new(
                JudgmentErrorKind::MalformedJson,
                "no JSON object found in judge output",
            )
        })?;
        let mut value: Value = serde_json::Deserializer::from_str(&text[start..])
            .into_iter::<Value>()
            .next()
            .ok_or_else(|| {
                JudgmentError::new(JudgmentErrorKind::MalformedJson, "no JSON value in output")
            })?
            .map_err(|e| JudgmentError::new(JudgmentErrorKind::MalformedJson, e.to_string()))?;

        let obj = value.as_object_mut().ok_or_else(|| {
            JudgmentError::new(JudgmentErrorKind::MalformedJson, "judge output is not an object")
        })?;
        for field in SCORE_FIELDS.iter().chain(std::iter::once(&"overall_quality")) {
            if obj.get(*field).map_or(true, Value::is_null) {
                return Err(JudgmentError::missing_field(field));
            }
        }
        if let Some(Value::String(q)) = obj.get_mut("overall_quality") {
            *q = q.trim().to_ascii_lowercase();
        }

        let response: JudgmentResponse = serde_json::from_value(value)
            .map_err(|e| JudgmentError::new(JudgmentErrorKind::MalformedJson, e.to_string()))?;
        response.check_ranges()?;
        Ok(response)
    }

    pub fn scores(&self) -> [(&'static str, f64); 4] {
        [
            ("coherence", self.coherence_score),
            ("value", self.value_score),
            ("accuracy", self.accuracy_score),
            ("completeness", self.completeness_score),
        ]
    }

    fn check_ranges(&self) -> Result<(), JudgmentError> {
        for (name, score) in self.scores() {
            if !(0.0..=1.0).contains(&score) {
                return Err(JudgmentError::new(
                    JudgmentErrorKind::OutOfRange,
                    format!("{name}_score {score} outside [0.0, 1.0]"),
                ));
            }
        }
        Ok(())
    }
}

/// Removes a surrounding ```` ``` ```` fence (with optional language tag).
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}
