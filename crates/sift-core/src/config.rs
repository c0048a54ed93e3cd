use crate::errors::ConfigError;
use crate::model::LayerKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

/// Slack allowed when checking that weights sum to at most 1.0.
const WEIGHT_SUM_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiftConfig {
    pub version: u32,
    pub thresholds: Thresholds,
    pub weights: LayerWeights,
    pub semantic: SemanticSettings,
    /// Gate-layer confidence below which costly layers are skipped.
    pub short_circuit_below: f64,
}

impl Default for SiftConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            thresholds: Thresholds::default(),
            weights: LayerWeights::default(),
            semantic: SemanticSettings::default(),
            short_circuit_below: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    /// Fraction of the expected length below which content is reported incomplete.
    pub min_completeness: f64,
    /// Minimum content length (characters) when no expected length can be derived.
    pub min_content_length: usize,
    /// Artifact rate above which an issue is recorded.
    pub max_error_rate: f64,
    /// Aggregate confidence required to pass.
    pub min_confidence: f64,
    /// Speech rate used to estimate transcript length from a duration.
    pub words_per_second: f64,
    pub avg_chars_per_word: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_completeness: 0.8,
            min_content_length: 100,
            max_error_rate: 0.1,
            min_confidence: 0.75,
            words_per_second: 2.5,
            avg_chars_per_word: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayerWeights {
    pub automated: f64,
    pub semantic: f64,
    pub source_authority: f64,
}

impl Default for LayerWeights {
    fn default() -> Self {
        Self {
            automated: 0.30,
            semantic: 0.50,
            source_authority: 0.20,
        }
    }
}

impl LayerWeights {
    pub const SOURCE_AUTHORITY: &'static str = "source_authority";

    /// Weight of a layer's confidence in the aggregate; custom layers carry none.
    pub fn weight_for(&self, layer: &LayerKind) -> f64 {
        match layer {
            LayerKind::Automated => self.automated,
            LayerKind::Semantic => self.semantic,
            LayerKind::Aggregate | LayerKind::Custom(_) => 0.0,
        }
    }

    pub fn sum(&self) -> f64 {
        self.automated + self.semantic + self.source_authority
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAi,
    Fake,
    None,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Provider::OpenAi => "openai",
            Provider::Fake => "fake",
            Provider::None => "none",
        })
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "fake" => Ok(Provider::Fake),
            "none" | "off" => Ok(Provider::None),
            other => Err(format!(
                "unknown judge provider '{other}' (expected openai, fake or none)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SemanticSettings {
    pub enabled: bool,
    pub provider: Provider,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    /// Number of leading content characters sent to the judge.
    pub sample_chars: usize,
}

impl Default for SemanticSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: Provider::OpenAi,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            max_tokens: 800,
            timeout_secs: 60,
            sample_chars: 1000,
        }
    }
}

impl SemanticSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl SiftConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != SUPPORTED_CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: self.version,
                supported: SUPPORTED_CONFIG_VERSION,
            });
        }

        let w = &self.weights;
        for (field, value) in [
            ("weights.automated", w.automated),
            ("weights.semantic", w.semantic),
            ("weights.source_authority", w.source_authority),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(
                    field,
                    format!("must be a finite, non-negative number (got {value})"),
                ));
            }
        }
        if w.sum() > 1.0 + WEIGHT_SUM_EPSILON {
            return Err(ConfigError::invalid(
                "weights",
                format!("weights must sum to at most 1.0 (got {:.3})", w.sum()),
            ));
        }

        let t = &self.thresholds;
        for (field, value) in [
            ("thresholds.min_completeness", t.min_completeness),
            ("thresholds.max_error_rate", t.max_error_rate),
            ("thresholds.min_confidence", t.min_confidence),
            ("short_circuit_below", self.short_circuit_below),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::invalid(
                    field,
                    format!("must be within [0.0, 1.0] (got {value})"),
                ));
            }
        }
        for (field, value) in [
            ("thresholds.words_per_second", t.words_per_second),
            ("thresholds.avg_chars_per_word", t.avg_chars_per_word),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::invalid(
                    field,
                    format!("must be positive (got {value})"),
                ));
            }
        }

        if self.semantic.timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "semantic.timeout_secs",
                "a timeout is mandatory",
            ));
        }
        if self.semantic.sample_chars == 0 {
            return Err(ConfigError::invalid(
                "semantic.sample_chars",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        let cfg: SiftConfig = serde_yaml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

pub fn load_config(path: &Path) -> Result<SiftConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    SiftConfig::from_yaml(&raw)
}
