//! Error taxonomy.
//!
//! Only [`ConfigError`] ever reaches a caller: it is raised while building an
//! orchestrator. [`JudgmentError`] is absorbed by the semantic layer and turned
//! into a fail-open result.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Construction-time misconfiguration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("unsupported config version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// A field holds a value the engine cannot work with.
    #[error("invalid config value for '{field}': {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JudgmentErrorKind {
    Timeout,
    Transport,
    EmptyResponse,
    MalformedJson,
    MissingField,
    OutOfRange,
}

impl JudgmentErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JudgmentErrorKind::Timeout => "timeout",
            JudgmentErrorKind::Transport => "transport",
            JudgmentErrorKind::EmptyResponse => "empty_response",
            JudgmentErrorKind::MalformedJson => "malformed_json",
            JudgmentErrorKind::MissingField => "missing_field",
            JudgmentErrorKind::OutOfRange => "out_of_range",
        }
    }

    /// Short human-readable label, used as the issue text of a fail-open result.
    pub fn describe(&self) -> &'static str {
        match self {
            JudgmentErrorKind::Timeout => "semantic validation timed out",
            JudgmentErrorKind::Transport => "semantic validation service unavailable",
            JudgmentErrorKind::EmptyResponse => "semantic validation returned an empty response",
            JudgmentErrorKind::MalformedJson => "semantic validation returned malformed JSON",
            JudgmentErrorKind::MissingField => "semantic validation response is missing fields",
            JudgmentErrorKind::OutOfRange => "semantic validation scores out of range",
        }
    }
}

/// Failure while obtaining or decoding a semantic judgment.
#[derive(Debug, Clone, Error)]
#[error("{}: {message}", kind.as_str())]
pub struct JudgmentError {
    pub kind: JudgmentErrorKind,
    pub message: String,
}

impl JudgmentError {
    pub fn new(kind: JudgmentErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(after: Duration) -> Self {
        Self::new(
            JudgmentErrorKind::Timeout,
            format!("no response within {}s", after.as_secs_f64()),
        )
    }

    pub fn transport(err: anyhow::Error) -> Self {
        Self::new(JudgmentErrorKind::Transport, format!("{err:#}"))
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            JudgmentErrorKind::MissingField,
            format!("response missing '{field}'"),
        )
    }
}
