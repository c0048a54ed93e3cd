//! Multi-layer quality control for extracted content.
//!
//! An [`Orchestrator`] runs a cheap automated layer, optionally a semantic
//! layer backed by an external judge, and aggregates both with a source
//! authority signal into one [`QcResult`].

pub mod aggregate;
pub mod automated;
pub mod config;
pub mod engine;
pub mod errors;
pub mod judge;
pub mod model;
pub mod providers;
pub mod semantic;

pub use config::{load_config, SiftConfig};
pub use engine::{Orchestrator, OrchestratorBuilder, QcLayer};
pub use errors::{ConfigError, JudgmentError, JudgmentErrorKind};
pub use model::{LayerKind, QcItem, QcResult, QcStats, SourceType};
