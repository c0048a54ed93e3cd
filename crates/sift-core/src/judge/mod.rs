//! Boundary to the external reasoning service that judges content semantically.
//!
//! - client.rs: request type + `JudgmentClient` trait
//! - response.rs: response contract and parsing
//! - prompt.rs: prompt text for completion-style backends

pub mod client;
pub mod prompt;
pub mod response;

pub use client::{JudgmentClient, JudgmentRequest};
pub use response::{JudgmentResponse, OverallQuality};
