use crate::judge::{JudgmentClient, JudgmentRequest};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

const DEFAULT_RESPONSE: &str = r#"{
  "coherence_score": 0.8,
  "value_score": 0.8,
  "accuracy_score": 0.8,
  "completeness_score": 0.8,
  "overall_quality": "good",
  "issues": [],
  "strengths": ["content reads coherently"],
  "recommendations": [],
  "passed": true
}"#;

/// Offline judge with a canned answer. Counts its calls so tests can spy on it.
#[derive(Debug, Default)]
pub struct FakeJudgmentClient {
    fixed_response: Option<String>,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl FakeJudgmentClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.fixed_response = Some(response.into());
        self
    }

    /// Every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JudgmentClient for FakeJudgmentClient {
    async fn complete(&self, _request: &JudgmentRequest) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            anyhow::bail!("{}", message);
        }
        Ok(self
            .fixed_response
            .clone()
            .unwrap_or_else(|| DEFAULT_RESPONSE.to_string()))
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::JudgmentResponse;
    use crate::model::QcItem;

    #[tokio::test]
    async fn default_answer_honours_the_contract() {
        let client = FakeJudgmentClient::new();
        let req = JudgmentRequest::from_item(&QcItem::new("1", "t", "u"), 10);
        let raw = client.complete(&req).await.unwrap();
        let parsed = JudgmentResponse::parse(&raw).unwrap();
        assert_eq!(parsed.passed, Some(true));
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn failing_client_errors_and_still_counts() {
        let client = FakeJudgmentClient::failing("backend down");
        let req = JudgmentRequest::from_item(&QcItem::new("1", "t", "u"), 10);
        let err = client.complete(&req).await.unwrap_err();
        assert_eq!(err.to_string(), "backend down");
        assert_eq!(client.call_count(), 1);
    }
}
