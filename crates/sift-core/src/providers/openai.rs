use crate::judge::prompt::{build_prompt, SYSTEM_PROMPT};
use crate::judge::{JudgmentClient, JudgmentRequest};
use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Judge backed by the OpenAI chat-completions API (or any compatible endpoint).
pub struct OpenAIJudgmentClient {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAIJudgmentClient {
    pub fn new(model: String, api_key: String, temperature: f32, max_tokens: u32) -> Self {
        Self {
            model,
            temperature,
            max_tokens,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Reads `OPENAI_API_KEY` and, when set, `OPENAI_BASE_URL`.
    pub fn from_env(model: String, temperature: f32, max_tokens: u32) -> anyhow::Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .context("config error: OPENAI_API_KEY is not set (use --judge fake or none to run offline)")?;
        let mut client = Self::new(model, api_key, temperature, max_tokens);
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            client = client.with_base_url(base_url);
        }
        Ok(client)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl JudgmentClient for OpenAIJudgmentClient {
    async fn complete(&self, request: &JudgmentRequest) -> anyhow::Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": build_prompt(request)},
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "response_format": {"type": "json_object"},
        });

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI chat API error (status {}): {}", status, error_text);
        }

        let json: serde_json::Value = resp.json().await?;
        extract_content(&json)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

fn extract_content(json: &serde_json::Value) -> anyhow::Result<String> {
    json.pointer("/choices/0/message/content")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("OpenAI API response missing content"))
}
