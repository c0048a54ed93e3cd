pub mod fake;
pub mod openai;

use crate::config::{Provider, SemanticSettings};
use crate::judge::JudgmentClient;
use std::sync::Arc;

/// Builds the judgment backend selected in the settings; `None` when semantic
/// validation is switched off.
pub fn build_client(settings: &SemanticSettings) -> anyhow::Result<Option<Arc<dyn JudgmentClient>>> {
    if !settings.enabled {
        return Ok(None);
    }
    let client: Arc<dyn JudgmentClient> = match settings.provider {
        Provider::None => return Ok(None),
        Provider::Fake => Arc::new(fake::FakeJudgmentClient::new()),
        Provider::OpenAi => Arc::new(openai::OpenAIJudgmentClient::from_env(
            settings.model.clone(),
            settings.temperature,
            settings.max_tokens,
        )?),
    };
    Ok(Some(client))
}
