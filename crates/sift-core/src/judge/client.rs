use crate::model::{QcItem, SourceType};
use async_trait::async_trait;
use serde::Serialize;

/// What the judge gets to see of an item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JudgmentRequest {
    pub title: String,
    pub source_type: SourceType,
    pub source_name: String,
    /// Leading characters of the item content.
    pub content_sample: String,
}

impl JudgmentRequest {
    pub fn from_item(item: &QcItem, sample_chars: usize) -> Self {
        Self {
            title: item.title.clone(),
            source_type: item.source_type.clone(),
            source_name: item.source_name.clone(),
            content_sample: item.content.chars().take(sample_chars).collect(),
        }
    }
}

/// A reasoning backend able to judge a content sample.
///
/// Implementations return the raw response text; decoding and validation of
/// the JSON contract happen in the semantic layer.
#[async_trait]
pub trait JudgmentClient: Send + Sync {
    async fn complete(&self, request: &JudgmentRequest) -> anyhow::Result<String>;

    fn provider_name(&self) -> &'static str;
}
