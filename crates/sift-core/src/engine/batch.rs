use super::Orchestrator;
use crate::model::{QcItem, QcResult};
use anyhow::Context;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

impl Orchestrator {
    /// Validates `items` with at most `parallel` validations in flight.
    ///
    /// Items complete in any order; results are returned in input order.
    pub async fn validate_batch(
        self: Arc<Self>,
        items: Vec<QcItem>,
        enable_semantic: bool,
        parallel: usize,
    ) -> anyhow::Result<Vec<QcResult>> {
        let sem = Arc::new(Semaphore::new(parallel.max(1)));
        let mut join_set = JoinSet::new();
        let total = items.len();

        for (idx, item) in items.into_iter().enumerate() {
            let permit = sem.clone().acquire_owned().await?;
            let this = Arc::clone(&self);
            join_set.spawn(async move {
                let _permit = permit;
                (idx, this.validate_with(&item, enable_semantic).await)
            });
        }

        let mut slots: Vec<Option<QcResult>> = vec![None; total];
        while let Some(joined) = join_set.join_next().await {
            let (idx, result) = joined.context("validation task failed")?;
            slots[idx] = Some(result);
        }
        Ok(slots.into_iter().flatten().collect())
    }
}
