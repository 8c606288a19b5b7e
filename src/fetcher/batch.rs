//! Batch entry points: size checks, then one task-unit call per index.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::FactFetcher;
use crate::error::{Error, Result};
use crate::types::{Batch, Fact};

impl FactFetcher {
    /// Fetch `count` facts concurrently.
    ///
    /// Returns one outcome per index, in index order, once every task has
    /// finished. Individual failures are recorded in the batch; the call
    /// itself only fails when `count` exceeds `batch.max_size`.
    pub async fn fetch_batch(&self, count: usize) -> Result<Batch<Fact>> {
        self.fetch_batch_until_cancelled(count, CancellationToken::new())
            .await
    }

    /// Fetch `batch.default_size` facts
    pub async fn fetch_default_batch(&self) -> Result<Batch<Fact>> {
        self.fetch_batch(self.config.batch.default_size).await
    }

    /// Like [`fetch_batch`](Self::fetch_batch), but tasks still in flight
    /// when `cancel` fires record a cancellation instead of a fact.
    pub async fn fetch_batch_until_cancelled(
        &self,
        count: usize,
        cancel: CancellationToken,
    ) -> Result<Batch<Fact>> {
        self.check_batch_size(count)?;

        let batch = self
            .coordinator
            .run_until_cancelled(
                count,
                |index| {
                    let source = Arc::clone(&self.source);
                    async move { source.fetch_fact(index).await }
                },
                cancel,
            )
            .await;

        Ok(batch)
    }

    /// Reject batches larger than the configured maximum
    pub(crate) fn check_batch_size(&self, count: usize) -> Result<()> {
        let max = self.config.batch.max_size;
        if count > max {
            tracing::warn!(requested = count, max, "Rejected oversized batch");
            return Err(Error::BatchTooLarge {
                requested: count,
                max,
            });
        }
        Ok(())
    }
}
