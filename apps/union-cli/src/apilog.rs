//! API call log wiring for one CLI invocation.

use crate::config::ApiLogConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use union_apilog::{
    ApiLogError, ApiLogRecord, ApiLogSink, DEFAULT_TABLE, SeaOrmApiLogSink, TracingApiLogSink,
};

/// Records are written on detached tasks, so the process waits for them
/// before it exits. Counts finished writes, successful or not.
pub struct CountingSink {
    inner: Arc<dyn ApiLogSink>,
    written: watch::Sender<usize>,
}

impl CountingSink {
    #[must_use]
    pub fn new(inner: Arc<dyn ApiLogSink>) -> (Arc<Self>, LogWrites) {
        let (written, rx) = watch::channel(0);
        (Arc::new(Self { inner, written }), LogWrites(rx))
    }
}

#[async_trait]
impl ApiLogSink for CountingSink {
    async fn record(&self, record: &ApiLogRecord) -> Result<(), ApiLogError> {
        let result = self.inner.record(record).await;
        self.written.send_modify(|n| *n += 1);
        result
    }
}

/// Handle to wait for writes issued through a [`CountingSink`].
pub struct LogWrites(watch::Receiver<usize>);

impl LogWrites {
    /// Wait until `expected` records were written or `timeout` passes.
    /// Returns whether all of them made it.
    pub async fn wait_for(&mut self, expected: usize, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.0.wait_for(|n| *n >= expected))
            .await
            .is_ok_and(|r| r.is_ok())
    }
}

/// Sink for the configured destination: a database table when a URL is set,
/// the tracing log otherwise.
///
/// # Errors
/// Fails when the database cannot be reached, the table cannot be created or
/// pruning fails.
pub async fn build_sink(config: &ApiLogConfig) -> Result<Arc<dyn ApiLogSink>> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::debug!("api log goes to tracing");
        return Ok(Arc::new(TracingApiLogSink));
    };

    let table = config.table.as_deref().unwrap_or(DEFAULT_TABLE);
    let sink = SeaOrmApiLogSink::connect(database_url, table)
        .await
        .with_context(|| format!("failed to open api log table '{table}'"))?;

    if let Some(hours) = config.prune_older_than_hours {
        let removed = sink
            .prune_older_than(hours)
            .await
            .context("failed to prune api log")?;
        tracing::info!(table, hours, removed, "pruned api log");
    }

    Ok(Arc::new(sink))
}
