use crate::error::ApiLogError;
use crate::record::ApiLogRecord;
use async_trait::async_trait;
use std::sync::Arc;

/// Destination for API call records
///
/// Implementations only need to be correct, not fast or reliable: records are
/// written from a detached task and failures are logged, never returned to the
/// endpoint caller.
#[async_trait]
pub trait ApiLogSink: Send + Sync {
    /// Persist one record.
    ///
    /// # Errors
    /// Any failure to persist; the dispatcher logs it and drops the record.
    async fn record(&self, record: &ApiLogRecord) -> Result<(), ApiLogError>;
}

/// Write `record` on a detached Tokio task.
///
/// Returns immediately. There is no ordering between records and no
/// backpressure; a failed write is reported with `tracing::warn!` only.
pub fn spawn_record(sink: Arc<dyn ApiLogSink>, record: ApiLogRecord) {
    tokio::spawn(async move {
        if let Err(e) = sink.record(&record).await {
            tracing::warn!(
                trace_id = %record.trace_id,
                api = %record.request_api,
                error = %e,
                "failed to write api log record"
            );
        }
    });
}

/// Emits each record as a structured `tracing` event at INFO level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingApiLogSink;

#[async_trait]
impl ApiLogSink for TracingApiLogSink {
    async fn record(&self, record: &ApiLogRecord) -> Result<(), ApiLogError> {
        let elapsed_ms = record
            .response_time
            .signed_duration_since(record.request_time)
            .num_milliseconds();
        tracing::info!(
            target: "union_apilog",
            trace_id = %record.trace_id,
            method = %record.request_method,
            url = %record.request_url,
            api = %record.request_api,
            status = record.response_status_code,
            content_length = record.response_content_length,
            elapsed_ms,
            request_ip = %record.request_ip,
            params = %record.request_params,
            body = %record.response_body,
            host = %record.host.host_name,
            "vendor api call"
        );
        Ok(())
    }
}
