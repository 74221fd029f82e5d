use uuid::Uuid;

/// Trace id for one vendor call
///
/// The OpenTelemetry trace id of the current span when there is one (`otel`
/// feature), otherwise a fresh random id. Always 32 lowercase hex characters.
#[must_use]
pub fn trace_id() -> String {
    union_http::otel::current_trace_id().unwrap_or_else(|| Uuid::new_v4().simple().to_string())
}
