//! Trace-context glue. Real behaviour needs the `otel` feature; without it
//! nothing is injected and there is no trace id to report.

#[cfg(feature = "otel")]
mod enabled {
    use http::{HeaderMap, HeaderName, HeaderValue};
    use opentelemetry::propagation::Injector;
    use opentelemetry::trace::TraceContextExt;
    use tracing_opentelemetry::OpenTelemetrySpanExt;

    struct HeaderSink<'a>(&'a mut HeaderMap);

    impl Injector for HeaderSink<'_> {
        fn set(&mut self, key: &str, value: String) {
            let Ok(name) = HeaderName::from_bytes(key.as_bytes()) else {
                return;
            };
            if let Ok(value) = HeaderValue::try_from(value) {
                self.0.insert(name, value);
            }
        }
    }

    pub fn inject_current_span(headers: &mut HeaderMap) {
        let context = tracing::Span::current().context();
        opentelemetry::global::get_text_map_propagator(|propagator| {
            propagator.inject_context(&context, &mut HeaderSink(headers));
        });
    }

    pub fn current_trace_id() -> Option<String> {
        let context = tracing::Span::current().context();
        let span_ref = context.span();
        let ids = span_ref.span_context();
        ids.is_valid().then(|| ids.trace_id().to_string())
    }
}

#[cfg(not(feature = "otel"))]
mod enabled {
    pub fn inject_current_span(_headers: &mut http::HeaderMap) {}

    pub fn current_trace_id() -> Option<String> {
        None
    }
}

/// Write the current span's context into `headers` (W3C `traceparent`).
pub fn inject_current_span(headers: &mut http::HeaderMap) {
    enabled::inject_current_span(headers);
}

/// 32-hex-digit trace id of the current span, when it has a valid context.
#[must_use]
pub fn current_trace_id() -> Option<String> {
    enabled::current_trace_id()
}
