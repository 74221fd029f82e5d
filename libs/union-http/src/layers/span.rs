use bytes::Bytes;
use http::{Request, Response, Uri};
use http_body_util::Full;
use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};
use tracing::{Instrument, Span, field};

/// One `http.client` span per outbound request.
///
/// The URL is recorded without its query string, which carries `appkey` and
/// `sign`. With the `otel` feature the span's context goes out as `traceparent`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClientSpanLayer;

impl<S> Layer<S> for ClientSpanLayer {
    type Service = ClientSpan<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ClientSpan { inner }
    }
}

#[derive(Clone, Debug)]
pub struct ClientSpan<S> {
    inner: S,
}

fn url_without_query(uri: &Uri) -> String {
    let authority = uri.authority().map_or("", http::uri::Authority::as_str);
    match uri.scheme_str() {
        Some(scheme) => format!("{scheme}://{authority}{}", uri.path()),
        None => format!("{authority}{}", uri.path()),
    }
}

fn record_outcome<B, E: Display>(span: &Span, result: &Result<Response<B>, E>, started: Instant) {
    span.record(
        "elapsed_ms",
        u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
    );
    match result {
        Ok(response) => {
            let status = response.status();
            span.record("http.status_code", status.as_u16());
            if status.is_client_error() || status.is_server_error() {
                span.record("error", true);
            }
        }
        Err(err) => {
            span.record("error", true);
            tracing::debug!(parent: span, error = %err, "request failed");
        }
    }
}

impl<S, B> Service<Request<Full<Bytes>>> for ClientSpan<S>
where
    S: Service<Request<Full<Bytes>>, Response = Response<B>> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: Display + Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Full<Bytes>>) -> Self::Future {
        let span = tracing::info_span!(
            "http.client",
            otel.kind = "client",
            http.method = %req.method(),
            http.url = %url_without_query(req.uri()),
            http.status_code = field::Empty,
            elapsed_ms = field::Empty,
            error = field::Empty,
        );
        span.in_scope(|| crate::otel::inject_current_span(req.headers_mut()));

        // The ready service handles this call; its clone waits for the next poll_ready.
        let ready = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, ready);

        Box::pin(async move {
            let started = Instant::now();
            let result = inner.call(req).instrument(span.clone()).await;
            record_outcome(&span, &result, started);
            result
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use tower::{ServiceExt, service_fn};

    #[test]
    fn test_query_not_recorded() {
        let uri = Uri::from_static("https://openapi.meituan.com/api/miniCode?appkey=k&sign=abc");
        assert_eq!(
            url_without_query(&uri),
            "https://openapi.meituan.com/api/miniCode"
        );
    }

    #[test]
    fn test_relative_uri() {
        assert_eq!(url_without_query(&Uri::from_static("/poi/city?cityid=1")), "/poi/city");
    }

    #[tokio::test]
    async fn test_response_passes_through() {
        let svc = ClientSpanLayer.layer(service_fn(|_req: Request<Full<Bytes>>| async {
            Ok::<_, std::convert::Infallible>(
                Response::builder().status(503).body(()).unwrap(),
            )
        }));

        let resp = svc
            .oneshot(Request::new(Full::new(Bytes::new())))
            .await
            .unwrap();
        assert_eq!(resp.status(), 503);
    }
}
