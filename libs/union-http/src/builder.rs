use crate::client::{HttpClient, QueuedService};
use crate::config::{HttpClientConfig, TlsRoots, TransportSecurity};
use crate::error::HttpError;
use crate::layers::{ClientSpanLayer, DefaultHeadersLayer};
use crate::response::ResponseBody;
use crate::tls::https_connector;
use bytes::Bytes;
use http::Response;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use std::time::Duration;
use tower::buffer::Buffer;
use tower::timeout::TimeoutLayer;
use tower::util::BoxCloneService;
use tower::{Layer, ServiceBuilder, ServiceExt};
use tower_http::decompression::DecompressionLayer;

type Stack = BoxCloneService<http::Request<Full<Bytes>>, Response<ResponseBody>, HttpError>;

/// Builder for [`HttpClient`]
///
/// The stack, outermost first: queue, client span (optional), timeout,
/// default headers, decompression, hyper.
#[must_use]
pub struct HttpClientBuilder {
    config: HttpClientConfig,
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self::with_config(HttpClientConfig::default())
    }

    pub fn with_config(config: HttpClientConfig) -> Self {
        Self { config }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    pub fn tls_roots(mut self, tls_roots: TlsRoots) -> Self {
        self.config.tls_roots = tls_roots;
        self
    }

    /// Accept `http://` URLs. Debug builds or the `allow-insecure-http` feature only.
    #[cfg(any(debug_assertions, feature = "allow-insecure-http"))]
    pub fn allow_insecure_http(mut self) -> Self {
        self.config.transport = TransportSecurity::AllowInsecureHttp;
        self
    }

    pub fn trace_requests(mut self, enabled: bool) -> Self {
        self.config.trace_requests = enabled;
        self
    }

    /// At least 1
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity.max(1);
        self
    }

    pub fn pool_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    /// Build the client. Needs a Tokio runtime: the queue spawns its worker.
    ///
    /// # Errors
    /// Returns `HttpError::Tls` if the connector cannot be built and
    /// `HttpError::InvalidHeader` for an unusable user agent.
    pub fn build(self) -> Result<HttpClient, HttpError> {
        let config = self.config;
        if config.transport == TransportSecurity::AllowInsecureHttp {
            tracing::warn!(
                target: "union_http::security",
                "plain HTTP allowed; vendor traffic will not be encrypted"
            );
        }

        let connector = https_connector(config.tls_roots, config.transport)?;
        let mut pool = Client::builder(TokioExecutor::new());
        pool.pool_timer(TokioTimer::new());
        if let Some(idle) = config.pool_idle_timeout {
            pool.pool_idle_timeout(idle);
        }
        let hyper_client = pool.build::<_, Full<Bytes>>(connector);

        let timeout = config.request_timeout;
        let stack: Stack = ServiceBuilder::new()
            .layer(TimeoutLayer::new(timeout))
            .layer(DefaultHeadersLayer::new(&config.user_agent)?)
            .layer(DecompressionLayer::new())
            .service(hyper_client)
            .map_response(erase_body)
            .map_err(move |e: tower::BoxError| classify(e, timeout))
            .boxed_clone();

        let stack = if config.trace_requests {
            ClientSpanLayer.layer(stack).boxed_clone()
        } else {
            stack
        };

        let service: QueuedService = Buffer::new(stack, config.queue_capacity.max(1));

        tracing::debug!(
            timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            max_body_size = config.max_body_size,
            trace_requests = config.trace_requests,
            "http client ready"
        );

        Ok(HttpClient {
            service,
            max_body_size: config.max_body_size,
            request_timeout: timeout,
            transport: config.transport,
        })
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Timeout elapsed, a typed error from an inner layer, or a transport failure.
fn classify(err: tower::BoxError, timeout: Duration) -> HttpError {
    if err.is::<tower::timeout::error::Elapsed>() {
        return HttpError::Timeout(timeout);
    }
    err.downcast::<HttpError>()
        .map_or_else(HttpError::Transport, |typed| *typed)
}

fn erase_body<B>(response: Response<B>) -> Response<ResponseBody>
where
    B: hyper::body::Body<Data = Bytes> + Send + Sync + 'static,
    B::Error: Into<tower::BoxError>,
{
    response.map(|body| body.map_err(Into::into).boxed())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::DEFAULT_USER_AGENT;

    #[test]
    fn test_setters() {
        let builder = HttpClientBuilder::new()
            .timeout(Duration::from_secs(3))
            .user_agent("affiliate/1.0")
            .max_body_size(512)
            .queue_capacity(0)
            .trace_requests(false)
            .pool_idle_timeout(None)
            .tls_roots(TlsRoots::Native);

        let config = builder.config;
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.user_agent, "affiliate/1.0");
        assert_eq!(config.max_body_size, 512);
        assert_eq!(config.queue_capacity, 1);
        assert!(!config.trace_requests);
        assert!(config.pool_idle_timeout.is_none());
        assert_eq!(config.tls_roots, TlsRoots::Native);
    }

    #[test]
    fn test_default_user_agent() {
        assert_eq!(HttpClientBuilder::default().config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_classify() {
        let typed: tower::BoxError = Box::new(HttpError::Overloaded);
        assert!(matches!(
            classify(typed, Duration::from_secs(1)),
            HttpError::Overloaded
        ));

        let other: tower::BoxError = "connection refused".into();
        assert!(matches!(
            classify(other, Duration::from_secs(1)),
            HttpError::Transport(_)
        ));
    }

    #[tokio::test]
    async fn test_bad_user_agent_fails_build() {
        let result = HttpClientBuilder::new().user_agent("bad\nagent").build();
        assert!(matches!(result, Err(HttpError::InvalidHeader { .. })));
    }

    #[tokio::test]
    async fn test_build_with_and_without_spans() {
        assert!(HttpClientBuilder::new().trace_requests(true).build().is_ok());
        assert!(HttpClientBuilder::new().trace_requests(false).build().is_ok());
    }
}
