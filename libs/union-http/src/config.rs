use std::time::Duration;

/// Sent when the caller does not set a `User-Agent`
pub const DEFAULT_USER_AGENT: &str = concat!("meituan-union-rs/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Vendor responses are small JSON documents; a larger body is a broken response.
pub const DEFAULT_MAX_BODY_SIZE: usize = 4 * 1024 * 1024;

/// Where trusted CA certificates come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TlsRoots {
    /// Bundled Mozilla roots
    #[default]
    WebPki,
    /// OS certificate store
    Native,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportSecurity {
    /// `https://` only
    #[default]
    TlsOnly,
    /// `http://` accepted too; for mock servers
    AllowInsecureHttp,
}

/// Settings for [`HttpClient`](crate::HttpClient)
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Whole exchange: connect, response head and body read
    pub request_timeout: Duration,
    /// Cap on a decompressed response body
    pub max_body_size: usize,
    pub user_agent: String,
    pub transport: TransportSecurity,
    pub tls_roots: TlsRoots,
    /// Open a client span per request and propagate trace context
    pub trace_requests: bool,
    /// Requests waiting for the connection pool; more fail with `Overloaded`
    pub queue_capacity: usize,
    /// `None` keeps idle connections open
    pub pool_idle_timeout: Option<Duration>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            transport: TransportSecurity::TlsOnly,
            tls_roots: TlsRoots::WebPki,
            trace_requests: true,
            queue_capacity: 256,
            pool_idle_timeout: Some(Duration::from_secs(90)),
        }
    }
}

impl HttpClientConfig {
    /// Plain HTTP, short timeouts, no request spans. Mock servers only.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            max_body_size: 1024 * 1024,
            transport: TransportSecurity::AllowInsecureHttp,
            trace_requests: false,
            queue_capacity: 64,
            pool_idle_timeout: Some(Duration::from_secs(5)),
            ..Self::default()
        }
    }
}
