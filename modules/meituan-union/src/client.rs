use crate::config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, MeituanUnionConfig};
use crate::error::UnionError;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use union_apilog::ApiLogSink;
use union_http::HttpClient;
use url::Url;

/// Meituan Union API client
///
/// Cheap to clone: clones share the HTTP connection pool and the log sink.
/// Credentials are fixed per instance; [`with_credentials`](Self::with_credentials)
/// derives a client for another account.
///
/// ```ignore
/// let client = Client::builder()
///     .credentials("appkey", SecretString::from(secret))
///     .log_sink(Arc::new(TracingApiLogSink))
///     .build()?;
///
/// let link = client.generate_link(4, "sid01", 1, 1).await?.into_result()?;
/// ```
#[derive(Clone)]
pub struct Client {
    pub(crate) http: HttpClient,
    pub(crate) base_url: Url,
    pub(crate) app_key: String,
    pub(crate) secret: SecretString,
    pub(crate) client_ip: String,
    pub(crate) log_sink: Option<Arc<dyn ApiLogSink>>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("app_key", &self.app_key)
            .field("client_ip", &self.client_ip)
            .field("log_sink", &self.log_sink.is_some())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Client with default settings for one account.
    ///
    /// # Errors
    /// Returns [`UnionError::Config`] for empty credentials or a TLS setup failure.
    pub fn new(app_key: impl Into<String>, secret: SecretString) -> Result<Self, UnionError> {
        ClientBuilder::new().credentials(app_key, secret).build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// # Errors
    /// See [`ClientBuilder::build`].
    pub fn from_config(config: &MeituanUnionConfig) -> Result<Self, UnionError> {
        ClientBuilder::from_config(config).build()
    }

    /// Same transport and log sink, different account.
    #[must_use]
    pub fn with_credentials(&self, app_key: impl Into<String>, secret: SecretString) -> Self {
        Self {
            app_key: app_key.into(),
            secret,
            ..self.clone()
        }
    }

    /// Client whose log records carry `client_ip`; empty input is ignored.
    #[must_use]
    pub fn with_client_ip(&self, client_ip: &str) -> Self {
        let mut client = self.clone();
        if !client_ip.is_empty() {
            client_ip.clone_into(&mut client.client_ip);
        }
        client
    }

    /// Client that logs every call to `sink`.
    #[must_use]
    pub fn with_log_sink(&self, sink: Arc<dyn ApiLogSink>) -> Self {
        Self {
            log_sink: Some(sink),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn app_key(&self) -> &str {
        &self.app_key
    }

    #[must_use]
    pub fn secret(&self) -> &SecretString {
        &self.secret
    }

    #[must_use]
    pub fn client_ip(&self) -> &str {
        &self.client_ip
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn log_sink(&self) -> Option<&Arc<dyn ApiLogSink>> {
        self.log_sink.as_ref()
    }
}

/// Builder for [`Client`]
#[must_use]
pub struct ClientBuilder {
    app_key: String,
    secret: SecretString,
    base_url: String,
    timeout: Duration,
    user_agent: Option<String>,
    client_ip: String,
    log_sink: Option<Arc<dyn ApiLogSink>>,
    http: Option<HttpClient>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            app_key: String::new(),
            secret: SecretString::from(String::new()),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            client_ip: String::new(),
            log_sink: None,
            http: None,
        }
    }

    pub fn from_config(config: &MeituanUnionConfig) -> Self {
        let mut builder = Self::new()
            .credentials(config.app_key.clone(), config.secret.clone())
            .base_url(config.base_url.clone())
            .timeout(config.timeout);
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        if let Some(client_ip) = &config.client_ip {
            builder = builder.client_ip(client_ip.clone());
        }
        builder
    }

    pub fn credentials(mut self, app_key: impl Into<String>, secret: SecretString) -> Self {
        self.app_key = app_key.into();
        self.secret = secret;
        self
    }

    /// API root; a trailing `/` is added if missing.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Per-request timeout; ignored when [`http_client`](Self::http_client) is set.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// User-Agent override; ignored when [`http_client`](Self::http_client) is set.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn client_ip(mut self, client_ip: impl Into<String>) -> Self {
        self.client_ip = client_ip.into();
        self
    }

    pub fn log_sink(mut self, sink: Arc<dyn ApiLogSink>) -> Self {
        self.log_sink = Some(sink);
        self
    }

    /// Use a prebuilt HTTP client instead of building one.
    pub fn http_client(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    /// Must be called inside a Tokio runtime unless a prebuilt
    /// [`http_client`](Self::http_client) is supplied.
    ///
    /// # Errors
    /// Returns [`UnionError::Config`] if the app key or secret is empty, the
    /// base URL is not an absolute URL, or the HTTP client cannot be built.
    pub fn build(self) -> Result<Client, UnionError> {
        if self.app_key.trim().is_empty() {
            return Err(UnionError::Config("app key must not be empty".to_owned()));
        }
        if self.secret.expose_secret().is_empty() {
            return Err(UnionError::Config("secret must not be empty".to_owned()));
        }

        let mut base_url = Url::parse(&self.base_url)
            .map_err(|e| UnionError::Config(format!("invalid base URL '{}': {e}", self.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(UnionError::Config(format!(
                "base URL '{}' cannot be joined with API paths",
                self.base_url
            )));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = match self.http {
            Some(http) => http,
            None => {
                let mut builder = HttpClient::builder().timeout(self.timeout);
                if let Some(user_agent) = self.user_agent {
                    builder = builder.user_agent(user_agent);
                }
                builder
                    .build()
                    .map_err(|e| UnionError::Config(format!("failed to build HTTP client: {e}")))?
            }
        };

        Ok(Client {
            http,
            base_url,
            app_key: self.app_key,
            secret: self.secret,
            client_ip: self.client_ip,
            log_sink: self.log_sink,
        })
    }
}
