use http::StatusCode;
use std::time::Duration;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of an outbound call
///
/// Only [`Status`](Self::Status) and [`BodyTooLarge`](Self::BodyTooLarge)
/// mean a response arrived; see [`is_transport`](Self::is_transport).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HttpError {
    #[error("invalid request: {0}")]
    Request(#[from] http::Error),

    #[error("invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// `http://` without [`TransportSecurity::AllowInsecureHttp`], or a non-HTTP scheme
    ///
    /// [`TransportSecurity::AllowInsecureHttp`]: crate::TransportSecurity::AllowInsecureHttp
    #[error("URL scheme '{0}' is not allowed")]
    SchemeNotAllowed(String),

    #[error("failed to encode JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to encode query string: {0}")]
    Query(#[from] serde_urlencoded::ser::Error),

    #[error("no response within {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Network, DNS or connection failure
    #[error("connection failed: {0}")]
    Transport(#[source] BoxError),

    #[error("TLS setup failed: {0}")]
    Tls(#[source] BoxError),

    /// Request queue full; the call was not attempted
    #[error("request queue is full")]
    Overloaded,

    /// The queue worker is gone
    #[error("HTTP client is shut down")]
    ServiceClosed,

    /// Non-2xx status, from [`HttpResponse::error_for_status`](crate::HttpResponse::error_for_status)
    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),

    #[error("response body exceeds {limit} bytes (read {actual})")]
    BodyTooLarge { limit: usize, actual: usize },
}

impl HttpError {
    /// No usable response was received.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        !matches!(self, Self::Status(_) | Self::BodyTooLarge { .. })
    }

    pub(crate) fn invalid_header(name: &str, reason: &dyn std::fmt::Display) -> Self {
        Self::InvalidHeader {
            name: name.to_owned(),
            reason: reason.to_string(),
        }
    }
}

impl From<hyper::Error> for HttpError {
    fn from(err: hyper::Error) -> Self {
        Self::Transport(Box::new(err))
    }
}

impl From<hyper_util::client::legacy::Error> for HttpError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        Self::Transport(Box::new(err))
    }
}
