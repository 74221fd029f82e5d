use bytes::Bytes;
use http::StatusCode;
use thiserror::Error;
use union_http::HttpError;

/// Failure of a vendor API call
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UnionError {
    /// No usable response: network, DNS, TLS, timeout or an unreadable body.
    /// Nothing was decoded and no log record was written.
    #[error("vendor request failed: {0}")]
    Transport(#[from] HttpError),

    /// The vendor answered, but not with the JSON this endpoint expects
    #[error("failed to decode vendor response (HTTP {status}): {source}")]
    Decode {
        status: StatusCode,
        body: Bytes,
        #[source]
        source: serde_json::Error,
    },

    /// Well-formed response with a non-zero vendor status,
    /// produced by [`ApiResult::error_for_status`](crate::ApiResult::error_for_status)
    #[error("vendor error {code}: {message}")]
    Vendor { code: i64, message: String },

    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl UnionError {
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, UnionError::Transport(_))
    }

    /// HTTP status of the response, if one was received.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            UnionError::Decode { status, .. } => Some(*status),
            UnionError::Transport(_) | UnionError::Vendor { .. } | UnionError::Config(_) => None,
        }
    }

    /// Vendor status code for [`UnionError::Vendor`].
    #[must_use]
    pub fn vendor_code(&self) -> Option<i64> {
        match self {
            UnionError::Vendor { code, .. } => Some(*code),
            _ => None,
        }
    }
}
