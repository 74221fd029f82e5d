use crate::error::UnionError;
use crate::models::VendorResponse;
use crate::params::Params;
use bytes::Bytes;
use chrono::{DateTime, TimeDelta, Utc};
use http::{HeaderMap, Method, StatusCode, Uri};
use union_http::Exchange;

/// What went over the wire for one call
#[derive(Debug, Clone)]
pub struct HttpSnapshot {
    pub trace_id: String,
    pub method: Method,
    /// Full request URI, query string included
    pub uri: Uri,
    /// Parameters as sent, `appkey`, `ts` and `sign` included
    pub params: Params,
    pub request_headers: HeaderMap,
    pub status: StatusCode,
    pub response_headers: HeaderMap,
    pub request_time: DateTime<Utc>,
    pub response_time: DateTime<Utc>,
}

impl HttpSnapshot {
    /// Split an exchange into its snapshot and body.
    #[must_use]
    pub fn from_exchange(exchange: Exchange, trace_id: String, params: Params) -> (Self, Bytes) {
        let snapshot = Self {
            trace_id,
            method: exchange.request.method,
            uri: exchange.request.uri,
            params,
            request_headers: exchange.request.headers,
            status: exchange.status,
            response_headers: exchange.headers,
            request_time: exchange.request.sent_at,
            response_time: exchange.received_at,
        };
        (snapshot, exchange.body)
    }

    #[must_use]
    pub fn elapsed(&self) -> TimeDelta {
        self.response_time.signed_duration_since(self.request_time)
    }
}

/// Outcome of a typed endpoint call
///
/// A vendor-reported failure is still an `Ok(ApiResult)`: inspect
/// [`is_success`](Self::is_success) or use
/// [`error_for_status`](Self::error_for_status) to turn it into an error.
#[derive(Debug, Clone)]
pub struct ApiResult<R> {
    pub result: R,
    /// Raw response body
    pub body: Bytes,
    pub http: HttpSnapshot,
}

impl<R: VendorResponse> ApiResult<R> {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }

    /// # Errors
    /// Returns [`UnionError::Vendor`] when the vendor status is non-zero.
    pub fn error_for_status(self) -> Result<Self, UnionError> {
        if self.is_success() {
            return Ok(self);
        }
        Err(UnionError::Vendor {
            code: self.result.code(),
            message: self.result.message().to_owned(),
        })
    }

    /// Typed payload if the vendor reported success.
    ///
    /// # Errors
    /// Returns [`UnionError::Vendor`] when the vendor status is non-zero.
    pub fn into_result(self) -> Result<R, UnionError> {
        self.error_for_status().map(|r| r.result)
    }
}

/// Outcome of an untyped call made with [`Client::request`](crate::Client::request)
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub body: Bytes,
    pub http: HttpSnapshot,
}

impl RawResponse {
    /// Decode the body as `T`.
    ///
    /// # Errors
    /// Returns [`UnionError::Decode`] with the body and status attached.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, UnionError> {
        serde_json::from_slice(&self.body).map_err(|source| UnionError::Decode {
            status: self.http.status,
            body: self.body.clone(),
            source,
        })
    }
}
