use crate::error::{BoxError, HttpError};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::{HeaderMap, Method, Response, StatusCode, Uri};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::Instant;

/// Decompressed, type-erased response body
pub type ResponseBody = http_body_util::combinators::BoxBody<Bytes, BoxError>;

/// What was actually put on the wire, captured at send time.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub method: Method,
    /// Full URI, query string included
    pub uri: Uri,
    /// Headers set by the caller; defaults and `traceparent` added by the stack are not included
    pub headers: HeaderMap,
    pub body: Bytes,
    pub sent_at: DateTime<Utc>,
}

/// A completed request/response pair with the body fully read.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub request: RequestMeta,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub received_at: DateTime<Utc>,
}

impl Exchange {
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Response body decoded from JSON.
    ///
    /// # Errors
    /// Returns the `serde_json` error unchanged so callers can attach their own context.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Response with a not-yet-read body
///
/// Every body read is capped at the client's `max_body_size`, measured after
/// decompression, and must finish before the request deadline set at send time.
#[derive(Debug)]
pub struct HttpResponse {
    pub(crate) inner: Response<ResponseBody>,
    pub(crate) max_body_size: usize,
    pub(crate) timeout: Duration,
    pub(crate) deadline: Instant,
    pub(crate) request: RequestMeta,
}

impl HttpResponse {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Snapshot of the request that produced this response
    #[must_use]
    pub fn request(&self) -> &RequestMeta {
        &self.request
    }

    /// # Errors
    /// Returns `HttpError::Status` if the status is not 2xx; the body is not read.
    pub fn error_for_status(self) -> Result<Self, HttpError> {
        let status = self.status();
        if status.is_success() {
            Ok(self)
        } else {
            Err(HttpError::Status(status))
        }
    }

    /// Body bytes regardless of status.
    ///
    /// # Errors
    /// Returns `HttpError::BodyTooLarge` past the client's limit,
    /// `HttpError::Timeout` if the body is still incomplete at the deadline and
    /// `HttpError::Transport` if the connection drops mid-body.
    pub async fn bytes(self) -> Result<Bytes, HttpError> {
        let (limit, timeout, deadline) = (self.max_body_size, self.timeout, self.deadline);
        read_before(self.inner.into_body(), limit, timeout, deadline).await
    }

    /// Read the whole body and pair it with the request snapshot.
    ///
    /// # Errors
    /// Returns everything [`bytes`](Self::bytes) returns.
    pub async fn into_exchange(self) -> Result<Exchange, HttpError> {
        let (parts, body) = self.inner.into_parts();
        let body = read_before(body, self.max_body_size, self.timeout, self.deadline).await?;
        Ok(Exchange {
            request: self.request,
            status: parts.status,
            headers: parts.headers,
            body,
            received_at: Utc::now(),
        })
    }
}

async fn read_before(
    body: ResponseBody,
    limit: usize,
    timeout: Duration,
    deadline: Instant,
) -> Result<Bytes, HttpError> {
    tokio::time::timeout_at(deadline, collect_limited(body, limit))
        .await
        .map_err(|_| HttpError::Timeout(timeout))?
}

async fn collect_limited(body: ResponseBody, limit: usize) -> Result<Bytes, HttpError> {
    let mut collected = Vec::new();
    let mut body = std::pin::pin!(body);

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(HttpError::Transport)?;
        if let Some(chunk) = frame.data_ref() {
            let actual = collected.len() + chunk.len();
            if actual > limit {
                return Err(HttpError::BodyTooLarge { limit, actual });
            }
            collected.extend_from_slice(chunk);
        }
    }

    Ok(Bytes::from(collected))
}
