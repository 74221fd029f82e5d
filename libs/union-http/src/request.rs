use crate::client::{HttpClient, QueuedService};
use crate::config::TransportSecurity;
use crate::error::HttpError;
use crate::response::{HttpResponse, RequestMeta};
use bytes::Bytes;
use chrono::Utc;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::{HeaderMap, Method, Request, Uri};
use http_body_util::Full;
use serde::Serialize;
use std::task::Poll;
use tokio::time::Instant;
use tower::Service;

/// Request under construction
///
/// Header and query encoding errors are held until [`send`](Self::send).
#[must_use = "a request is only sent by .send()"]
pub struct RequestBuilder {
    client: HttpClient,
    method: Method,
    url: String,
    headers: HeaderMap,
    body: Option<Bytes>,
    deferred: Option<HttpError>,
}

impl RequestBuilder {
    pub(crate) fn new(client: HttpClient, method: Method, url: &str) -> Self {
        Self {
            client,
            method,
            url: url.to_owned(),
            headers: HeaderMap::new(),
            body: None,
            deferred: None,
        }
    }

    /// Append a header; a caller-set `Content-Type` replaces the JSON default.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if self.deferred.is_none() {
            let parsed = HeaderName::try_from(name)
                .map_err(|e| HttpError::invalid_header(name, &e))
                .and_then(|n| {
                    HeaderValue::try_from(value)
                        .map(|v| (n, v))
                        .map_err(|e| HttpError::invalid_header(name, &e))
                });
            match parsed {
                Ok((name, value)) => {
                    self.headers.append(name, value);
                }
                Err(e) => self.deferred = Some(e),
            }
        }
        self
    }

    /// URL-encode `query` (pairs, maps or flat structs) onto the URL.
    pub fn query<T: Serialize + ?Sized>(mut self, query: &T) -> Self {
        if self.deferred.is_some() {
            return self;
        }
        match serde_urlencoded::to_string(query) {
            Ok(encoded) => {
                if !encoded.is_empty() {
                    self.url.push(if self.url.contains('?') { '&' } else { '?' });
                    self.url.push_str(&encoded);
                }
            }
            Err(e) => self.deferred = Some(e.into()),
        }
        self
    }

    /// JSON request body.
    ///
    /// # Errors
    /// Returns `HttpError::Json` if `body` cannot be serialized, or an earlier
    /// deferred header or query error.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, HttpError> {
        if let Some(e) = self.deferred.take() {
            return Err(e);
        }
        self.body = Some(Bytes::from(serde_json::to_vec(body)?));
        if !self.headers.contains_key(CONTENT_TYPE) {
            self.headers
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        Ok(self)
    }

    /// Send the request; any HTTP status resolves to `Ok`.
    ///
    /// # Errors
    /// A deferred builder error, `InvalidUrl`, `SchemeNotAllowed`,
    /// `Overloaded` when the queue is full, or `Timeout`/`Transport` when no
    /// response head arrived. The client's request timeout starts here and
    /// also bounds the body read.
    pub async fn send(mut self) -> Result<HttpResponse, HttpError> {
        if let Some(e) = self.deferred.take() {
            return Err(e);
        }
        let deadline = Instant::now() + self.client.request_timeout;
        let uri = parse_url(&self.url, self.client.transport)?;
        let body = self.body.unwrap_or_default();

        let mut request = Request::builder()
            .method(self.method.clone())
            .uri(uri.clone())
            .body(Full::new(body.clone()))?;
        request.headers_mut().clone_from(&self.headers);

        let meta = RequestMeta {
            method: self.method,
            uri,
            headers: self.headers,
            body,
            sent_at: Utc::now(),
        };

        let mut service = self.client.service;
        reserve_slot(&mut service).await?;
        let inner = service.call(request).await.map_err(unqueue_error)?;

        Ok(HttpResponse {
            inner,
            max_body_size: self.client.max_body_size,
            timeout: self.client.request_timeout,
            deadline,
            request: meta,
        })
    }
}

fn parse_url(url: &str, transport: TransportSecurity) -> Result<Uri, HttpError> {
    let invalid = |reason: String| HttpError::InvalidUrl {
        url: url.to_owned(),
        reason,
    };
    let uri: Uri = url.parse().map_err(|e: http::uri::InvalidUri| invalid(e.to_string()))?;
    if uri.authority().is_none() {
        return Err(invalid("not an absolute URL".to_owned()));
    }
    match (uri.scheme_str(), transport) {
        (Some("https"), _) | (Some("http"), TransportSecurity::AllowInsecureHttp) => Ok(uri),
        (Some(scheme), _) => Err(HttpError::SchemeNotAllowed(scheme.to_owned())),
        (None, _) => Err(invalid("missing scheme".to_owned())),
    }
}

/// A full queue fails the call at once instead of waiting.
async fn reserve_slot(service: &mut QueuedService) -> Result<(), HttpError> {
    let ready = std::future::poll_fn(|cx| Poll::Ready(service.poll_ready(cx))).await;
    match ready {
        Poll::Ready(Ok(())) => Ok(()),
        Poll::Ready(Err(e)) => Err(unqueue_error(e)),
        Poll::Pending => Err(HttpError::Overloaded),
    }
}

/// The queue boxes the stack's `HttpError`; anything else means its worker died.
fn unqueue_error(err: tower::BoxError) -> HttpError {
    err.downcast::<HttpError>().map_or_else(
        |err| {
            tracing::error!(error = %err, "request queue worker stopped");
            HttpError::ServiceClosed
        },
        |err| *err,
    )
}
