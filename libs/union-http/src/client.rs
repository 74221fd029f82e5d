use crate::builder::HttpClientBuilder;
use crate::config::TransportSecurity;
use crate::error::HttpError;
use crate::request::RequestBuilder;
use crate::response::ResponseBody;
use bytes::Bytes;
use http::{Method, Request, Response};
use http_body_util::Full;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tower::buffer::Buffer;

pub type ResponseFuture =
    Pin<Box<dyn Future<Output = Result<Response<ResponseBody>, HttpError>> + Send>>;

/// The whole middleware stack behind a bounded queue
pub type QueuedService = Buffer<Request<Full<Bytes>>, ResponseFuture>;

/// Client for the vendor's HTTPS endpoints
///
/// Build it once and clone it freely: clones share the connection pool and
/// the request queue.
#[derive(Clone)]
pub struct HttpClient {
    pub(crate) service: QueuedService,
    pub(crate) max_body_size: usize,
    pub(crate) request_timeout: Duration,
    pub(crate) transport: TransportSecurity,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("max_body_size", &self.max_body_size)
            .field("request_timeout", &self.request_timeout)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Client with default settings; requires a Tokio runtime.
    ///
    /// # Errors
    /// See [`HttpClientBuilder::build`].
    pub fn new() -> Result<Self, HttpError> {
        HttpClientBuilder::new().build()
    }

    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Absolute `url` only; the query string may be extended with
    /// [`RequestBuilder::query`].
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        RequestBuilder::new(self.clone(), method, url)
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.request(Method::POST, url)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::HttpClientConfig;
    use httpmock::prelude::*;
    use serde_json::json;

    fn mock_client() -> HttpClient {
        HttpClientBuilder::with_config(HttpClientConfig::for_testing())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_error_status_is_not_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/poi/city");
            then.status(502).body("bad gateway");
        });

        let resp = mock_client()
            .get(&server.url("/poi/city"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), http::StatusCode::BAD_GATEWAY);
        assert!(matches!(
            resp.error_for_status(),
            Err(HttpError::Status(http::StatusCode::BAD_GATEWAY))
        ));
    }

    #[tokio::test]
    async fn test_post_sends_json() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/api/generateLink")
                .header("content-type", "application/json")
                .header("accept", "application/json")
                .json_body(json!({"sid": "s1", "actId": 2}));
            then.status(200).json_body(json!({"status": 0}));
        });

        let body = mock_client()
            .post(&server.url("/api/generateLink"))
            .json(&json!({"sid": "s1", "actId": 2}))
            .unwrap()
            .send()
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap();
        m.assert();
        assert_eq!(body.as_ref(), br#"{"status":0}"#);
    }

    #[tokio::test]
    async fn test_plain_http_rejected_by_default() {
        let client = HttpClientBuilder::new().trace_requests(false).build().unwrap();
        let err = client
            .get("http://127.0.0.1:1/poi/city")
            .send()
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::SchemeNotAllowed(ref s) if s == "http"));
    }

    #[tokio::test]
    async fn test_debug_hides_stack() {
        let rendered = format!("{:?}", mock_client());
        assert!(rendered.starts_with("HttpClient"));
        assert!(rendered.contains("AllowInsecureHttp"));
    }
}
