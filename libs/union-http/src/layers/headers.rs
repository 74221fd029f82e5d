use crate::error::HttpError;
use http::header::{ACCEPT, USER_AGENT};
use http::{HeaderMap, HeaderValue, Request};
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Fills in headers the caller left out: `User-Agent` and `Accept: application/json`.
///
/// Headers already on the request are never replaced.
#[derive(Clone, Debug)]
pub struct DefaultHeadersLayer {
    defaults: HeaderMap,
}

impl DefaultHeadersLayer {
    /// # Errors
    /// Returns `HttpError::InvalidHeader` if `user_agent` is not a valid header value.
    pub fn new(user_agent: &str) -> Result<Self, HttpError> {
        let user_agent = HeaderValue::from_str(user_agent)
            .map_err(|e| HttpError::invalid_header(USER_AGENT.as_str(), &e))?;
        let mut defaults = HeaderMap::with_capacity(2);
        defaults.insert(USER_AGENT, user_agent);
        defaults.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(Self { defaults })
    }
}

impl<S> Layer<S> for DefaultHeadersLayer {
    type Service = DefaultHeaders<S>;

    fn layer(&self, inner: S) -> Self::Service {
        DefaultHeaders {
            inner,
            defaults: self.defaults.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DefaultHeaders<S> {
    inner: S,
    defaults: HeaderMap,
}

impl<S, B> Service<Request<B>> for DefaultHeaders<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let headers = req.headers_mut();
        for (name, value) in &self.defaults {
            if !headers.contains_key(name) {
                headers.insert(name.clone(), value.clone());
            }
        }
        self.inner.call(req)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use http::Response;
    use tower::{ServiceExt, service_fn};

    async fn echo(req: Request<()>) -> Result<Response<HeaderMap>, std::convert::Infallible> {
        Ok(Response::new(req.headers().clone()))
    }

    #[tokio::test]
    async fn test_defaults_added() {
        let svc = DefaultHeadersLayer::new("meituan-union-rs/test")
            .unwrap()
            .layer(service_fn(echo));

        let resp = svc.oneshot(Request::new(())).await.unwrap();
        assert_eq!(resp.body()[USER_AGENT], "meituan-union-rs/test");
        assert_eq!(resp.body()[ACCEPT], "application/json");
    }

    #[tokio::test]
    async fn test_caller_headers_win() {
        let svc = DefaultHeadersLayer::new("meituan-union-rs/test")
            .unwrap()
            .layer(service_fn(echo));

        let req = Request::builder()
            .header(USER_AGENT, "affiliate-backend/2.0")
            .header(ACCEPT, "image/png")
            .body(())
            .unwrap();
        let resp = svc.oneshot(req).await.unwrap();
        assert_eq!(resp.body()[USER_AGENT], "affiliate-backend/2.0");
        assert_eq!(resp.body().get_all(ACCEPT).iter().count(), 1);
        assert_eq!(resp.body()[ACCEPT], "image/png");
    }

    #[test]
    fn test_invalid_user_agent_rejected() {
        let err = DefaultHeadersLayer::new("bad\nagent").unwrap_err();
        assert!(matches!(err, HttpError::InvalidHeader { ref name, .. } if name == "user-agent"));
    }
}
