use crate::client::Client;
use crate::error::UnionError;
use crate::models::VendorResponse;
use crate::params::Params;
use crate::result::{ApiResult, HttpSnapshot, RawResponse};
use crate::sign::{SIGN_KEY, sign};
use crate::trace;
use bytes::Bytes;
use chrono::Utc;
use http::Method;
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{Instrument, Span, field};
use union_apilog::{ApiLogRecord, RecordContext, spawn_record};
use union_http::{Exchange, HttpError, RequestBuilder};

/// Version written into every log record
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Authentication parameters an endpoint expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signing {
    /// Parameters are sent as given
    None,
    /// `appkey` and `sign` are attached
    Signed,
    /// `ts` (Unix seconds, valid for 60 s), `appkey` and `sign` are attached
    SignedWithTimestamp,
}

impl Client {
    /// `params` with the authentication parameters `signing` requires.
    ///
    /// `sign` is computed last, over everything else.
    #[must_use]
    pub fn prepare_params(&self, signing: Signing, mut params: Params) -> Params {
        if signing == Signing::None {
            return params;
        }
        if signing == Signing::SignedWithTimestamp {
            params.set("ts", Utc::now().timestamp());
        }
        params.set("appkey", self.app_key.as_str());
        let signature = sign(&params, self.secret.expose_secret());
        params.set(SIGN_KEY, signature);
        params
    }

    /// Call any API path and return the body untouched.
    ///
    /// `GET` sends the parameters as a query string, every other method as a
    /// JSON body.
    ///
    /// # Errors
    /// Returns [`UnionError::Transport`] when no response arrived and
    /// [`UnionError::Config`] for a path that cannot be joined to the base URL.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        signing: Signing,
        params: Params,
    ) -> Result<RawResponse, UnionError> {
        let span = call_span(&method, path);
        let (http, body) = self
            .execute(method, path, signing, params)
            .instrument(span)
            .await?;
        Ok(RawResponse { body, http })
    }

    /// `GET path` decoded into `R`.
    pub(crate) async fn call<R: VendorResponse>(
        &self,
        path: &'static str,
        signing: Signing,
        params: Params,
    ) -> Result<ApiResult<R>, UnionError> {
        let span = call_span(&Method::GET, path);
        async {
            let (http, body) = self.execute(Method::GET, path, signing, params).await?;
            match serde_json::from_slice::<R>(&body) {
                Ok(result) => {
                    Span::current().record("vendor.code", result.code());
                    if !result.is_success() {
                        tracing::debug!(
                            code = result.code(),
                            message = result.message(),
                            "vendor reported failure"
                        );
                    }
                    Ok(ApiResult { result, body, http })
                }
                Err(source) => {
                    Span::current().record("error", true);
                    tracing::warn!(
                        status = http.status.as_u16(),
                        error = %source,
                        "failed to decode vendor response"
                    );
                    Err(UnionError::Decode {
                        status: http.status,
                        body,
                        source,
                    })
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        signing: Signing,
        params: Params,
    ) -> Result<(HttpSnapshot, Bytes), UnionError> {
        let span = Span::current();
        let params = self.prepare_params(signing, params);
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| UnionError::Config(format!("invalid API path '{path}': {e}")))?;

        let trace_id = trace::trace_id();
        span.record("http.url", url.as_str());
        span.record("trace_id", trace_id.as_str());

        let is_get = method == Method::GET;
        let request = self
            .http
            .request(method, url.as_str())
            .header("content-type", "application/json");
        let request = if is_get {
            request.query(&params.to_query_pairs())
        } else {
            request.json(&params)?
        };

        let exchange = match send(request).await {
            Ok(exchange) => exchange,
            Err(e) => {
                span.record("error", true);
                tracing::warn!(error = %e, "vendor request failed");
                return Err(UnionError::Transport(e));
            }
        };
        span.record("http.status_code", exchange.status.as_u16());

        self.dispatch_log(&exchange, &trace_id, &params);
        Ok(HttpSnapshot::from_exchange(exchange, trace_id, params))
    }

    fn dispatch_log(&self, exchange: &Exchange, trace_id: &str, params: &Params) {
        let Some(sink) = &self.log_sink else {
            return;
        };
        let request_params = params.to_json();
        let record = ApiLogRecord::from_exchange(
            exchange,
            RecordContext {
                trace_id,
                request_params: &request_params,
                request_ip: &self.client_ip,
                sdk_version: SDK_VERSION,
            },
        );
        spawn_record(Arc::clone(sink), record);
    }
}

async fn send(request: RequestBuilder) -> Result<Exchange, HttpError> {
    request.send().await?.into_exchange().await
}

fn call_span(method: &Method, path: &str) -> Span {
    tracing::info_span!(
        "meituan_union.call",
        otel.name = path,
        otel.kind = "client",
        api = path,
        http.method = %method,
        http.url = field::Empty,
        http.status_code = field::Empty,
        trace_id = field::Empty,
        vendor.code = field::Empty,
        error = field::Empty,
    )
}
