use crate::host::HostInfo;
use chrono::{DateTime, Utc};
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use union_http::Exchange;

/// One vendor call, written once and never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiLogRecord {
    pub trace_id: String,
    pub request_time: DateTime<Utc>,
    /// Full request URI including the query string
    pub request_uri: String,
    /// `scheme://host/path` without the query string
    pub request_url: String,
    /// Path of the vendor API
    pub request_api: String,
    pub request_method: String,
    pub request_params: Value,
    pub request_header: Value,
    /// Client IP configured on the SDK, empty when unset
    pub request_ip: String,
    pub response_header: Value,
    pub response_status_code: u16,
    /// Empty for images and bodies that are not valid UTF-8
    pub response_body: String,
    pub response_content_length: u64,
    pub response_time: DateTime<Utc>,
    #[serde(flatten)]
    pub host: HostInfo,
    pub sdk_version: String,
}

/// Caller-side context that the HTTP exchange does not carry.
#[derive(Debug, Clone, Copy)]
pub struct RecordContext<'a> {
    pub trace_id: &'a str,
    pub request_params: &'a Value,
    pub request_ip: &'a str,
    pub sdk_version: &'a str,
}

impl ApiLogRecord {
    #[must_use]
    pub fn from_exchange(exchange: &Exchange, ctx: RecordContext<'_>) -> Self {
        let uri = &exchange.request.uri;
        let request_url = format!(
            "{}://{}{}",
            uri.scheme_str().unwrap_or("https"),
            uri.authority().map_or("", http::uri::Authority::as_str),
            uri.path()
        );

        let is_image = exchange
            .content_type()
            .is_some_and(|ct| ct.trim_start().starts_with("image/"));
        let response_body = if is_image {
            String::new()
        } else {
            std::str::from_utf8(&exchange.body).map_or_else(|_| String::new(), str::to_owned)
        };

        Self {
            trace_id: ctx.trace_id.to_owned(),
            request_time: exchange.request.sent_at,
            request_uri: uri.to_string(),
            request_url,
            request_api: uri.path().to_owned(),
            request_method: exchange.request.method.to_string(),
            request_params: ctx.request_params.clone(),
            request_header: headers_to_json(&exchange.request.headers),
            request_ip: ctx.request_ip.to_owned(),
            response_header: headers_to_json(&exchange.headers),
            response_status_code: exchange.status.as_u16(),
            response_body,
            response_content_length: u64::try_from(exchange.body.len()).unwrap_or(u64::MAX),
            response_time: exchange.received_at,
            host: HostInfo::current().clone(),
            sdk_version: ctx.sdk_version.to_owned(),
        }
    }
}

/// Header map as `{"name": ["v1", "v2"]}`; non-UTF-8 values are rendered lossily.
#[must_use]
pub fn headers_to_json(headers: &HeaderMap) -> Value {
    let mut map = Map::new();
    for (name, value) in headers {
        let value = Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned());
        match map
            .entry(name.as_str())
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            Value::Array(values) => values.push(value),
            other => *other = Value::Array(vec![value]),
        }
    }
    Value::Object(map)
}
