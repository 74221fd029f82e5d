#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! HTTP client for the Meituan Union open API
//!
//! A hyper-based client with:
//! - TLS via rustls (HTTPS only unless explicitly relaxed for mock servers)
//! - Connection pooling and a per-request timeout
//! - Default `User-Agent` and `Accept: application/json` headers
//! - Transparent response decompression (gzip, brotli, deflate)
//! - A client span per request, with W3C trace-context injection behind the `otel` feature
//! - Request snapshots ([`RequestMeta`]) and fully-read [`Exchange`]s for call auditing
//!
//! There is no retry or redirect handling: vendor failures go back to the caller unchanged.
//!
//! ```ignore
//! use union_http::HttpClient;
//!
//! let client = HttpClient::builder().timeout(Duration::from_secs(10)).build()?;
//! let exchange = client
//!     .get("https://openapi.meituan.com/poi/city")
//!     .send()
//!     .await?
//!     .into_exchange()
//!     .await?;
//! ```

mod builder;
mod client;
mod config;
mod error;
mod layers;
pub mod otel;
mod request;
mod response;
mod tls;

pub use builder::HttpClientBuilder;
pub use client::HttpClient;
pub use config::{
    DEFAULT_MAX_BODY_SIZE, DEFAULT_REQUEST_TIMEOUT, DEFAULT_USER_AGENT, HttpClientConfig,
    TlsRoots, TransportSecurity,
};
pub use error::HttpError;
pub use layers::{ClientSpan, ClientSpanLayer, DefaultHeaders, DefaultHeadersLayer};
pub use request::RequestBuilder;
pub use response::{Exchange, HttpResponse, RequestMeta, ResponseBody};
