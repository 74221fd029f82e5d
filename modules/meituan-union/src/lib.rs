#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Typed client for the Meituan Union affiliate open API
//!
//! - One async method per vendor endpoint, returning [`ApiResult`]: the typed
//!   response, the raw body and an [`HttpSnapshot`] of the exchange
//! - Request signing ([`sign`]) and `ts`/`appkey` handling per endpoint
//! - Optional best-effort audit log of every call through a
//!   [`union_apilog::ApiLogSink`]
//! - A `tracing` span per call; with the `otel` feature the caller's trace id
//!   is reused and `traceparent` is propagated
//!
//! A vendor-reported failure (non-zero status) is an `Ok` result; call
//! [`ApiResult::error_for_status`] or [`ApiResult::into_result`] to treat it as
//! an error.
//!
//! ```ignore
//! use meituan_union::{Client, Params};
//! use secrecy::SecretString;
//!
//! let client = Client::new("appkey", SecretString::from(secret))?;
//! let cities = client.poi_city(Params::new()).await?.into_result()?;
//! let skus = client
//!     .mt_union_sku(Params::new().with("pageNo", 1).with("pageSize", 20))
//!     .await?;
//! ```

mod api;
mod call;
mod client;
mod config;
mod de;
mod error;
pub mod models;
mod params;
mod result;
mod sign;
mod trace;

pub use call::{SDK_VERSION, Signing};
pub use client::{Client, ClientBuilder};
pub use config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, MeituanUnionConfig};
pub use error::UnionError;
pub use models::VendorResponse;
pub use params::{Params, render_value};
pub use result::{ApiResult, HttpSnapshot, RawResponse};
pub use sign::{SIGN_KEY, sign};
pub use trace::trace_id;

pub use secrecy::SecretString;
