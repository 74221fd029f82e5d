#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Audit log of vendor API calls
//!
//! Every SDK call can produce an [`ApiLogRecord`]: request and response
//! metadata, the caller's trace id and the host it ran on. Records go to an
//! [`ApiLogSink`] through [`spawn_record`], which never blocks or fails the
//! call that produced them.
//!
//! Sinks shipped here:
//! - [`SeaOrmApiLogSink`] - one row per call in a relational table (default `meituan`)
//! - [`TracingApiLogSink`] - a structured `tracing` event per call

mod error;
mod host;
mod record;
mod sea_orm_sink;
mod sink;

pub use error::ApiLogError;
pub use host::{HostInfo, RUNTIME_VERSION};
pub use record::{ApiLogRecord, RecordContext, headers_to_json};
pub use sea_orm_sink::{DEFAULT_TABLE, SeaOrmApiLogSink};
pub use sink::{ApiLogSink, TracingApiLogSink, spawn_record};
