//! Tower layers of the client stack

mod headers;
mod span;

pub use headers::{DefaultHeaders, DefaultHeadersLayer};
pub use span::{ClientSpan, ClientSpanLayer};
