//! Metadata about the machine issuing vendor calls, attached to every record.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Rust toolchain floor the SDK is built against
pub const RUNTIME_VERSION: &str = concat!("rust/", env!("CARGO_PKG_RUST_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInfo {
    pub host_name: String,
    /// Address of the interface used for the default route; empty if undetectable
    pub inside_ip: String,
    pub os: String,
    pub arch: String,
    pub runtime_version: String,
}

static HOST_INFO: OnceLock<HostInfo> = OnceLock::new();

impl HostInfo {
    /// Detected once per process and cached.
    #[must_use]
    pub fn current() -> &'static HostInfo {
        HOST_INFO.get_or_init(Self::detect)
    }

    fn detect() -> Self {
        let host_name = hostname::get().map_or_else(
            |_| "unknown".to_owned(),
            |h| h.to_string_lossy().into_owned(),
        );

        let inside_ip = match local_ip_address::local_ip() {
            Ok(ip) => ip.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to detect local IP address");
                String::new()
            }
        };

        tracing::debug!(%host_name, %inside_ip, "host metadata detected");

        Self {
            host_name,
            inside_ip,
            os: std::env::consts::OS.to_owned(),
            arch: std::env::consts::ARCH.to_owned(),
            runtime_version: RUNTIME_VERSION.to_owned(),
        }
    }
}
