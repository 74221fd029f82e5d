//! Client configuration.

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// Vendor open API root
pub const DEFAULT_BASE_URL: &str = "https://openapi.meituan.com/";

/// Per-request timeout when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Meituan Union client configuration.
///
/// `Debug` and `Serialize` redact the secret.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeituanUnionConfig {
    /// Channel key issued by the union platform (`appkey`)
    pub app_key: String,

    /// Signing secret
    #[serde(
        serialize_with = "serialize_redacted",
        deserialize_with = "deserialize_secret"
    )]
    pub secret: SecretString,

    /// API root, joined with each endpoint path
    pub base_url: String,

    /// Per-request timeout, humantime format (`"30s"`, `"1m 30s"`)
    #[serde(with = "humantime_duration")]
    pub timeout: Duration,

    /// User-Agent override
    pub user_agent: Option<String>,

    /// Client IP recorded in API call logs
    pub client_ip: Option<String>,
}

impl Default for MeituanUnionConfig {
    fn default() -> Self {
        Self {
            app_key: String::new(),
            secret: SecretString::from(String::new()),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            client_ip: None,
        }
    }
}

impl fmt::Debug for MeituanUnionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeituanUnionConfig")
            .field("app_key", &self.app_key)
            .field("secret", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("client_ip", &self.client_ip)
            .finish()
    }
}

fn serialize_redacted<S: Serializer>(_: &SecretString, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str("[REDACTED]")
}

fn deserialize_secret<'de, D: Deserializer<'de>>(d: D) -> Result<SecretString, D::Error> {
    String::deserialize(d).map(SecretString::from)
}

mod humantime_duration {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&humantime::format_duration(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        humantime::parse_duration(&raw).map_err(D::Error::custom)
    }
}
