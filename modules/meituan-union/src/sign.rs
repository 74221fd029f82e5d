use crate::params::{Params, render_value};
use md5::{Digest, Md5};

/// Parameter that carries the signature; never part of its own input.
pub const SIGN_KEY: &str = "sign";

/// `lowercase_hex(md5(secret + k1 + v1 + ... + kn + vn + secret))` over the
/// parameters in ascending key order.
#[must_use]
pub fn sign(params: &Params, secret: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(secret.as_bytes());
    for (key, value) in params.iter().filter(|(key, _)| *key != SIGN_KEY) {
        hasher.update(key.as_bytes());
        hasher.update(render_value(value).as_bytes());
    }
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn link_params() -> Params {
        Params::new()
            .with("actId", 33)
            .with("appkey", "key")
            .with("sid", "sid01")
            .with("linkType", 1)
            .with("shortLink", 0)
    }

    #[test]
    fn test_known_signature() {
        assert_eq!(
            sign(&link_params(), "sec42"),
            "72c22aab48c1e2a356be0b7c73a8c9af"
        );
    }

    #[test]
    fn test_insertion_order_irrelevant() {
        let reversed = Params::new()
            .with("shortLink", 0)
            .with("linkType", 1)
            .with("sid", "sid01")
            .with("appkey", "key")
            .with("actId", 33);
        assert_eq!(sign(&reversed, "sec42"), sign(&link_params(), "sec42"));
    }

    #[test]
    fn test_existing_sign_ignored() {
        let signed = link_params().with(SIGN_KEY, "stale");
        assert_eq!(sign(&signed, "sec42"), sign(&link_params(), "sec42"));
    }

    #[test]
    fn test_empty_params_hash_secret_only() {
        assert_eq!(
            sign(&Params::new(), "sec"),
            "fe3ea368b0ad2a7da7641128b77d0792"
        );
    }

    #[test]
    fn test_secret_changes_signature() {
        assert_ne!(sign(&link_params(), "a"), sign(&link_params(), "b"));
    }
}
