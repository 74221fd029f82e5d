use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Request parameters for one vendor call
///
/// Keys iterate in ascending byte order, which is the order the signature is
/// computed over. Values are JSON scalars; see [`render_value`] for how they are put
/// on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, Value>);

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge several parameter sets; later sets win on duplicate keys.
    #[must_use]
    pub fn merged<I>(sets: I) -> Self
    where
        I: IntoIterator<Item = Params>,
    {
        let mut params = Self::new();
        for set in sets {
            params.extend(set);
        }
        params
    }

    /// Insert or replace one parameter.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// `(key, rendered value)` pairs for a query string.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&str, String)> {
        self.iter().map(|(k, v)| (k, render_value(v))).collect()
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<Map<String, Value>>(),
        )
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Params {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.0.insert(k.into(), v.into());
        }
    }
}

impl IntoIterator for Params {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a String, &'a Value);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<BTreeMap<String, Value>> for Params {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

/// Text form of a parameter value, shared by signing and query encoding.
///
/// Strings are taken verbatim, numbers and booleans use their JSON form, null
/// is empty and nested values are compact JSON.
#[must_use]
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => {
            value.to_string()
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keys_iterate_sorted() {
        let params = Params::new()
            .with("sid", "s1")
            .with("actId", 33)
            .with("appkey", "k");
        let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["actId", "appkey", "sid"]);
    }

    #[test]
    fn test_render_scalars() {
        assert_eq!(render_value(&json!("a b")), "a b");
        assert_eq!(render_value(&json!(42)), "42");
        assert_eq!(render_value(&json!(-7)), "-7");
        assert_eq!(render_value(&json!(1.5)), "1.5");
        assert_eq!(render_value(&json!(true)), "true");
        assert_eq!(render_value(&Value::Null), "");
        assert_eq!(render_value(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn test_merged_later_wins() {
        let params = Params::merged([
            Params::new().with("page", 1).with("size", 20),
            Params::new().with("page", 2),
        ]);
        assert_eq!(params.get("page"), Some(&json!(2)));
        assert_eq!(params.get("size"), Some(&json!(20)));
    }

    #[test]
    fn test_query_pairs_rendered() {
        let params: Params = [("cityid", json!(1)), ("name", json!("x"))]
            .into_iter()
            .collect();
        assert_eq!(
            params.to_query_pairs(),
            vec![("cityid", "1".to_owned()), ("name", "x".to_owned())]
        );
    }

    #[test]
    fn test_to_json_is_object() {
        let params = Params::new().with("ts", 1_700_000_000);
        assert_eq!(params.to_json(), json!({"ts": 1_700_000_000}));
        assert_eq!(serde_json::to_value(&params).unwrap(), params.to_json());
    }
}
