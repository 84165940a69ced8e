//! Cache key computation.
//!
//! Provides [`CacheKey`], the canonical identity of a converter configuration.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Canonical serialization of an engine name and its options.
///
/// Two configurations that are logically identical produce equal keys, no
/// matter in which order their map entries or set members were inserted:
/// object keys are sorted recursively before serialization.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use mkdown_cache::CacheKey;
///
/// let mut a = BTreeMap::new();
/// a.insert("table", true);
/// a.insert("math", false);
///
/// let key = CacheKey::new("comrak", &a).unwrap();
/// assert_eq!(key.as_str(), r#"{"engine":"comrak","options":{"math":false,"table":true}}"#);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    canonical: String,
}

impl CacheKey {
    /// Build a key from an engine name and any serializable options value.
    ///
    /// Fails only if `options` cannot be represented as JSON (for example a
    /// map with non-string keys).
    pub fn new<O>(engine: &str, options: &O) -> Result<Self, serde_json::Error>
    where
        O: Serialize + ?Sized,
    {
        let options = canonicalize(serde_json::to_value(options)?);
        let mut root = Map::new();
        root.insert("engine".to_owned(), Value::String(engine.to_owned()));
        root.insert("options".to_owned(), options);
        Ok(Self {
            canonical: Value::Object(root).to_string(),
        })
    }

    /// The canonical JSON string this key compares by.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// Compute a content hash of the canonical form.
    ///
    /// SHA-256 of the canonical JSON, hex encoded. Used in log output where
    /// the full configuration would be noise.
    #[must_use]
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

/// Rebuild a JSON value with every object's keys in sorted order.
///
/// `serde_json::Map` is already ordered unless the `preserve_order` feature
/// is unified in by another crate, so the order is enforced here.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashMap};

    use pretty_assertions::assert_eq;
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Opts {
        table: bool,
        width: usize,
        extensions: BTreeSet<String>,
    }

    #[test]
    fn test_key_independent_of_insertion_order() {
        let mut first = HashMap::new();
        first.insert("b", 2);
        first.insert("a", 1);
        first.insert("c", 3);

        let mut second = HashMap::new();
        second.insert("c", 3);
        second.insert("a", 1);
        second.insert("b", 2);

        assert_eq!(
            CacheKey::new("comrak", &first).unwrap(),
            CacheKey::new("comrak", &second).unwrap()
        );
    }

    #[test]
    fn test_key_sorts_set_members() {
        let a = Opts {
            table: true,
            width: 0,
            extensions: ["math_code", "greentext"].map(str::to_owned).into(),
        };
        let b = Opts {
            table: true,
            width: 0,
            extensions: ["greentext", "math_code"].map(str::to_owned).into(),
        };

        assert_eq!(
            CacheKey::new("comrak", &a).unwrap(),
            CacheKey::new("comrak", &b).unwrap()
        );
    }

    #[test]
    fn test_key_distinguishes_engine_and_options() {
        let make = |width| Opts {
            table: true,
            width,
            extensions: BTreeSet::new(),
        };
        let opts = make(0);
        let other = make(80);

        let base = CacheKey::new("comrak", &opts).unwrap();
        assert_ne!(base, CacheKey::new("pulldown-cmark", &opts).unwrap());
        assert_ne!(base, CacheKey::new("comrak", &other).unwrap());
    }

    #[test]
    fn test_nested_objects_are_sorted() {
        let value = serde_json::json!({"z": {"b": 1, "a": 2}, "a": [ {"y": 1, "x": 2} ]});
        let key = CacheKey::new("e", &value).unwrap();

        assert_eq!(
            key.as_str(),
            r#"{"engine":"e","options":{"a":[{"x":2,"y":1}],"z":{"a":2,"b":1}}}"#
        );
    }

    #[test]
    fn test_digest_format() {
        let key = CacheKey::new("htmd", &serde_json::json!({})).unwrap();
        let digest = key.digest();

        assert_eq!(digest.len(), 64, "SHA-256 hash should be 64 hex characters");
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(digest, key.clone().digest());
    }

    #[test]
    fn test_non_string_map_keys_fail() {
        let mut map = HashMap::new();
        map.insert((1, 2), true);

        assert!(CacheKey::new("comrak", &map).is_err());
    }
}
