use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::rc::Rc;

/// Maximum number of path parameters before heap allocation.
/// Most routes have ≤4 params (e.g., /users/:id/posts/:post_id).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Key under which a `*` wildcard stores the rest of the path.
pub const WILDCARD_KEY: &str = "wild";

/// Path parameters extracted from a matched route.
///
/// Keys keep the order of the template. A value of `None` means an optional
/// segment did not take part in the match, which is different from a
/// segment that matched an empty string.
///
/// Key names use `Rc<str>` because they come from the compiled route table and
/// are shared by every request that matches the route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: SmallVec<[(Rc<str>, Option<String>); MAX_INLINE_PARAMS]>,
}

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: Rc<str>, value: Option<String>) {
        self.entries.push((key, value));
    }

    /// Get a parameter by name
    ///
    /// Uses "last write wins" semantics: if duplicate parameter names exist
    /// (e.g., `/org/:id/user/:id`), returns the last occurrence.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Whether the route declared a parameter with this name, matched or not
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k.as_ref() == name)
    }

    /// The remainder of the path captured by a `*` wildcard
    #[must_use]
    pub fn wild(&self) -> Option<&str> {
        self.get(WILDCARD_KEY)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_ref(), v.as_deref()))
    }

    /// Convert to a HashMap
    /// Note: This allocates - use get() in hot paths instead
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, Option<String>> {
        self.entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k.as_ref(), v)?;
        }
        map.end()
    }
}

/// Value threaded from one handler to the next through `next_with`.
///
/// An open object: any number of named JSON fields plus the route params the
/// router merged in. When a route matches, only `params` is replaced; every other
/// field the caller passed survives.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct Payload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Payload {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Payload::insert`]
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    #[must_use]
    pub fn params(&self) -> Option<&Params> {
        self.params.as_ref()
    }

    /// Replace the `params` field, keeping every other field
    #[must_use]
    pub fn merge_params(mut self, params: Params) -> Self {
        self.params = Some(params);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, Option<&str>)]) -> Params {
        let mut p = Params::new();
        for (k, v) in pairs {
            p.push(Rc::from(*k), v.map(str::to_string));
        }
        p
    }

    #[test]
    fn test_absent_param_differs_from_empty() {
        let p = params(&[("foo", None), ("bar", Some(""))]);
        assert_eq!(p.get("foo"), None);
        assert!(p.contains_key("foo"));
        assert_eq!(p.get("bar"), Some(""));
        assert!(!p.contains_key("baz"));
    }

    #[test]
    fn test_last_duplicate_key_wins() {
        let p = params(&[("id", Some("org")), ("id", Some("user"))]);
        assert_eq!(p.get("id"), Some("user"));
    }

    #[test]
    fn test_merge_params_keeps_caller_fields() {
        let stale = params(&[("id", Some("stale"))]);
        let payload = Payload::new()
            .with("user", json!({"name": "john"}))
            .merge_params(stale)
            .merge_params(params(&[("id", Some("42"))]));

        assert_eq!(payload.params().and_then(|p| p.get("id")), Some("42"));
        assert_eq!(payload.get("user"), Some(&json!({"name": "john"})));
    }

    #[test]
    fn test_payload_serializes_params_inline() {
        let payload = Payload::new()
            .with("page", 2)
            .merge_params(params(&[("foo", Some("john")), ("bar", None)]));
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({"page": 2, "params": {"foo": "john", "bar": null}})
        );
    }
}
