//! Cache keys.
//!
//! A key is a JSON array:
//! `["story-schematics service", <resource>, <verb>, <params>?, {"token": ..}?]`.
//! Two keys are equal exactly when their JSON encodings are.

use std::fmt;

use serde::Serialize;
use serde_json::{json, Value};

pub const SERVICE: &str = "story-schematics service";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryKey(Vec<Value>);

impl QueryKey {
    pub fn new(resource: &str, verb: &str) -> Self {
        Self(vec![
            Value::from(SERVICE),
            Value::from(resource),
            Value::from(verb),
        ])
    }

    pub fn with_params<P: Serialize>(mut self, params: &P) -> Self {
        // Parameter sets are plain structs of strings, numbers and UUIDs.
        self.0
            .push(serde_json::to_value(params).unwrap_or(Value::Null));
        self
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.0.push(json!({ "token": token }));
        self
    }

    pub fn parts(&self) -> &[Value] {
        &self.0
    }

    /// `true` when `self` starts with every part of `prefix`, the way a cache
    /// invalidates all queries of a resource at once.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Stable string form, usable as a map key.
    pub fn fingerprint(&self) -> String {
        Value::Array(self.0.clone()).to_string()
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fingerprint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Params {
        slug: &'static str,
    }

    #[test]
    fn mutation_key_has_no_params() {
        let key = QueryKey::new("logline", "create");
        assert_eq!(
            key.fingerprint(),
            r#"["story-schematics service","logline","create"]"#
        );
    }

    #[test]
    fn query_key_carries_params_then_token() {
        let key = QueryKey::new("story plan", "get")
            .with_params(&Params { slug: "three-acts" })
            .with_token("t");
        assert_eq!(
            key.to_string(),
            r#"["story-schematics service","story plan","get",{"slug":"three-acts"},{"token":"t"}]"#
        );
    }

    #[test]
    fn prefix_matching() {
        let resource = QueryKey::new("logline", "get all");
        let key = resource.clone().with_token("t");
        assert!(key.starts_with(&resource));
        assert!(!resource.starts_with(&key));
        assert!(!key.starts_with(&QueryKey::new("logline", "get")));
    }
}
