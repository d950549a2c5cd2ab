//! Draft record
//!
//! Nested key/value form data gathered across a workflow. Updates deep-merge,
//! so a later step can never drop what an earlier step wrote.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Whether a posting is a job or an internship
///
/// Chosen explicitly by the user and stored once at `posting.kind`; nothing
/// downstream infers it from titles or free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostingKind {
    Job,
    Internship,
}

impl PostingKind {
    pub const DRAFT_PATH: &'static str = "posting.kind";

    /// Partial draft that records this kind
    pub fn as_patch(self) -> Value {
        json!({ "posting": { "kind": self } })
    }
}

/// Accumulated form fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Draft(Map<String, Value>);

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON object; other JSON values are rejected
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Deep-merge `patch` into this draft
    ///
    /// Objects merge key by key; any other value replaces what was there.
    /// Keys absent from the patch are never removed.
    pub fn merge(&mut self, patch: &Map<String, Value>) {
        deep_merge(&mut self.0, patch);
    }

    /// Look up a dotted path such as `personal.email`
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let first = parts.next()?;
        let mut current = self.0.get(first)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// String at a dotted path, if present and non-blank
    pub fn str_at(&self, path: &str) -> Option<&str> {
        self.get_path(path)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn posting_kind(&self) -> Option<PostingKind> {
        self.get_path(PostingKind::DRAFT_PATH)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

fn deep_merge(target: &mut Map<String, Value>, patch: &Map<String, Value>) {
    for (key, value) in patch {
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_merge_keeps_earlier_keys() {
        let mut draft = Draft::new();
        draft.merge(&patch(json!({
            "personal": { "firstName": "Ada", "email": "ada@example.com" }
        })));
        draft.merge(&patch(json!({
            "personal": { "phone": "555-0100" },
            "introduction": { "title": "Hi" }
        })));

        assert_eq!(draft.str_at("personal.firstName"), Some("Ada"));
        assert_eq!(draft.str_at("personal.email"), Some("ada@example.com"));
        assert_eq!(draft.str_at("personal.phone"), Some("555-0100"));
        assert_eq!(draft.str_at("introduction.title"), Some("Hi"));
    }

    #[test]
    fn test_scalar_overwrites_object() {
        let mut draft = Draft::new();
        draft.merge(&patch(json!({ "location": { "city": "Oslo" } })));
        draft.merge(&patch(json!({ "location": "remote" })));
        assert_eq!(draft.get_path("location"), Some(&json!("remote")));
    }

    #[test]
    fn test_blank_strings_are_missing() {
        let mut draft = Draft::new();
        draft.merge(&patch(json!({ "title": "   " })));
        assert_eq!(draft.str_at("title"), None);
        assert!(draft.get_path("title").is_some());
        assert!(draft.get_path("title.nested").is_none());
    }

    #[test]
    fn test_posting_kind_is_explicit() {
        let mut draft = Draft::new();
        draft.merge(&patch(json!({ "posting": { "title": "Internet Co. Sales Lead" } })));
        assert_eq!(draft.posting_kind(), None);

        draft.merge(&patch(PostingKind::Job.as_patch()));
        assert_eq!(draft.posting_kind(), Some(PostingKind::Job));
        assert_eq!(draft.str_at("posting.title"), Some("Internet Co. Sales Lead"));
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(Draft::from_value(json!([1, 2])).is_none());
        assert!(Draft::from_value(json!({})).unwrap().is_empty());
    }
}
