// Response envelope shared by every endpoint:
//
//   { "status": true, "message": "…", "data": …, "meta": { "total": …, … } }
//
// List endpoints fill `meta`; mutations usually return only `status`,
// `message` and the affected entity.

use serde::{Deserialize, Serialize};

use crate::de;

fn default_true() -> bool {
    true
}

/// Raw response wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// Missing `status` is treated as success.
    #[serde(default = "default_true", deserialize_with = "de::bool_or_true")]
    pub status: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub meta: Option<PageMeta>,
}

/// Server-side pagination metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default, deserialize_with = "de::u64_lenient")]
    pub total: u64,
    #[serde(default = "one", deserialize_with = "de::u64_or_one")]
    pub last_page: u64,
    #[serde(default = "one", deserialize_with = "de::u64_or_one")]
    pub current_page: u64,
    #[serde(default = "ten", deserialize_with = "de::u64_or_ten")]
    pub per_page: u64,
}

fn one() -> u64 {
    1
}

fn ten() -> u64 {
    PageRequest::DEFAULT_LIMIT
}

impl Default for PageMeta {
    fn default() -> Self {
        Self {
            total: 0,
            last_page: 1,
            current_page: 1,
            per_page: PageRequest::DEFAULT_LIMIT,
        }
    }
}

impl PageMeta {
    /// Metadata describing a single page that holds all `len` rows.
    pub fn single(len: usize) -> Self {
        let len = u64::try_from(len).unwrap_or(u64::MAX);
        Self {
            total: len,
            per_page: len.max(1),
            ..Self::default()
        }
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Transform every row, keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            meta: PageMeta::default(),
        }
    }
}

/// Page selection sent as `?page=…&limit=…` (1-based page).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: u64 = 10;

    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// First page with the given size.
    pub fn first(limit: u64) -> Self {
        Self::new(1, limit)
    }

    pub fn query(&self) -> [(&'static str, String); 2] {
        [
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ]
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(Self::DEFAULT_LIMIT)
    }
}

/// Acknowledgement for mutations whose response carries no entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ack {
    pub message: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn list_envelope_with_meta() {
        let raw = json!({
            "status": true,
            "data": [{"id": 1}, {"id": 2}],
            "meta": {"total": 12, "last_page": "2", "current_page": 1, "per_page": 10}
        });
        let env: Envelope<Vec<serde_json::Value>> = serde_json::from_value(raw).unwrap();
        assert!(env.status);
        let meta = env.meta.unwrap();
        assert_eq!(meta.total, 12);
        assert_eq!(meta.last_page, 2);
        assert!(meta.has_next());
        assert!(!meta.has_previous());
    }

    #[test]
    fn missing_meta_fields_use_defaults() {
        let meta: PageMeta = serde_json::from_value(json!({"total": 3})).unwrap();
        assert_eq!(meta.last_page, 1);
        assert_eq!(meta.current_page, 1);
        assert_eq!(meta.per_page, 10);
    }

    #[test]
    fn rejected_envelope() {
        let env: Envelope<serde_json::Value> =
            serde_json::from_value(json!({"status": false, "message": "nope"})).unwrap();
        assert!(!env.status);
        assert_eq!(env.message.as_deref(), Some("nope"));
        assert!(env.data.is_none());
    }

    #[test]
    fn page_request_clamps_to_one() {
        let req = PageRequest::new(0, 0);
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, 1);
        assert_eq!(
            PageRequest::default().query(),
            [("page", "1".to_owned()), ("limit", "10".to_owned())]
        );
    }
}
