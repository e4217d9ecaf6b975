//! Pagination normalization
//!
//! Search payloads carry an optional, loosely typed `page` object. This
//! module turns it into a canonical `Page` and applies it to in-memory
//! result sets.

use serde_json::{Map, Value};

use super::condition::compare_values;
use crate::model::{value_as_i64, FIELD_SET_ID};

/// Limit used when the caller does not ask for one
pub const NO_LIMIT: u64 = 999_999_999;

/// Canonical pagination: skip `start` rows, return at most `limit`, ordered by `sort`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub start: u64,
    pub limit: u64,
    /// Comma separated field list, `-` prefix for descending
    pub sort: String,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            start: 0,
            limit: NO_LIMIT,
            sort: String::new(),
        }
    }
}

/// One sort term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

impl Page {
    /// Normalize a raw `page` value
    ///
    /// Missing or malformed entries fall back to their defaults instead of
    /// failing: a non-positive or non-integer `limit` means no limit, a
    /// negative or non-integer `start` means 0, a non-string `sort` means the
    /// default order.
    pub fn parse(origin: Option<&Value>) -> Self {
        let mut page = Page::default();
        let Some(Value::Object(raw)) = origin else {
            return page;
        };

        if let Some(limit) = raw.get("limit").and_then(value_as_i64) {
            if limit > 0 {
                page.limit = limit as u64;
            }
        }
        if let Some(start) = raw.get("start").and_then(value_as_i64) {
            if start > 0 {
                page.start = start as u64;
            }
        }
        if let Some(Value::String(sort)) = raw.get("sort") {
            page.sort = sort.trim().to_string();
        }
        page
    }

    /// Parsed sort terms; always ends with ascending `bk_set_id` as a tie-breaker
    pub fn sort_keys(&self) -> Vec<SortKey> {
        let mut keys: Vec<SortKey> = self
            .sort
            .split(',')
            .map(str::trim)
            .filter(|term| !term.is_empty() && *term != "-")
            .map(|term| match term.strip_prefix('-') {
                Some(field) => SortKey {
                    field: field.to_string(),
                    descending: true,
                },
                None => SortKey {
                    field: term.to_string(),
                    descending: false,
                },
            })
            .collect();

        if !keys.iter().any(|k| k.field == FIELD_SET_ID) {
            keys.push(SortKey {
                field: FIELD_SET_ID.to_string(),
                descending: false,
            });
        }
        keys
    }

    /// Sort, skip and truncate an in-memory result set
    pub fn apply(&self, mut records: Vec<Map<String, Value>>) -> Vec<Map<String, Value>> {
        let keys = self.sort_keys();
        records.sort_by(|a, b| {
            keys.iter()
                .map(|key| {
                    let ord = compare_values(
                        a.get(&key.field).unwrap_or(&Value::Null),
                        b.get(&key.field).unwrap_or(&Value::Null),
                    );
                    if key.descending {
                        ord.reverse()
                    } else {
                        ord
                    }
                })
                .find(|ord| ord.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let start = usize::try_from(self.start).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        records.into_iter().skip(start).take(limit).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(values: Vec<Value>) -> Vec<Map<String, Value>> {
        values
            .into_iter()
            .map(|v| match v {
                Value::Object(map) => map,
                _ => panic!("test records must be objects"),
            })
            .collect()
    }

    #[test]
    fn test_missing_page_uses_defaults() {
        assert_eq!(Page::parse(None), Page::default());
        assert_eq!(Page::parse(Some(&json!("oops"))), Page::default());
        assert_eq!(Page::default().limit, NO_LIMIT);
    }

    #[test]
    fn test_parse_page_values() {
        let page = Page::parse(Some(&json!({"start": 5, "limit": "20", "sort": " -bk_set_name "})));
        assert_eq!(page.start, 5);
        assert_eq!(page.limit, 20);
        assert_eq!(page.sort, "-bk_set_name");
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let page = Page::parse(Some(&json!({"start": -3, "limit": 0, "sort": 7})));
        assert_eq!(page, Page::default());

        let page = Page::parse(Some(&json!({"limit": "many"})));
        assert_eq!(page.limit, NO_LIMIT);
    }

    #[test]
    fn test_sort_keys() {
        let page = Page {
            sort: "-bk_set_name, default".to_string(),
            ..Page::default()
        };
        let keys = page.sort_keys();
        assert_eq!(keys.len(), 3);
        assert!(keys[0].descending);
        assert_eq!(keys[1].field, "default");
        assert_eq!(keys[2].field, FIELD_SET_ID);

        let page = Page {
            sort: "-bk_set_id".to_string(),
            ..Page::default()
        };
        assert_eq!(page.sort_keys().len(), 1);
    }

    #[test]
    fn test_apply_sorts_and_slices() {
        let rows = records(vec![
            json!({"bk_set_id": 1, "bk_set_name": "b"}),
            json!({"bk_set_id": 2, "bk_set_name": "a"}),
            json!({"bk_set_id": 3, "bk_set_name": "c"}),
        ]);

        let page = Page {
            start: 1,
            limit: 1,
            sort: "bk_set_name".to_string(),
        };
        let out = page.apply(rows.clone());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["bk_set_id"], json!(1));

        let out = Page::default().apply(rows);
        let ids: Vec<_> = out.iter().map(|r| r["bk_set_id"].clone()).collect();
        assert_eq!(ids, vec![json!(1), json!(2), json!(3)]);
    }
}
