//! # Search Criteria
//!
//! Field-to-substring filters for `select`.
//!
//! A record matches when AT LEAST ONE listed field contains its substring,
//! compared case-insensitively. Fields missing from a record, or holding a
//! non-string value, do not match.

use std::collections::BTreeMap;

use super::record::Record;

/// OR-combined, case-insensitive substring filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    fields: BTreeMap<String, String>,
}

impl SearchCriteria {
    /// Criteria with no filters; matches every record
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field filter (builder style)
    pub fn field(mut self, name: impl Into<String>, needle: impl Into<String>) -> Self {
        self.fields.insert(name.into(), needle.into());
        self
    }

    /// Check whether a record satisfies any of the field filters.
    ///
    /// Empty criteria match everything.
    pub fn matches(&self, record: &Record) -> bool {
        if self.fields.is_empty() {
            return true;
        }

        self.fields.iter().any(|(name, needle)| {
            record
                .get_str(name)
                .map(|value| contains_ignore_case(value, needle))
                .unwrap_or(false)
        })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SearchCriteria {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        Record::try_from(value).unwrap()
    }

    #[test]
    fn test_substring_case_insensitive() {
        let criteria = SearchCriteria::new().field("title", "MILK");
        assert!(criteria.matches(&record(json!({"id": "1", "title": "Buy milk"}))));
        assert!(!criteria.matches(&record(json!({"id": "2", "title": "Walk dog"}))));
    }

    #[test]
    fn test_or_across_fields() {
        let criteria = SearchCriteria::new()
            .field("title", "nothing")
            .field("description", "urgent");
        let row = record(json!({"id": "1", "title": "Taxes", "description": "Urgent!"}));
        assert!(criteria.matches(&row));
    }

    #[test]
    fn test_missing_and_non_string_fields_do_not_match() {
        let criteria = SearchCriteria::new().field("priority", "1");
        assert!(!criteria.matches(&record(json!({"id": "1"}))));
        assert!(!criteria.matches(&record(json!({"id": "1", "priority": 1}))));
        assert!(!criteria.matches(&record(json!({"id": "1", "priority": null}))));
    }

    #[test]
    fn test_empty_criteria_match_everything() {
        assert!(SearchCriteria::new().matches(&record(json!({"id": "1"}))));
    }

    #[test]
    fn test_from_iterator() {
        let criteria: SearchCriteria = [("title", "a"), ("description", "b")].into_iter().collect();
        assert_eq!(
            criteria,
            SearchCriteria::new().field("title", "a").field("description", "b")
        );
    }
}
