//! Filter functionality for collection views.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::collation::Collator;
use super::field::{FieldValue, Record};
use super::schema::EntitySchema;

/// Filter on a single field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldFilter {
    /// Exact match
    Equals(FieldValue),
    /// Exact match against any of the values
    OneOf(Vec<FieldValue>),
    /// Inclusive range; a missing bound is open
    Range {
        min: Option<FieldValue>,
        max: Option<FieldValue>,
    },
}

impl FieldFilter {
    pub fn equals(value: impl Into<FieldValue>) -> Self {
        FieldFilter::Equals(value.into())
    }

    pub fn between(min: impl Into<FieldValue>, max: impl Into<FieldValue>) -> Self {
        FieldFilter::Range {
            min: Some(min.into()),
            max: Some(max.into()),
        }
    }

    pub fn at_least(min: impl Into<FieldValue>) -> Self {
        FieldFilter::Range {
            min: Some(min.into()),
            max: None,
        }
    }

    pub fn at_most(max: impl Into<FieldValue>) -> Self {
        FieldFilter::Range {
            min: None,
            max: Some(max.into()),
        }
    }

    /// Check if a field value matches this filter
    pub fn matches(&self, value: &FieldValue, collator: &Collator) -> bool {
        match self {
            FieldFilter::Equals(expected) => values_equal(value, expected),
            FieldFilter::OneOf(options) => options.iter().any(|o| values_equal(value, o)),
            FieldFilter::Range { min, max } => {
                if value.is_null() || matches!(value, FieldValue::Float(v) if !v.is_finite()) {
                    return false;
                }
                let above_min = min
                    .as_ref()
                    .is_none_or(|lo| compare_values(value, lo, collator) != Ordering::Less);
                let below_max = max
                    .as_ref()
                    .is_none_or(|hi| compare_values(value, hi, collator) != Ordering::Greater);
                above_min && below_max
            }
        }
    }

    /// Get display name for filter
    pub fn display_name(&self, key: &str) -> String {
        fn show(value: &FieldValue) -> String {
            value.display_string().unwrap_or_else(|| "(none)".to_string())
        }
        match self {
            FieldFilter::Equals(value) => format!("{key} = {}", show(value)),
            FieldFilter::OneOf(values) => {
                let shown: Vec<String> = values.iter().map(show).collect();
                format!("{key} in [{}]", shown.join(", "))
            }
            FieldFilter::Range { min: Some(lo), max: Some(hi) } => {
                format!("{} <= {key} <= {}", show(lo), show(hi))
            }
            FieldFilter::Range { min: Some(lo), max: None } => format!("{key} >= {}", show(lo)),
            FieldFilter::Range { min: None, max: Some(hi) } => format!("{key} <= {}", show(hi)),
            FieldFilter::Range { min: None, max: None } => format!("{key}: any"),
        }
    }
}

/// Exact-match equality across compatible kinds.
///
/// Integers and floats compare numerically; enum and text values compare by
/// their string.
pub fn values_equal(a: &FieldValue, b: &FieldValue) -> bool {
    match (a, b) {
        (FieldValue::Null, FieldValue::Null) => true,
        (FieldValue::Null, _) | (_, FieldValue::Null) => false,
        _ => match (a.as_f64(), b.as_f64(), a.as_str(), b.as_str()) {
            (Some(x), Some(y), _, _) => x == y,
            (_, _, Some(x), Some(y)) => x == y,
            _ => a == b,
        },
    }
}

/// Rank used to order values of unrelated kinds deterministically.
fn kind_rank(value: &FieldValue) -> u8 {
    match value {
        FieldValue::Bool(_) => 0,
        FieldValue::Integer(_) | FieldValue::Float(_) => 1,
        FieldValue::Timestamp(_) => 2,
        FieldValue::Text(_) | FieldValue::Enum(_) => 3,
        FieldValue::Null => 4,
    }
}

/// Total order over non-null values.
///
/// Strings use locale collation, numbers compare numerically and timestamps
/// by tick count. Null handling is the caller's concern; here it sorts last.
pub fn compare_values(a: &FieldValue, b: &FieldValue, collator: &Collator) -> Ordering {
    match (a, b) {
        (FieldValue::Integer(x), FieldValue::Integer(y)) => x.cmp(y),
        (FieldValue::Float(x), FieldValue::Float(y)) => x.total_cmp(y),
        (FieldValue::Bool(x), FieldValue::Bool(y)) => x.cmp(y),
        _ => {
            if let (Some(x), Some(y)) = (a.ticks(), b.ticks()) {
                return x.cmp(&y);
            }
            if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
                return x.total_cmp(&y);
            }
            if let (Some(x), Some(y)) = (a.as_str(), b.as_str()) {
                return collator.compare(x, y);
            }
            kind_rank(a).cmp(&kind_rank(b))
        }
    }
}

/// Search predicate: true when the folded term is empty or any searchable
/// field contains it.
pub fn matches_search<R: Record>(
    record: &R,
    schema: &EntitySchema,
    folded_term: &str,
    collator: &Collator,
) -> bool {
    if folded_term.is_empty() {
        return true;
    }
    schema.searchable().any(|spec| {
        schema
            .value_of(record, &spec.key)
            .display_string()
            .is_some_and(|text| collator.contains_folded(&text, folded_term))
    })
}

/// An item is visible iff it passes the search and every field filter.
pub fn passes<'a, R: Record>(
    record: &R,
    schema: &EntitySchema,
    folded_term: &str,
    filters: impl IntoIterator<Item = (&'a String, &'a FieldFilter)>,
    collator: &Collator,
) -> bool {
    matches_search(record, schema, folded_term, collator)
        && filters
            .into_iter()
            .all(|(key, filter)| filter.matches(&schema.value_of(record, key), collator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::schema::FieldSpec;
    use chrono::{TimeZone, Utc};

    #[derive(Clone)]
    struct Doc {
        id: u32,
        title: &'static str,
        tags: Option<&'static str>,
        pages: i64,
    }

    impl Record for Doc {
        type Id = u32;

        fn id(&self) -> u32 {
            self.id
        }

        fn field(&self, key: &str) -> FieldValue {
            match key {
                "title" => self.title.into(),
                "tags" => self.tags.into(),
                "pages" => self.pages.into(),
                _ => FieldValue::Null,
            }
        }
    }

    fn schema() -> EntitySchema {
        EntitySchema::new("doc")
            .field(FieldSpec::text("title").searchable())
            .field(FieldSpec::text("tags").searchable())
            .field(FieldSpec::integer("pages").filterable())
    }

    #[test]
    fn test_equals_matches_numeric_across_kinds() {
        let collator = Collator::default();
        assert!(FieldFilter::equals(3i64).matches(&FieldValue::Float(3.0), &collator));
        assert!(!FieldFilter::equals(3i64).matches(&FieldValue::Null, &collator));
        assert!(FieldFilter::Equals(FieldValue::Null).matches(&FieldValue::Null, &collator));
    }

    #[test]
    fn test_enum_equals_text() {
        assert!(values_equal(
            &FieldValue::Enum("active".into()),
            &FieldValue::Text("active".into())
        ));
    }

    #[test]
    fn test_range_is_inclusive_and_excludes_null() {
        let collator = Collator::default();
        let filter = FieldFilter::between(10i64, 20i64);
        assert!(filter.matches(&FieldValue::Integer(10), &collator));
        assert!(filter.matches(&FieldValue::Integer(20), &collator));
        assert!(!filter.matches(&FieldValue::Integer(21), &collator));
        assert!(!filter.matches(&FieldValue::Null, &collator));
    }

    #[test]
    fn test_range_rejects_non_finite_floats() {
        let collator = Collator::default();
        let filter = FieldFilter::at_least(0i64);
        assert!(!filter.matches(&FieldValue::Float(f64::NAN), &collator));
        assert!(!filter.matches(&FieldValue::Float(f64::INFINITY), &collator));
        assert!(filter.matches(&FieldValue::Float(0.5), &collator));
    }

    #[test]
    fn test_date_range() {
        let collator = Collator::default();
        let jan = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let mar = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        let filter = FieldFilter::at_most(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert!(filter.matches(&jan.into(), &collator));
        assert!(!filter.matches(&mar.into(), &collator));
    }

    #[test]
    fn test_search_is_case_insensitive_over_searchable_fields() {
        let collator = Collator::default();
        let schema = schema();
        let doc = Doc {
            id: 1,
            title: "Intro to Retrieval",
            tags: Some("RAG, embeddings"),
            pages: 12,
        };
        assert!(matches_search(&doc, &schema, "retrieval", &collator));
        assert!(matches_search(&doc, &schema, "rag", &collator));
        assert!(!matches_search(&doc, &schema, "12", &collator));
        assert!(matches_search(&doc, &schema, "", &collator));
    }

    #[test]
    fn test_passes_requires_all_filters() {
        let collator = Collator::default();
        let schema = schema();
        let doc = Doc {
            id: 1,
            title: "Chunking",
            tags: None,
            pages: 4,
        };
        let key = "pages".to_string();
        let small = FieldFilter::at_most(5i64);
        let large = FieldFilter::at_least(10i64);
        assert!(passes(&doc, &schema, "chunk", [(&key, &small)], &collator));
        assert!(!passes(&doc, &schema, "chunk", [(&key, &large)], &collator));
        assert!(!passes(&doc, &schema, "vector", [(&key, &small)], &collator));
        assert_eq!(doc.id(), 1);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(FieldFilter::equals("active").display_name("status"), "status = active");
        assert_eq!(
            FieldFilter::at_least(3i64).display_name("pages"),
            "pages >= 3"
        );
        assert_eq!(
            FieldFilter::OneOf(vec!["a".into(), FieldValue::Null]).display_name("k"),
            "k in [a, (none)]"
        );
    }
}
