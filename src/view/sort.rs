//! Sort functionality for collection views.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::collation::Collator;
use super::field::{FieldValue, Record};
use super::filter::compare_values;
use super::schema::EntitySchema;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "Ascending",
            SortOrder::Descending => "Descending",
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

/// Sort key and direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: String,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(key: impl Into<String>, order: SortOrder) -> Self {
        Self {
            key: key.into(),
            order,
        }
    }
}

/// Compare two field values with nulls last regardless of direction.
///
/// `compare` is only consulted when both values are present.
pub fn compare_nulls_last(
    a: &FieldValue,
    b: &FieldValue,
    order: SortOrder,
    compare: impl Fn(&FieldValue, &FieldValue) -> Ordering,
) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => order.apply(compare(a, b)),
    }
}

/// Stable sort of item indices on the spec's key.
///
/// Keys are extracted once per item, so record field lookups stay linear.
pub fn sort_indices<R: Record>(
    indices: &mut [usize],
    items: &im::Vector<R>,
    spec: &SortSpec,
    schema: &EntitySchema,
    collator: &Collator,
) {
    let custom = schema.get(&spec.key).and_then(|field| field.compare);
    let mut keyed: Vec<(usize, FieldValue)> = indices
        .iter()
        .map(|&idx| {
            let value = items
                .get(idx)
                .map_or(FieldValue::Null, |item| schema.value_of(item, &spec.key));
            (idx, value)
        })
        .collect();

    keyed.sort_by(|(_, a), (_, b)| {
        compare_nulls_last(a, b, spec.order, |x, y| match custom {
            Some(compare) => compare(x, y),
            None => compare_values(x, y, collator),
        })
    });

    for (slot, (idx, _)) in indices.iter_mut().zip(keyed) {
        *slot = idx;
    }
}
