//! Summary statistics over a filtered collection.
//!
//! [`compute_stats`] is a pure function of its input: the same items and spec
//! always produce the same snapshot. Means over empty input are `0.0`; `NaN`
//! never reaches the view layer.

use serde::Serialize;
use std::collections::BTreeMap;

use super::collation::Collator;
use super::field::Record;
use super::filter::FieldFilter;
use super::schema::EntitySchema;

/// How a named count decides whether an item counts.
#[derive(Debug, Clone)]
pub enum CountRule<R> {
    /// Items whose field passes the filter
    Field { key: String, filter: FieldFilter },
    /// Items matching an arbitrary predicate
    Predicate(fn(&R) -> bool),
}

impl<R: Record> CountRule<R> {
    fn matches(&self, item: &R, schema: &EntitySchema, collator: &Collator) -> bool {
        match self {
            CountRule::Field { key, filter } => {
                filter.matches(&schema.value_of(item, key), collator)
            }
            CountRule::Predicate(predicate) => predicate(item),
        }
    }
}

/// Which aggregates a view shows.
#[derive(Debug, Clone)]
pub struct StatsSpec<R> {
    counts: Vec<(String, CountRule<R>)>,
    distributions: Vec<String>,
    averages: Vec<String>,
    null_label: String,
}

impl<R> Default for StatsSpec<R> {
    fn default() -> Self {
        Self {
            counts: Vec::new(),
            distributions: Vec::new(),
            averages: Vec::new(),
            null_label: "(none)".to_string(),
        }
    }
}

impl<R: Record> StatsSpec<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count items whose `key` passes `filter`.
    pub fn count_where(
        mut self,
        name: impl Into<String>,
        key: impl Into<String>,
        filter: FieldFilter,
    ) -> Self {
        self.counts.push((
            name.into(),
            CountRule::Field {
                key: key.into(),
                filter,
            },
        ));
        self
    }

    pub fn count_matching(mut self, name: impl Into<String>, predicate: fn(&R) -> bool) -> Self {
        self.counts
            .push((name.into(), CountRule::Predicate(predicate)));
        self
    }

    /// Distribution of values for a categorical field.
    pub fn distribution(mut self, key: impl Into<String>) -> Self {
        self.distributions.push(key.into());
        self
    }

    /// Arithmetic mean of a numeric field.
    pub fn average(mut self, key: impl Into<String>) -> Self {
        self.averages.push(key.into());
        self
    }

    /// Bucket label for null values in distributions.
    pub fn null_label(mut self, label: impl Into<String>) -> Self {
        self.null_label = label.into();
        self
    }
}

/// Aggregates of the filtered collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub total: usize,
    pub counts: BTreeMap<String, usize>,
    pub distributions: BTreeMap<String, BTreeMap<String, usize>>,
    pub averages: BTreeMap<String, f64>,
}

impl StatsSnapshot {
    pub fn count(&self, name: &str) -> usize {
        self.counts.get(name).copied().unwrap_or(0)
    }

    pub fn average(&self, key: &str) -> f64 {
        self.averages.get(key).copied().unwrap_or(0.0)
    }

    pub fn distribution(&self, key: &str) -> Option<&BTreeMap<String, usize>> {
        self.distributions.get(key)
    }
}

/// Arithmetic mean; `0.0` for no values. Non-finite inputs are skipped.
pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Compute every aggregate in `spec` over `items`.
pub fn compute_stats<'a, R, I>(
    items: I,
    spec: &StatsSpec<R>,
    schema: &EntitySchema,
    collator: &Collator,
) -> StatsSnapshot
where
    R: Record + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut snapshot = StatsSnapshot {
        counts: spec.counts.iter().map(|(name, _)| (name.clone(), 0)).collect(),
        distributions: spec
            .distributions
            .iter()
            .map(|key| (key.clone(), BTreeMap::new()))
            .collect(),
        ..StatsSnapshot::default()
    };
    let mut numeric: Vec<Vec<f64>> = vec![Vec::new(); spec.averages.len()];

    for item in items {
        snapshot.total += 1;

        for (name, rule) in &spec.counts {
            if rule.matches(item, schema, collator) {
                *snapshot.counts.entry(name.clone()).or_default() += 1;
            }
        }

        for key in &spec.distributions {
            let bucket = schema
                .value_of(item, key)
                .display_string()
                .unwrap_or_else(|| spec.null_label.clone());
            *snapshot
                .distributions
                .entry(key.clone())
                .or_default()
                .entry(bucket)
                .or_default() += 1;
        }

        for (values, key) in numeric.iter_mut().zip(&spec.averages) {
            if let Some(v) = schema.value_of(item, key).as_f64() {
                values.push(v);
            }
        }
    }

    snapshot.averages = spec
        .averages
        .iter()
        .zip(numeric)
        .map(|(key, values)| (key.clone(), mean(values)))
        .collect();
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::field::{FieldKind, FieldValue};
    use crate::view::schema::FieldSpec;

    #[derive(Clone)]
    struct Answer {
        id: u32,
        model: Option<&'static str>,
        latency_ms: Option<i64>,
        helpful: bool,
    }

    impl Record for Answer {
        type Id = u32;

        fn id(&self) -> u32 {
            self.id
        }

        fn field(&self, key: &str) -> FieldValue {
            match key {
                "model" => self.model.map(|m| FieldValue::Enum(m.to_string())).into(),
                "latency_ms" => self.latency_ms.into(),
                "helpful" => self.helpful.into(),
                _ => FieldValue::Null,
            }
        }
    }

    fn schema() -> EntitySchema {
        EntitySchema::new("answer")
            .field(FieldSpec::new("model", FieldKind::Enum))
            .field(FieldSpec::integer("latency_ms"))
            .field(FieldSpec::boolean("helpful").filterable())
    }

    fn spec() -> StatsSpec<Answer> {
        StatsSpec::new()
            .count_where("helpful", "helpful", FieldFilter::equals(true))
            .count_matching("slow", |a: &Answer| a.latency_ms.unwrap_or(0) > 1000)
            .distribution("model")
            .average("latency_ms")
    }

    fn answers() -> Vec<Answer> {
        vec![
            Answer { id: 1, model: Some("gpt"), latency_ms: Some(400), helpful: true },
            Answer { id: 2, model: Some("llama"), latency_ms: Some(1600), helpful: false },
            Answer { id: 3, model: Some("gpt"), latency_ms: None, helpful: true },
            Answer { id: 4, model: None, latency_ms: Some(1000), helpful: false },
        ]
    }

    #[test]
    fn test_empty_collection_stats() {
        let stats = compute_stats(&Vec::<Answer>::new(), &spec(), &schema(), &Collator::default());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.average("latency_ms"), 0.0);
        assert!(!stats.average("latency_ms").is_nan());
        assert!(stats.distribution("model").unwrap().is_empty());
        assert_eq!(stats.count("helpful"), 0);
    }

    #[test]
    fn test_counts_distribution_and_mean() {
        let items = answers();
        let stats = compute_stats(&items, &spec(), &schema(), &Collator::default());

        assert_eq!(stats.total, 4);
        assert_eq!(stats.count("helpful"), 2);
        assert_eq!(stats.count("slow"), 1);
        assert_eq!(stats.average("latency_ms"), 1000.0);

        let models = stats.distribution("model").unwrap();
        assert_eq!(models.get("gpt"), Some(&2));
        assert_eq!(models.get("llama"), Some(&1));
        assert_eq!(models.get("(none)"), Some(&1));
        assert_eq!(items[0].id(), 1);
    }

    #[test]
    fn test_stats_are_deterministic() {
        let items = answers();
        let first = compute_stats(&items, &spec(), &schema(), &Collator::default());
        let second = compute_stats(&items, &spec(), &schema(), &Collator::default());
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_null_label() {
        let spec = StatsSpec::<Answer>::new().distribution("model").null_label("unknown");
        let stats = compute_stats(&answers(), &spec, &schema(), &Collator::default());
        assert_eq!(stats.distribution("model").unwrap().get("unknown"), Some(&1));
    }

    #[test]
    fn test_mean_skips_non_finite() {
        assert_eq!(mean([]), 0.0);
        assert_eq!(mean([1.0, f64::NAN, 3.0]), 2.0);
    }
}
