//! Opaque JSON payloads as records.
//!
//! Evaluation runs and other backend results are displayed without a Rust
//! model. Fields are addressed by dotted path (`metrics.faithfulness`,
//! `contexts.0.source`); objects and arrays read as their compact JSON text.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::view::{FieldValue, Record};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct JsonRecord {
    #[serde(skip)]
    id: String,
    value: Value,
}

impl JsonRecord {
    /// Wrap `value`, taking its id from `id_path`. Ids may be strings or
    /// numbers; anything else yields `None`.
    pub fn new(value: Value, id_path: &str) -> Option<Self> {
        let id = match lookup(&value, id_path)? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        Some(Self { id, value })
    }

    /// Wrap every element of a JSON array, skipping elements without an id.
    pub fn from_array(values: Vec<Value>, id_path: &str) -> Vec<Self> {
        let total = values.len();
        let records: Vec<Self> = values
            .into_iter()
            .filter_map(|value| Self::new(value, id_path))
            .collect();
        if records.len() < total {
            warn!(
                skipped = total - records.len(),
                id_path, "JSON records without an id skipped"
            );
        }
        records
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn to_field_value(value: &Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Null,
        Value::Bool(b) => FieldValue::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => FieldValue::Integer(i),
            None => n.as_f64().map_or(FieldValue::Null, FieldValue::Float),
        },
        Value::String(s) => FieldValue::Text(s.clone()),
        other => FieldValue::Text(other.to_string()),
    }
}

impl Record for JsonRecord {
    type Id = String;

    fn id(&self) -> String {
        self.id.clone()
    }

    fn field(&self, key: &str) -> FieldValue {
        lookup(&self.value, key).map_or(FieldValue::Null, to_field_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{
        CollectionController, EntitySchema, FieldFilter, FieldKind, FieldSpec, SortOrder,
        StatsSpec,
    };
    use serde_json::json;

    fn evaluations() -> Vec<JsonRecord> {
        JsonRecord::from_array(
            vec![
                json!({"run_id": "r1", "question": "What is RAG?", "verdict": "correct",
                       "metrics": {"faithfulness": 0.92, "latency_ms": 850}}),
                json!({"run_id": "r2", "question": "Define CRAG", "verdict": "incorrect",
                       "metrics": {"faithfulness": 0.31}}),
                json!({"run_id": 3, "question": "Chunk size?", "verdict": "ambiguous",
                       "metrics": {"faithfulness": null, "latency_ms": 1200}}),
                json!({"question": "no id"}),
            ],
            "run_id",
        )
    }

    fn schema() -> EntitySchema {
        EntitySchema::new("evaluations")
            .field(FieldSpec::text("question").searchable().sortable())
            .field(FieldSpec::new("verdict", FieldKind::Enum).filterable())
            .field(FieldSpec::float("metrics.faithfulness").sortable().filterable())
            .field(FieldSpec::integer("metrics.latency_ms").sortable())
    }

    #[test]
    fn test_ids_and_paths() {
        let records = evaluations();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].id(), "3");
        assert_eq!(records[0].field("metrics.faithfulness"), FieldValue::Float(0.92));
        assert_eq!(records[0].field("metrics.latency_ms"), FieldValue::Integer(850));
        assert_eq!(records[1].field("metrics.latency_ms"), FieldValue::Null);
        assert_eq!(
            records[0].field("metrics"),
            FieldValue::Text(r#"{"faithfulness":0.92,"latency_ms":850}"#.to_string())
        );
    }

    #[test]
    fn test_array_segments() {
        let record = JsonRecord::new(json!({"id": "x", "contexts": [{"source": "a.pdf"}]}), "id")
            .unwrap();
        assert_eq!(record.field("contexts.0.source"), FieldValue::Text("a.pdf".into()));
        assert_eq!(record.field("contexts.5.source"), FieldValue::Null);
    }

    #[test]
    fn test_json_records_in_controller() {
        let mut view = CollectionController::new(schema())
            .with_stats(StatsSpec::new().average("metrics.faithfulness").distribution("verdict"));
        let ticket = view.begin_load().unwrap();
        view.complete_load(ticket, Ok(evaluations())).unwrap();

        view.set_sort("metrics.faithfulness", SortOrder::Descending)
            .unwrap();
        let order: Vec<String> = view.get_view().items.iter().map(|r| r.id()).collect();
        assert_eq!(order, vec!["r1", "r2", "3"]);

        view.set_field_filter("metrics.faithfulness", FieldFilter::at_least(0.5))
            .unwrap();
        assert_eq!(view.get_view().filtered_count, 1);
        assert_eq!(view.get_stats().average("metrics.faithfulness"), 0.92);
    }
}
