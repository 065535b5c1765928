//! Logged question/answer interactions with the RAG assistant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Entity;
use crate::view::{
    EntitySchema, FieldFilter, FieldKind, FieldSpec, FieldValue, Record, StatsSpec,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Positive,
    Negative,
}

impl Feedback {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feedback::Positive => "positive",
            Feedback::Negative => "negative",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: String,
    pub session_id: String,
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub latency_ms: Option<i64>,
    /// Retrieval relevance in `[0, 1]`, when the evaluator scored it
    #[serde(default)]
    pub relevance_score: Option<f64>,
    #[serde(default)]
    pub feedback: Option<Feedback>,
    #[serde(default)]
    pub sources: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Record for Interaction {
    type Id = String;

    fn id(&self) -> String {
        self.id.clone()
    }

    fn field(&self, key: &str) -> FieldValue {
        match key {
            "session_id" => self.session_id.as_str().into(),
            "question" => self.question.as_str().into(),
            "answer" => self.answer.as_str().into(),
            "model" => self.model.clone().map(FieldValue::Enum).into(),
            "latency_ms" => self.latency_ms.into(),
            "relevance_score" => self.relevance_score.into(),
            "feedback" => self
                .feedback
                .map(|f| FieldValue::Enum(f.as_str().to_string()))
                .into(),
            "source_count" => (self.sources.len() as i64).into(),
            "created_at" => self.created_at.into(),
            _ => FieldValue::Null,
        }
    }
}

impl Entity for Interaction {
    const NAME: &'static str = "interactions";

    fn schema() -> EntitySchema {
        EntitySchema::new(Self::NAME)
            .field(FieldSpec::text("question").searchable().sortable())
            .field(FieldSpec::text("answer").searchable())
            .field(FieldSpec::text("session_id").filterable())
            .field(FieldSpec::new("model", FieldKind::Enum).filterable().sortable())
            .field(FieldSpec::integer("latency_ms").filterable().sortable())
            .field(FieldSpec::float("relevance_score").filterable().sortable())
            .field(FieldSpec::enumeration("feedback", ["positive", "negative"]).filterable())
            .field(FieldSpec::integer("source_count").sortable())
            .field(FieldSpec::timestamp("created_at").filterable().sortable())
    }

    fn stats_spec() -> StatsSpec<Self> {
        StatsSpec::new()
            .count_where("negative", "feedback", FieldFilter::equals("negative"))
            .count_matching("unsourced", |i: &Self| i.sources.is_empty())
            .distribution("model")
            .distribution("feedback")
            .average("latency_ms")
            .average("relevance_score")
    }
}
