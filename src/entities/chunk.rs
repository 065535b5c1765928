//! Document chunks produced by the ingestion pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Entity;
use crate::view::{EntitySchema, FieldFilter, FieldSpec, FieldValue, Record, StatsSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingStatus {
    Pending,
    Embedded,
    Failed,
}

impl EmbeddingStatus {
    pub const ALL: [EmbeddingStatus; 3] = [
        EmbeddingStatus::Pending,
        EmbeddingStatus::Embedded,
        EmbeddingStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingStatus::Pending => "pending",
            EmbeddingStatus::Embedded => "embedded",
            EmbeddingStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub document_id: String,
    /// File name of the source document
    pub source: String,
    pub chunk_index: i64,
    pub content: String,
    #[serde(default)]
    pub token_count: Option<i64>,
    pub embedding_status: EmbeddingStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for Chunk {
    type Id = String;

    fn id(&self) -> String {
        self.id.clone()
    }

    fn field(&self, key: &str) -> FieldValue {
        match key {
            "document_id" => self.document_id.as_str().into(),
            "source" => self.source.as_str().into(),
            "chunk_index" => self.chunk_index.into(),
            "content" => self.content.as_str().into(),
            "token_count" => self.token_count.into(),
            "embedding_status" => FieldValue::Enum(self.embedding_status.as_str().to_string()),
            "created_at" => self.created_at.into(),
            _ => FieldValue::Null,
        }
    }
}

impl Entity for Chunk {
    const NAME: &'static str = "chunks";

    fn schema() -> EntitySchema {
        EntitySchema::new(Self::NAME)
            .field(FieldSpec::text("source").searchable().filterable().sortable())
            .field(FieldSpec::text("content").searchable())
            .field(FieldSpec::text("document_id").filterable())
            .field(FieldSpec::integer("chunk_index").sortable())
            .field(FieldSpec::integer("token_count").filterable().sortable())
            .field(
                FieldSpec::enumeration(
                    "embedding_status",
                    EmbeddingStatus::ALL.iter().map(EmbeddingStatus::as_str),
                )
                .filterable()
                .sortable(),
            )
            .field(FieldSpec::timestamp("created_at").sortable())
    }

    fn stats_spec() -> StatsSpec<Self> {
        StatsSpec::new()
            .count_where(
                "failed",
                "embedding_status",
                FieldFilter::equals("failed"),
            )
            .distribution("embedding_status")
            .distribution("source")
            .average("token_count")
    }
}
