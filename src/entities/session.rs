//! Learning chat sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Entity;
use crate::view::{EntitySchema, FieldFilter, FieldSpec, FieldValue, Record, StatsSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
    Archived,
}

impl SessionStatus {
    pub const ALL: [SessionStatus; 3] = [
        SessionStatus::Active,
        SessionStatus::Completed,
        SessionStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Archived => "archived",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub username: Option<String>,
    pub title: String,
    pub status: SessionStatus,
    #[serde(default)]
    pub message_count: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for Session {
    type Id = String;

    fn id(&self) -> String {
        self.id.clone()
    }

    fn field(&self, key: &str) -> FieldValue {
        match key {
            "user_id" => self.user_id.as_str().into(),
            "username" => self.username.clone().into(),
            "title" => self.title.as_str().into(),
            "status" => FieldValue::Enum(self.status.as_str().to_string()),
            "message_count" => self.message_count.into(),
            "created_at" => self.created_at.into(),
            "updated_at" => self.updated_at.into(),
            _ => FieldValue::Null,
        }
    }
}

impl Entity for Session {
    const NAME: &'static str = "sessions";

    fn schema() -> EntitySchema {
        EntitySchema::new(Self::NAME)
            .field(FieldSpec::text("title").searchable().sortable())
            .field(FieldSpec::text("username").searchable().sortable())
            .field(FieldSpec::text("user_id").filterable())
            .field(
                FieldSpec::enumeration(
                    "status",
                    SessionStatus::ALL.iter().map(SessionStatus::as_str),
                )
                .filterable()
                .sortable(),
            )
            .field(FieldSpec::integer("message_count").filterable().sortable())
            .field(FieldSpec::timestamp("created_at").filterable().sortable())
            .field(FieldSpec::timestamp("updated_at").sortable())
    }

    fn stats_spec() -> StatsSpec<Self> {
        StatsSpec::new()
            .count_where("active", "status", FieldFilter::equals("active"))
            .count_where("empty", "message_count", FieldFilter::equals(0i64))
            .distribution("status")
            .average("message_count")
    }
}
