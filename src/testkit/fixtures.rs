use serde::{Deserialize, Serialize};

use crate::view::{EntitySchema, FieldSpec, FieldValue, Record};

/// Minimal record used across view tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: u32,
    pub title: String,
    pub status: String,
    pub priority: Option<i64>,
}

impl Ticket {
    pub fn new(id: u32, title: &str, status: &str, priority: Option<i64>) -> Self {
        Self {
            id,
            title: title.to_string(),
            status: status.to_string(),
            priority,
        }
    }
}

impl Record for Ticket {
    type Id = u32;

    fn id(&self) -> u32 {
        self.id
    }

    fn field(&self, key: &str) -> FieldValue {
        match key {
            "id" => i64::from(self.id).into(),
            "title" => self.title.as_str().into(),
            "status" => FieldValue::Enum(self.status.clone()),
            "priority" => self.priority.into(),
            _ => FieldValue::Null,
        }
    }
}

pub fn ticket_schema() -> EntitySchema {
    EntitySchema::new("ticket")
        .field(FieldSpec::integer("id").sortable())
        .field(FieldSpec::text("title").searchable().sortable())
        .field(FieldSpec::enumeration("status", ["open", "closed"]).filterable())
        .field(FieldSpec::integer("priority").filterable().sortable())
}

/// `count` tickets with ids `1..=count`.
///
/// Titles of ids ending in 3 contain `abc`; even ids are open; every fifth
/// ticket has no priority.
pub fn tickets(count: u32) -> Vec<Ticket> {
    (1..=count)
        .map(|id| {
            let title = if id % 10 == 3 {
                format!("abc ticket {id}")
            } else {
                format!("ticket {id}")
            };
            let status = if id % 2 == 0 { "open" } else { "closed" };
            let priority = (id % 5 != 0).then_some(i64::from(id % 4));
            Ticket::new(id, &title, status, priority)
        })
        .collect()
}
