//! Roles and their permission sets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Entity;
use crate::view::{EntitySchema, FieldFilter, FieldSpec, FieldValue, Record, StatsSpec};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub user_count: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for Role {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }

    fn field(&self, key: &str) -> FieldValue {
        match key {
            "name" => self.name.as_str().into(),
            "description" => self.description.clone().into(),
            "permissions" => self.permissions.join(", ").into(),
            "permission_count" => (self.permissions.len() as i64).into(),
            "user_count" => self.user_count.into(),
            "created_at" => self.created_at.into(),
            _ => FieldValue::Null,
        }
    }
}

impl Entity for Role {
    const NAME: &'static str = "roles";

    fn schema() -> EntitySchema {
        EntitySchema::new(Self::NAME)
            .field(FieldSpec::text("name").searchable().sortable())
            .field(FieldSpec::text("description").searchable())
            .field(FieldSpec::text("permissions").searchable())
            .field(FieldSpec::integer("permission_count").filterable().sortable())
            .field(FieldSpec::integer("user_count").filterable().sortable())
            .field(FieldSpec::timestamp("created_at").sortable())
    }

    fn stats_spec() -> StatsSpec<Self> {
        StatsSpec::new()
            .count_where("unused", "user_count", FieldFilter::equals(0i64))
            .average("permission_count")
            .average("user_count")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::controller;
    use crate::view::ControllerOptions;

    fn role(id: i64, name: &str, permissions: &[&str], user_count: i64) -> Role {
        Role {
            id,
            name: name.to_string(),
            description: None,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            user_count,
            created_at: None,
        }
    }

    #[test]
    fn test_search_matches_permissions() {
        let mut view = controller::<Role>(ControllerOptions::default());
        let ticket = view.begin_load().unwrap();
        view.complete_load(
            ticket,
            Ok(vec![
                role(1, "Admin", &["users.write", "documents.write"], 2),
                role(2, "Reviewer", &["documents.read"], 0),
                role(3, "Guest", &[], 0),
            ]),
        )
        .unwrap();

        view.set_search_term("DOCUMENTS");
        assert_eq!(view.get_view().filtered_count, 2);
        assert_eq!(view.get_stats().count("unused"), 1);
        assert_eq!(view.get_stats().average("permission_count"), 1.5);
    }

    #[test]
    fn test_permission_count_range() {
        let mut view = controller::<Role>(ControllerOptions::default());
        let ticket = view.begin_load().unwrap();
        view.complete_load(
            ticket,
            Ok(vec![
                role(1, "Admin", &["a", "b", "c"], 1),
                role(2, "Guest", &[], 5),
            ]),
        )
        .unwrap();
        view.set_field_filter("permission_count", FieldFilter::at_least(1i64))
            .unwrap();
        let view = view.get_view();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].name, "Admin");
    }
}
