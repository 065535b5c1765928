//! Platform accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Entity;
use crate::view::{EntitySchema, FieldFilter, FieldSpec, FieldValue, Record, StatsSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Teacher,
    Student,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::Admin, UserRole::Teacher, UserRole::Student];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Teacher => "teacher",
            UserRole::Student => "student",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub role: UserRole,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl Record for User {
    type Id = String;

    fn id(&self) -> String {
        self.id.clone()
    }

    fn field(&self, key: &str) -> FieldValue {
        match key {
            "username" => self.username.as_str().into(),
            "email" => self.email.as_str().into(),
            "full_name" => self.full_name.clone().into(),
            "role" => FieldValue::Enum(self.role.as_str().to_string()),
            "is_active" => self.is_active.into(),
            "created_at" => self.created_at.into(),
            "last_login" => self.last_login.into(),
            _ => FieldValue::Null,
        }
    }
}

impl Entity for User {
    const NAME: &'static str = "users";

    fn schema() -> EntitySchema {
        EntitySchema::new(Self::NAME)
            .field(FieldSpec::text("username").searchable().sortable())
            .field(FieldSpec::text("email").searchable().sortable())
            .field(FieldSpec::text("full_name").searchable().sortable())
            .field(
                FieldSpec::enumeration("role", UserRole::ALL.iter().map(UserRole::as_str))
                    .filterable()
                    .sortable(),
            )
            .field(FieldSpec::boolean("is_active").filterable().sortable())
            .field(FieldSpec::timestamp("created_at").filterable().sortable())
            .field(FieldSpec::timestamp("last_login").filterable().sortable())
    }

    fn stats_spec() -> StatsSpec<Self> {
        StatsSpec::new()
            .count_where("active", "is_active", FieldFilter::equals(true))
            .count_matching("never_logged_in", |user: &Self| user.last_login.is_none())
            .distribution("role")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::controller;
    use crate::view::{ControllerOptions, SortOrder};
    use chrono::TimeZone;

    fn user(id: &str, username: &str, role: UserRole, login_day: Option<u32>) -> User {
        User {
            id: id.to_string(),
            username: username.to_string(),
            email: format!("{username}@school.example"),
            full_name: None,
            role,
            is_active: role != UserRole::Student || login_day.is_some(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            last_login: login_day.map(|d| Utc.with_ymd_and_hms(2024, 3, d, 9, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_deserialize_api_payload() {
        let user: User = serde_json::from_str(
            r#"{
                "id": "u-1",
                "username": "ayse",
                "email": "ayse@school.example",
                "role": "teacher",
                "created_at": "2024-02-01T10:00:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(user.role, UserRole::Teacher);
        assert!(user.is_active);
        assert_eq!(user.field("last_login"), FieldValue::Null);
    }

    #[test]
    fn test_role_filter_and_login_sort() {
        let mut view = controller::<User>(ControllerOptions::default());
        let ticket = view.begin_load().unwrap();
        view.complete_load(
            ticket,
            Ok(vec![
                user("1", "zeynep", UserRole::Student, Some(3)),
                user("2", "ali", UserRole::Student, None),
                user("3", "can", UserRole::Admin, Some(9)),
                user("4", "deniz", UserRole::Student, Some(12)),
            ]),
        )
        .unwrap();

        view.set_field_filter("role", FieldFilter::equals("student"))
            .unwrap();
        view.set_sort("last_login", SortOrder::Descending).unwrap();

        let names: Vec<String> = view.get_view().items.into_iter().map(|u| u.username).collect();
        assert_eq!(names, vec!["deniz", "zeynep", "ali"]);

        let stats = view.get_stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.count("active"), 2);
        assert_eq!(stats.count("never_logged_in"), 1);
    }

    #[test]
    fn test_unknown_role_rejected() {
        let mut view = controller::<User>(ControllerOptions::default());
        assert!(view
            .set_field_filter("role", FieldFilter::equals("superuser"))
            .is_err());
    }
}
