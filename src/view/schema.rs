//! Declarative per-entity field schema.
//!
//! A schema lists which fields of an entity can be searched, filtered and
//! sorted, and how. One generic controller serves every entity type by
//! reading its schema instead of hard-coding field lists per view.

use std::cmp::Ordering;

use super::field::{FieldKind, FieldValue, Record};
use super::filter::FieldFilter;
use crate::error::{Result, ViewError};

/// Custom comparator for a single field. Only called with non-null values.
pub type CompareFn = fn(&FieldValue, &FieldValue) -> Ordering;

/// Declaration of one field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub key: String,
    pub kind: FieldKind,
    pub searchable: bool,
    pub filterable: bool,
    pub sortable: bool,
    pub compare: Option<CompareFn>,
    /// Allowed values for enum fields. `None` accepts any value.
    pub domain: Option<Vec<String>>,
}

impl FieldSpec {
    pub fn new(key: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            kind,
            searchable: false,
            filterable: false,
            sortable: false,
            compare: None,
            domain: None,
        }
    }

    pub fn text(key: impl Into<String>) -> Self {
        Self::new(key, FieldKind::Text)
    }

    pub fn integer(key: impl Into<String>) -> Self {
        Self::new(key, FieldKind::Integer)
    }

    pub fn float(key: impl Into<String>) -> Self {
        Self::new(key, FieldKind::Float)
    }

    pub fn boolean(key: impl Into<String>) -> Self {
        Self::new(key, FieldKind::Bool)
    }

    pub fn timestamp(key: impl Into<String>) -> Self {
        Self::new(key, FieldKind::Timestamp)
    }

    pub fn enumeration<I, S>(key: impl Into<String>, domain: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            domain: Some(domain.into_iter().map(Into::into).collect()),
            ..Self::new(key, FieldKind::Enum)
        }
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn with_compare(mut self, compare: CompareFn) -> Self {
        self.compare = Some(compare);
        self
    }

    fn check_value(&self, value: &FieldValue) -> std::result::Result<(), String> {
        let compatible = match (self.kind, value) {
            (_, FieldValue::Null) => true,
            (FieldKind::Text, FieldValue::Text(_)) => true,
            (FieldKind::Enum, FieldValue::Enum(_) | FieldValue::Text(_)) => true,
            (FieldKind::Integer | FieldKind::Float, FieldValue::Integer(_)) => true,
            (FieldKind::Float, FieldValue::Float(v)) => v.is_finite(),
            (FieldKind::Bool, FieldValue::Bool(_)) => true,
            (FieldKind::Timestamp, FieldValue::Timestamp(_)) => true,
            _ => false,
        };
        if !compatible {
            return Err(format!("{value:?} is not a {:?} value", self.kind));
        }
        if let (Some(domain), Some(raw)) = (&self.domain, value.as_str()) {
            if !domain.iter().any(|allowed| allowed == raw) {
                return Err(format!("`{raw}` is not one of {domain:?}"));
            }
        }
        Ok(())
    }
}

/// Field declarations for one entity type.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    entity: String,
    fields: Vec<FieldSpec>,
}

impl EntitySchema {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.retain(|existing| existing.key != spec.key);
        self.fields.push(spec);
        self
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn get(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.key == key)
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn searchable(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|spec| spec.searchable)
    }

    /// Read a field from a record, converted into its declared kind.
    pub fn value_of<R: Record>(&self, record: &R, key: &str) -> FieldValue {
        let raw = record.field(key);
        match self.get(key) {
            Some(spec) => raw.coerce(spec.kind),
            None => raw,
        }
    }

    /// Check a filter against the declared field and its domain.
    pub fn validate_filter(&self, key: &str, filter: &FieldFilter) -> Result<()> {
        let spec = self
            .get(key)
            .ok_or_else(|| ViewError::invalid_filter(key, "no such field"))?;
        if !spec.filterable {
            return Err(ViewError::invalid_filter(key, "field is not filterable"));
        }

        match filter {
            FieldFilter::Equals(value) => spec.check_value(value),
            FieldFilter::OneOf(values) if values.is_empty() => {
                Err("empty value list".to_string())
            }
            FieldFilter::OneOf(values) => values.iter().try_for_each(|v| spec.check_value(v)),
            FieldFilter::Range { .. } if !spec.kind.is_ordered() => {
                Err(format!("{:?} fields do not support ranges", spec.kind))
            }
            FieldFilter::Range { min: None, max: None } => Err("range has no bounds".to_string()),
            FieldFilter::Range { min, max } => {
                for bound in [min, max].into_iter().flatten() {
                    if bound.is_null() {
                        return Err(ViewError::invalid_filter(key, "range bound is null"));
                    }
                    spec.check_value(bound)
                        .map_err(|reason| ViewError::invalid_filter(key, reason))?;
                }
                match (min, max) {
                    (Some(lo), Some(hi))
                        if super::filter::compare_values(lo, hi, &Default::default())
                            == Ordering::Greater =>
                    {
                        Err("range minimum exceeds maximum".to_string())
                    }
                    _ => Ok(()),
                }
            }
        }
        .map_err(|reason| ViewError::invalid_filter(key, reason))
    }

    pub fn validate_sort_key(&self, key: &str) -> Result<&FieldSpec> {
        self.get(key)
            .filter(|spec| spec.sortable)
            .ok_or_else(|| ViewError::InvalidSortKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn schema() -> EntitySchema {
        EntitySchema::new("user")
            .field(FieldSpec::text("name").searchable().sortable())
            .field(FieldSpec::enumeration("status", ["active", "inactive"]).filterable())
            .field(FieldSpec::integer("age").filterable().sortable())
            .field(FieldSpec::timestamp("created_at").filterable().sortable())
            .field(FieldSpec::boolean("admin").filterable())
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = schema()
            .validate_filter("colour", &FieldFilter::Equals("red".into()))
            .unwrap_err();
        assert!(matches!(err, ViewError::InvalidFilterValue { ref key, .. } if key == "colour"));
    }

    #[test]
    fn test_not_filterable_rejected() {
        assert!(schema()
            .validate_filter("name", &FieldFilter::Equals("bob".into()))
            .is_err());
    }

    #[test]
    fn test_enum_domain_enforced() {
        let schema = schema();
        assert!(schema
            .validate_filter("status", &FieldFilter::Equals("active".into()))
            .is_ok());
        assert!(schema
            .validate_filter("status", &FieldFilter::Equals("deleted".into()))
            .is_err());
        assert!(schema
            .validate_filter(
                "status",
                &FieldFilter::OneOf(vec!["active".into(), "banned".into()])
            )
            .is_err());
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        assert!(schema()
            .validate_filter("age", &FieldFilter::Equals("old".into()))
            .is_err());
        assert!(schema()
            .validate_filter("admin", &FieldFilter::Equals(FieldValue::Integer(1)))
            .is_err());
    }

    #[test]
    fn test_range_validation() {
        let schema = schema();
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

        assert!(schema
            .validate_filter("created_at", &FieldFilter::between(start, end))
            .is_ok());
        assert!(schema
            .validate_filter("created_at", &FieldFilter::between(end, start))
            .is_err());
        assert!(schema
            .validate_filter("admin", &FieldFilter::at_least(true))
            .is_err());
        assert!(schema
            .validate_filter("age", &FieldFilter::Range { min: None, max: None })
            .is_err());
    }

    #[test]
    fn test_sort_key_validation() {
        let schema = schema();
        assert!(schema.validate_sort_key("name").is_ok());
        assert!(matches!(
            schema.validate_sort_key("status"),
            Err(ViewError::InvalidSortKey(_))
        ));
    }

    #[test]
    fn test_redeclared_field_replaces_previous() {
        let schema = schema().field(FieldSpec::text("name"));
        assert_eq!(schema.fields().len(), 5);
        assert!(!schema.get("name").unwrap().sortable);
    }
}
