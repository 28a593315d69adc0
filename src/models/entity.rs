use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Free-form document fields, in insertion order.
pub type Fields = serde_json::Map<String, Value>;

/// Field holding the creation timestamp. The remote sort key.
pub const CREATED_AT: &str = "createdAt";
/// Field holding the last-updated timestamp.
pub const UPDATED_AT: &str = "updatedAt";

/// Formats a timestamp the way it is stored in documents.
///
/// Fixed precision with a `Z` suffix keeps lexical order equal to time order.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses a stored timestamp value.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let raw = value.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

/// Merges `patch` into `target`.
///
/// Every key present in `patch` replaces the value in `target`; keys that
/// `patch` does not mention are left untouched. The merge is shallow.
pub fn apply_patch(target: &mut Fields, patch: &Fields) {
    for (key, value) in patch {
        target.insert(key.clone(), value.clone());
    }
}

/// One record of a remote collection, as held in the local cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entity {
    pub id: String,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Entity {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns a string field, or `None` if absent or not a string.
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn bool_field(&self, field: &str) -> Option<bool> {
        self.fields.get(field).and_then(Value::as_bool)
    }

    pub fn f64_field(&self, field: &str) -> Option<f64> {
        self.fields.get(field).and_then(Value::as_f64)
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.fields.get(CREATED_AT).and_then(parse_timestamp)
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.fields.get(UPDATED_AT).and_then(parse_timestamp)
    }

    /// Merges a partial update into this record's fields.
    pub fn apply(&mut self, patch: &Fields) {
        apply_patch(&mut self.fields, patch);
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.id)?;
        writeln!(f, "{}", "=".repeat(self.id.len()))?;

        for (key, value) in &self.fields {
            match value {
                Value::String(s) => writeln!(f, "{}: {}", key, s)?,
                Value::Array(items) => writeln!(f, "{}: {} item(s)", key, items.len())?,
                other => writeln!(f, "{}: {}", key, other)?,
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_apply_patch_new_fields_win() {
        let mut target = fields(json!({"name": "Rose", "price": 10, "active": true}));
        let patch = fields(json!({"price": 12, "featured": true}));

        apply_patch(&mut target, &patch);

        assert_eq!(target["price"], json!(12));
        assert_eq!(target["featured"], json!(true));
        assert_eq!(target["name"], json!("Rose"));
        assert_eq!(target["active"], json!(true));
    }

    #[test]
    fn test_apply_patch_is_shallow() {
        let mut target = fields(json!({"address": {"city": "Oslo", "zip": "0150"}}));
        let patch = fields(json!({"address": {"city": "Bergen"}}));

        apply_patch(&mut target, &patch);

        assert_eq!(target["address"], json!({"city": "Bergen"}));
    }

    #[test]
    fn test_apply_patch_empty_is_noop() {
        let mut target = fields(json!({"status": "active"}));
        let before = target.clone();

        apply_patch(&mut target, &Fields::new());

        assert_eq!(target, before);
    }

    #[test]
    fn test_timestamps_sort_lexically() {
        let earlier = Utc.with_ymd_and_hms(2024, 1, 9, 23, 59, 59).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();

        assert!(format_timestamp(earlier) < format_timestamp(later));
    }

    #[test]
    fn test_entity_timestamp_accessors() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut f = Fields::new();
        f.insert(CREATED_AT.into(), Value::String(format_timestamp(at)));
        f.insert(UPDATED_AT.into(), json!(42));

        let entity = Entity::new("abc", f);
        assert_eq!(entity.created_at(), Some(at));
        assert_eq!(entity.updated_at(), None);
    }

    #[test]
    fn test_entity_serializes_flat() {
        let entity = Entity::new("p1", fields(json!({"category": "flower"})));
        let value = serde_json::to_value(&entity).unwrap();

        assert_eq!(value, json!({"id": "p1", "category": "flower"}));
    }
}
