//! Partial-update `SET` clause builder.
//!
//! Turns a sparse set of field updates into `"col"=$n` assignments:
//!
//! ```ignore
//! use jobly::{FieldNameMap, UpdatePayload, sql_for_partial_update};
//!
//! let payload = UpdatePayload::new().with("numEmployees", 12).with("name", "Acme");
//! let map = FieldNameMap::from_pairs([("numEmployees", "num_employees")]);
//! let set = sql_for_partial_update(&payload, &map, 1)?;
//! assert_eq!(set.sql, r#""num_employees"=$1, "name"=$2"#);
//! ```
//!
//! The `SET` keyword is left to the caller, who usually appends a `WHERE`
//! clause numbered after the assignments.

use crate::error::{JoblyError, JoblyResult};
use crate::fragment::{Placeholders, SqlFragment};
use crate::ident::write_quoted;
use crate::value::Value;
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;

/// Field updates in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct UpdatePayload {
    fields: IndexMap<String, Value>,
}

impl UpdatePayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a field, keeping its original position if replaced.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Build the `SET` assignments numbered from `$1`.
    pub fn to_set_clause(&self, field_map: &FieldNameMap) -> JoblyResult<SqlFragment> {
        sql_for_partial_update(self, field_map, 1)
    }
}

impl TryFrom<serde_json::Value> for UpdatePayload {
    type Error = JoblyError;

    fn try_from(value: serde_json::Value) -> JoblyResult<Self> {
        let serde_json::Value::Object(map) = value else {
            return Err(JoblyError::bad_request("update payload must be a JSON object"));
        };
        let mut payload = UpdatePayload::new();
        for (field, raw) in map {
            payload.insert(field, Value::try_from(raw)?);
        }
        Ok(payload)
    }
}

impl<K, V> FromIterator<(K, V)> for UpdatePayload
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut payload = UpdatePayload::new();
        for (k, v) in iter {
            payload.insert(k, v);
        }
        payload
    }
}

/// Application field name to storage column name.
///
/// Fields without an entry are used verbatim as the column name.
#[derive(Debug, Clone, Default)]
pub struct FieldNameMap {
    columns: HashMap<String, String>,
}

impl FieldNameMap {
    /// A map with no renames.
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            columns: pairs
                .into_iter()
                .map(|(field, column)| (field.to_string(), column.to_string()))
                .collect(),
        }
    }

    /// Column for `field`, falling back to `field` itself.
    pub fn column_for<'a>(&'a self, field: &'a str) -> &'a str {
        self.columns.get(field).map_or(field, String::as_str)
    }
}

/// Build `"col1"=$n, "col2"=$n+1, ...` for every field in `payload`.
///
/// Numbering starts at `start_index` so further parameters (typically the row
/// id in `WHERE`) can follow at `start_index + payload.len()`.
///
/// Returns [`JoblyError::BadRequest`] if `payload` is empty, since an `UPDATE`
/// with no assignments is not valid SQL.
pub fn sql_for_partial_update(
    payload: &UpdatePayload,
    field_map: &FieldNameMap,
    start_index: usize,
) -> JoblyResult<SqlFragment> {
    if payload.is_empty() {
        return Err(JoblyError::bad_request("No data"));
    }

    let mut params = Placeholders::starting_at(start_index)?;
    let mut sql = String::new();
    for (i, (field, value)) in payload.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        write_quoted(field_map.column_for(field), &mut sql);
        sql.push('=');
        params.push_bind(&mut sql, value.clone());
    }

    Ok(params.finish(sql))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::count_placeholders;

    fn ab() -> UpdatePayload {
        UpdatePayload::new().with("a", 1).with("b", 2)
    }

    #[test]
    fn verbatim_when_map_is_empty() {
        let frag = sql_for_partial_update(&ab(), &FieldNameMap::identity(), 1).unwrap();
        assert_eq!(frag.sql, r#""a"=$1, "b"=$2"#);
        assert_eq!(frag.values, vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn remaps_every_mapped_field() {
        let map = FieldNameMap::from_pairs([("a", "c"), ("b", "d")]);
        let frag = sql_for_partial_update(&ab(), &map, 1).unwrap();
        assert_eq!(frag.sql, r#""c"=$1, "d"=$2"#);
        assert_eq!(frag.values, vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn partially_mapped_payload() {
        let payload = UpdatePayload::new()
            .with("name", "Acme")
            .with("numEmployees", 40)
            .with("logoUrl", Value::Null);
        let map = FieldNameMap::from_pairs([
            ("numEmployees", "num_employees"),
            ("logoUrl", "logo_url"),
        ]);
        let frag = payload.to_set_clause(&map).unwrap();
        assert_eq!(frag.sql, r#""name"=$1, "num_employees"=$2, "logo_url"=$3"#);
        assert_eq!(
            frag.values,
            vec![Value::from("Acme"), Value::Int(40), Value::Null]
        );
    }

    #[test]
    fn empty_payload_is_bad_request() {
        let err = sql_for_partial_update(&UpdatePayload::new(), &FieldNameMap::identity(), 1)
            .unwrap_err();
        assert!(matches!(err, JoblyError::BadRequest(_)));
    }

    #[test]
    fn numbering_starts_at_offset() {
        let frag = sql_for_partial_update(&ab(), &FieldNameMap::identity(), 3).unwrap();
        assert_eq!(frag.sql, r#""a"=$3, "b"=$4"#);
    }

    #[test]
    fn where_param_follows_offset_set_clause() {
        let mut frag = sql_for_partial_update(&ab(), &FieldNameMap::identity(), 3).unwrap();
        assert_eq!(frag.next_index(), 5);
        let id_idx = frag.push_value(9);
        assert_eq!(id_idx, 5);
        assert_eq!(frag.values, vec![Value::Int(1), Value::Int(2), Value::Int(9)]);
    }

    #[test]
    fn zero_offset_is_bad_request() {
        let err = sql_for_partial_update(&ab(), &FieldNameMap::identity(), 0).unwrap_err();
        assert!(err.is_bad_request());
    }

    #[test]
    fn preserves_json_insertion_order() {
        let json = serde_json::json!({"title": "New", "salary": 500, "equity": "0.5"});
        let payload = UpdatePayload::try_from(json).unwrap();
        let frag = payload.to_set_clause(&FieldNameMap::identity()).unwrap();
        assert_eq!(frag.sql, r#""title"=$1, "salary"=$2, "equity"=$3"#);
        assert_eq!(
            frag.values,
            vec![Value::from("New"), Value::Int(500), Value::from("0.5")]
        );
        assert_eq!(count_placeholders(&frag.sql), frag.values.len());
    }

    #[test]
    fn non_object_json_is_rejected() {
        assert!(UpdatePayload::try_from(serde_json::json!([1])).is_err());
    }

    #[test]
    fn quotes_awkward_column_names() {
        let payload = UpdatePayload::new().with(r#"we"ird"#, true);
        let frag = payload.to_set_clause(&FieldNameMap::identity()).unwrap();
        assert_eq!(frag.sql, r#""we""ird"=$1"#);
    }

    #[test]
    fn placeholder_count_matches_values_for_many_fields() {
        let payload: UpdatePayload = (0..12).map(|i| (format!("f{i}"), i)).collect();
        let frag = payload.to_set_clause(&FieldNameMap::identity()).unwrap();
        assert_eq!(count_placeholders(&frag.sql), 12);
        assert_eq!(frag.values.len(), 12);
        assert!(frag.sql.ends_with(r#""f11"=$12"#));
        let expected: Vec<Value> = (0..12).map(Value::from).collect();
        assert_eq!(frag.values, expected);
    }

    #[test]
    fn deserializes_from_json_text() {
        let payload: UpdatePayload = serde_json::from_str(r#"{"b": 2, "a": 1}"#).unwrap();
        let keys: Vec<&str> = payload.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["b", "a"]);
    }
}
