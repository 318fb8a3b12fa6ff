//! Flat records and the tables that hold them.
//!
//! Every entity fetched from Canvas is mapped into a record with a fixed set of scalar
//! fields. A `Table` is an ordered collection of records of one type, and can be flattened
//! into `Row`s (field name → JSON scalar) for any downstream tabular or reporting layer.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// One flattened record: field name to scalar value.
pub type Row = serde_json::Map<String, Value>;

/// Records that belong to a single course and can be tagged with its id.
pub trait CourseScoped {
    fn course_id(&self) -> Option<u64>;

    /// Sets the course id, unless the record already carries one.
    fn tag_course(&mut self, course_id: u64);
}

/// Implements `CourseScoped` for records with a `course_id: Option<u64>` field.
macro_rules! impl_course_scoped {
    ($($record:ty),+ $(,)?) => {
        $(
            impl $crate::record::CourseScoped for $record {
                fn course_id(&self) -> Option<u64> {
                    self.course_id
                }

                fn tag_course(&mut self, course_id: u64) {
                    self.course_id.get_or_insert(course_id);
                }
            }
        )+
    };
}
pub(crate) use impl_course_scoped;

/// Ordered collection of records of one entity type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Table<R> {
    records: Vec<R>,
}

impl<R> Table<R> {
    pub fn new() -> Self {
        Table {
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn into_records(self) -> Vec<R> {
        self.records
    }

    /// Concatenates per-course tables into one table, preserving order.
    pub fn concat(tables: &[Table<R>]) -> Table<R>
    where
        R: Clone,
    {
        tables
            .iter()
            .flat_map(|table| table.records.iter().cloned())
            .collect()
    }
}

impl<R: Serialize> Table<R> {
    /// Flattens every record into a `Row`.
    pub fn rows(&self) -> Vec<Row> {
        self.records.iter().map(to_row).collect()
    }
}

impl<R: CourseScoped> Table<R> {
    /// Tags every record that has no course id yet.
    pub fn tagged(mut self, course_id: u64) -> Self {
        for record in self.records.iter_mut() {
            record.tag_course(course_id);
        }
        self
    }
}

impl<R> Default for Table<R> {
    fn default() -> Self {
        Table::new()
    }
}

impl<R> FromIterator<R> for Table<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Table {
            records: iter.into_iter().collect(),
        }
    }
}

impl<R> From<Vec<R>> for Table<R> {
    fn from(records: Vec<R>) -> Self {
        Table { records }
    }
}

impl<'a, R> IntoIterator for &'a Table<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Flattens one record into a `Row`. Records always serialize to a JSON object.
pub fn to_row<R: Serialize>(record: &R) -> Row {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => map,
        _ => Row::new(),
    }
}

// Field readers shared by the record mappings. A missing, null or mistyped field reads as `None`.

pub(crate) fn timestamp(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

pub(crate) fn text(value: &Value) -> Option<String> {
    value.as_str().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Probe {
        id: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        course_id: Option<u64>,
    }
    impl_course_scoped!(Probe);

    #[test]
    fn test_tagging_keeps_existing_course_id() {
        let table: Table<Probe> = vec![
            Probe {
                id: 1,
                course_id: None,
            },
            Probe {
                id: 2,
                course_id: Some(99),
            },
        ]
        .into();

        let tagged = table.tagged(5);
        let course_ids: Vec<_> = tagged.iter().map(|p| p.course_id()).collect();
        assert_eq!(course_ids, vec![Some(5), Some(99)]);
    }

    #[test]
    fn test_concat_and_rows() {
        let a: Table<Probe> = vec![Probe {
            id: 1,
            course_id: Some(1),
        }]
        .into();
        let b: Table<Probe> = vec![Probe {
            id: 2,
            course_id: None,
        }]
        .into();

        let all = Table::concat(&[a, b]);
        assert_eq!(all.len(), 2);

        let rows = all.rows();
        assert_eq!(rows[0].get("course_id"), Some(&json!(1)));
        assert!(!rows[1].contains_key("course_id"));
    }

    #[test]
    fn test_timestamp_reading() {
        let parsed = timestamp(&json!("2024-02-01T10:00:00Z")).unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-02-01T10:00:00+00:00");
        assert_eq!(timestamp(&json!(null)), None);
        assert_eq!(timestamp(&json!("not a date")), None);
        assert_eq!(timestamp(&Value::Null["missing"]), None);
    }
}
