// Necessary imports from standard and external crates.
use crate::record::{text, timestamp};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Structure holding detailed information about a Canvas course.
///
/// This is the live handle returned by the course listing. It keeps the parsed fields
/// needed to drive further requests (the id, the activity window) together with the raw
/// JSON object, from which the lossy `CourseRecord` is derived.
///
/// Fields:
/// - `id`: Unique identifier of the course in the Canvas system.
/// - `name`: Official name of the course.
/// - `course_code`: Short identifier or code for the course.
/// - `start_at` / `end_at`: Active window of the course, when set.
/// - `raw`: The course object exactly as Canvas returned it.
#[derive(Debug, Default)]
pub struct CourseInfo {
    pub id: u64,
    pub name: String,
    pub course_code: Option<String>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub raw: Value,
}

/// High-level representation of a Canvas course.
///
/// This structure is a cheap-to-clone wrapper around `CourseInfo`, passed to every
/// per-course listing operation.
#[derive(Debug, Clone)]
pub struct Course {
    pub info: Arc<CourseInfo>,
}

impl Course {
    /// Converts a JSON object from the Canvas API to a `Course`.
    ///
    /// Returns `None` if the object has no numeric `id`.
    pub fn from_json(course: &Value) -> Option<Course> {
        let id = course["id"].as_u64()?;
        Some(Course {
            info: Arc::new(CourseInfo {
                id,
                name: text(&course["name"]).unwrap_or_default(),
                course_code: text(&course["course_code"]),
                start_at: timestamp(&course["start_at"]),
                end_at: timestamp(&course["end_at"]),
                raw: course.clone(),
            }),
        })
    }

    pub fn id(&self) -> u64 {
        self.info.id
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Maps this course into its flat record.
    pub fn record(&self) -> CourseRecord {
        CourseRecord::from_handle(self)
    }

    /// Checks whether `now` lies inside the course's `[start_at, end_at]` window.
    ///
    /// A course missing either bound is never considered active.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        match (self.info.start_at, self.info.end_at) {
            (Some(start), Some(end)) => start <= now && now <= end,
            _ => false,
        }
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.info.name, self.info.id)
    }
}

/// SIS course id of a course, as far as the session is allowed to see it.
///
/// Canvas only includes `sis_course_id` for sessions with SIS read permission. A course
/// fetched without that permission is `Unavailable` and its record has no such field at
/// all; a permitted session may still see `Available(None)` for courses without a SIS id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SisCourseId {
    #[default]
    Unavailable,
    Available(Option<String>),
}

impl SisCourseId {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, SisCourseId::Unavailable)
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            SisCourseId::Available(Some(id)) => Some(id),
            _ => None,
        }
    }

    fn from_course(course: &Value) -> SisCourseId {
        match course.get("sis_course_id") {
            Some(value) => SisCourseId::Available(text(value)),
            None => SisCourseId::Unavailable,
        }
    }
}

impl Serialize for SisCourseId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SisCourseId::Available(id) => id.serialize(serializer),
            SisCourseId::Unavailable => serializer.serialize_none(),
        }
    }
}

/// Flat record of a course.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseRecord {
    pub id: u64,
    pub name: Option<String>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub workflow_state: Option<String>,
    #[serde(skip_serializing_if = "SisCourseId::is_unavailable")]
    pub sis_course_id: SisCourseId,
    pub is_public: Option<bool>,
}

impl CourseRecord {
    /// Maps a raw Canvas course object.
    pub fn from_json(course: &Value) -> Option<CourseRecord> {
        Some(CourseRecord {
            id: course["id"].as_u64()?,
            name: text(&course["name"]),
            start_at: timestamp(&course["start_at"]),
            end_at: timestamp(&course["end_at"]),
            workflow_state: text(&course["workflow_state"]),
            sis_course_id: SisCourseId::from_course(course),
            is_public: course["is_public"].as_bool(),
        })
    }

    fn from_handle(course: &Course) -> CourseRecord {
        CourseRecord::from_json(&course.info.raw).unwrap_or_else(|| CourseRecord {
            id: course.info.id,
            name: Some(course.info.name.clone()),
            start_at: course.info.start_at,
            end_at: course.info.end_at,
            workflow_state: None,
            sis_course_id: SisCourseId::Unavailable,
            is_public: None,
        })
    }

    /// Whether this record was mapped with SIS read capability.
    pub fn has_sis_id(&self) -> bool {
        !self.sis_course_id.is_unavailable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::to_row;
    use chrono::TimeZone;
    use serde_json::json;

    fn course_json() -> Value {
        json!({
            "id": 101,
            "name": "Databases",
            "course_code": "CIS 450",
            "start_at": "2024-01-10T05:00:00Z",
            "end_at": "2024-05-10T05:00:00Z",
            "workflow_state": "available",
            "is_public": false
        })
    }

    #[test]
    fn test_missing_sis_id_is_omitted() {
        let record = CourseRecord::from_json(&course_json()).unwrap();
        assert!(!record.has_sis_id());

        let row = to_row(&record);
        assert!(!row.contains_key("sis_course_id"));
        assert_eq!(row["name"], json!("Databases"));
        assert_eq!(row["start_at"], json!("2024-01-10T05:00:00Z"));
    }

    #[test]
    fn test_present_sis_id_is_kept_even_when_null() {
        let mut with_id = course_json();
        with_id["sis_course_id"] = json!("2024A-CIS-450-001");
        let record = CourseRecord::from_json(&with_id).unwrap();
        assert!(record.has_sis_id());
        assert_eq!(record.sis_course_id.value(), Some("2024A-CIS-450-001"));
        assert_eq!(to_row(&record)["sis_course_id"], json!("2024A-CIS-450-001"));

        let mut null_id = course_json();
        null_id["sis_course_id"] = Value::Null;
        let record = CourseRecord::from_json(&null_id).unwrap();
        assert!(record.has_sis_id());
        assert_eq!(to_row(&record)["sis_course_id"], Value::Null);
    }

    #[test]
    fn test_course_without_id_is_rejected() {
        assert!(Course::from_json(&json!({"name": "x"})).is_none());
        assert!(CourseRecord::from_json(&json!({"name": "x"})).is_none());
    }

    #[test]
    fn test_active_window() {
        let course = Course::from_json(&course_json()).unwrap();
        let inside = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert!(course.is_active_at(inside));
        assert!(!course.is_active_at(after));

        let open_ended = Course::from_json(&json!({"id": 1, "start_at": "2024-01-01T00:00:00Z"}))
            .unwrap();
        assert!(!open_ended.is_active_at(inside));
    }

    #[test]
    fn test_handle_record_matches_json_record() {
        let course = Course::from_json(&course_json()).unwrap();
        assert_eq!(course.record(), CourseRecord::from_json(&course_json()).unwrap());
        assert_eq!(course.to_string(), "Databases (101)");
    }
}
