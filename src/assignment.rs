// Import necessary crates and modules
use crate::record::{impl_course_scoped, text, timestamp};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Flat record of an assignment in a Canvas course.
///
/// Fields:
/// - `id`: Unique identifier for the assignment in the Canvas system.
/// - `name`: The name of the assignment.
/// - `due_at` / `unlock_at` / `lock_at`: Scheduling dates, when set.
/// - `points_possible`: Maximum score.
/// - `allowed_attempts`: Number of attempts; Canvas uses `-1` for unlimited.
/// - `muted`: Whether grades are hidden from students.
/// - `course_id`: Course the record was collected for.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AssignmentRecord {
    pub id: u64,
    pub name: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
    pub unlock_at: Option<DateTime<Utc>>,
    pub lock_at: Option<DateTime<Utc>>,
    pub points_possible: Option<f64>,
    pub allowed_attempts: Option<i64>,
    pub muted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<u64>,
}

impl AssignmentRecord {
    pub fn from_json(assignment: &Value) -> Option<AssignmentRecord> {
        Some(AssignmentRecord {
            id: assignment["id"].as_u64()?,
            name: text(&assignment["name"]),
            due_at: timestamp(&assignment["due_at"]),
            unlock_at: timestamp(&assignment["unlock_at"]),
            lock_at: timestamp(&assignment["lock_at"]),
            points_possible: assignment["points_possible"].as_f64(),
            allowed_attempts: assignment["allowed_attempts"].as_i64(),
            muted: assignment["muted"].as_bool(),
            course_id: None,
        })
    }
}

/// Flat record of a classic quiz.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct QuizRecord {
    pub id: u64,
    pub title: Option<String>,
    pub published: Option<bool>,
    pub unlock_at: Option<DateTime<Utc>>,
    pub due_at: Option<DateTime<Utc>>,
    pub lock_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<u64>,
}

impl QuizRecord {
    pub fn from_json(quiz: &Value) -> Option<QuizRecord> {
        Some(QuizRecord {
            id: quiz["id"].as_u64()?,
            title: text(&quiz["title"]),
            published: quiz["published"].as_bool(),
            unlock_at: timestamp(&quiz["unlock_at"]),
            due_at: timestamp(&quiz["due_at"]),
            lock_at: timestamp(&quiz["lock_at"]),
            course_id: None,
        })
    }
}

impl_course_scoped!(AssignmentRecord, QuizRecord);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::to_row;
    use serde_json::json;

    #[test]
    fn test_assignment_mapping_drops_unlisted_fields() {
        let assignment = json!({
            "id": 9001,
            "name": "Homework 1",
            "description": "<p>long html</p>",
            "due_at": "2024-02-01T04:59:59Z",
            "unlock_at": null,
            "lock_at": null,
            "points_possible": 100.0,
            "allowed_attempts": -1,
            "muted": false,
            "secure_params": "abc"
        });
        let record = AssignmentRecord::from_json(&assignment).unwrap();
        assert_eq!(record.allowed_attempts, Some(-1));
        assert_eq!(record.points_possible, Some(100.0));

        let row = to_row(&record);
        assert!(!row.contains_key("description"));
        assert!(!row.contains_key("secure_params"));
        assert_eq!(row["unlock_at"], Value::Null);
        assert_eq!(row.len(), 8);
    }

    #[test]
    fn test_quiz_mapping() {
        let quiz = json!({
            "id": 55,
            "title": "Quiz 1",
            "published": true,
            "due_at": "2024-03-01T12:00:00Z"
        });
        let record = QuizRecord::from_json(&quiz).unwrap();
        assert_eq!(record.title.as_deref(), Some("Quiz 1"));
        assert_eq!(record.published, Some(true));
        assert_eq!(record.unlock_at, None);
        assert!(record.due_at.is_some());
    }
}
