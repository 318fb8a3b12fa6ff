// Import necessary crates and modules
use crate::record::{impl_course_scoped, text, timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Flat record of a student enrolled in a course.
///
/// Fields mirror the Canvas user object returned by the course users listing. `course_id`
/// is not part of the Canvas object; it is set when the record is collected for a course.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct StudentRecord {
    pub id: u64,
    pub name: Option<String>,
    pub sortable_name: Option<String>,
    pub login_id: Option<String>,
    pub email: Option<String>,
    pub sis_user_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<u64>,
}

impl StudentRecord {
    /// Converts a JSON object to a `StudentRecord`.
    pub fn from_json(student: &Value) -> Option<StudentRecord> {
        Some(StudentRecord {
            id: student["id"].as_u64()?,
            name: text(&student["name"]),
            sortable_name: text(&student["sortable_name"]),
            login_id: text(&student["login_id"]),
            email: text(&student["email"]),
            sis_user_id: text(&student["sis_user_id"]),
            created_at: timestamp(&student["created_at"]),
            course_id: None,
        })
    }
}

/// Student summary in its typed form, as deserialized from the course analytics endpoint.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct StudentSummary {
    pub id: u64,
    pub page_views: Option<u64>,
    pub max_page_views: Option<u64>,
    pub participations: Option<u64>,
    pub max_participations: Option<u64>,
    #[serde(default)]
    pub course_id: Option<u64>,
}

/// Aggregate engagement statistics of one student in one course.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StudentSummaryRecord {
    pub id: u64,
    pub page_views: Option<u64>,
    pub max_page_views: Option<u64>,
    pub participations: Option<u64>,
    pub max_participations: Option<u64>,
    pub course_id: Option<u64>,
}

impl StudentSummaryRecord {
    /// Maps the mapping form of a summary, reading each field by name.
    pub fn from_json(summary: &Value) -> Option<StudentSummaryRecord> {
        Some(StudentSummaryRecord {
            id: summary["id"].as_u64()?,
            page_views: summary["page_views"].as_u64(),
            max_page_views: summary["max_page_views"].as_u64(),
            participations: summary["participations"].as_u64(),
            max_participations: summary["max_participations"].as_u64(),
            course_id: summary["course_id"].as_u64(),
        })
    }

    /// Maps one item of the summaries listing.
    ///
    /// The typed form is tried first; an item it rejects (an unexpected type in some
    /// field) is read through the mapping form instead.
    pub fn from_item(item: &Value) -> Option<StudentSummaryRecord> {
        match StudentSummary::deserialize(item) {
            Ok(summary) => Some(StudentSummaryRecord::from(&summary)),
            Err(_) => StudentSummaryRecord::from_json(item),
        }
    }
}

impl From<&StudentSummary> for StudentSummaryRecord {
    fn from(summary: &StudentSummary) -> Self {
        StudentSummaryRecord {
            id: summary.id,
            page_views: summary.page_views,
            max_page_views: summary.max_page_views,
            participations: summary.participations,
            max_participations: summary.max_participations,
            course_id: summary.course_id,
        }
    }
}

impl_course_scoped!(StudentRecord, StudentSummaryRecord);
