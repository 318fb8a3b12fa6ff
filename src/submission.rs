// Import necessary crates and modules
use crate::record::{impl_course_scoped, text, timestamp};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Flat record of a student's submission to an assignment, with its grading metadata.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SubmissionRecord {
    pub id: u64,                              // Submission's unique identifier
    pub assignment_id: Option<u64>,           // Assignment's unique identifier
    pub user_id: Option<u64>,                 // Submitting student
    pub grade: Option<String>,                // Grade as displayed (letter, points, "complete")
    pub submitted_at: Option<DateTime<Utc>>,  // Submission timestamp, optional
    pub graded_at: Option<DateTime<Utc>>,     // Grading timestamp, optional
    pub grader_id: Option<i64>,               // Negative for automatic graders
    pub score: Option<f64>,                   // Graded score, optional
    pub excused: Option<bool>,
    pub late_policy_status: Option<String>,
    pub points_deducted: Option<f64>,
    pub late: Option<bool>,
    pub missing: Option<bool>,
    pub entered_grade: Option<String>,
    pub entered_score: Option<f64>,
    pub course_id: Option<u64>,
}

impl SubmissionRecord {
    /// Converts a JSON submission object into a `SubmissionRecord`.
    pub fn from_json(submission: &Value) -> Option<SubmissionRecord> {
        Some(SubmissionRecord {
            id: submission["id"].as_u64()?,
            assignment_id: submission["assignment_id"].as_u64(),
            user_id: submission["user_id"].as_u64(),
            grade: text(&submission["grade"]),
            submitted_at: timestamp(&submission["submitted_at"]),
            graded_at: timestamp(&submission["graded_at"]),
            grader_id: submission["grader_id"].as_i64(),
            score: submission["score"].as_f64(),
            excused: submission["excused"].as_bool(),
            late_policy_status: text(&submission["late_policy_status"]),
            points_deducted: submission["points_deducted"].as_f64(),
            late: submission["late"].as_bool(),
            missing: submission["missing"].as_bool(),
            entered_grade: text(&submission["entered_grade"]),
            entered_score: submission["entered_score"].as_f64(),
            course_id: submission["course_id"].as_u64(),
        })
    }
}

impl_course_scoped!(SubmissionRecord);
