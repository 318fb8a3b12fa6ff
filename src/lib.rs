//! # Canvas Course Status
//!
//! This library retrieves course, enrollment, assignment, quiz, module and submission data from
//! the Canvas Learning Management System (LMS) API and flattens it into tables for reporting.
//! Requests are blocking `reqwest` calls, issued strictly one after another.
//!
//! ## Core Features
//!
//! - **Session:** `CanvasSession` holds one authenticated connection and a cached course list
//!   (`CourseSnapshot`) that is refreshed explicitly.
//! - **Records:** every Canvas object is mapped to a flat record (`CourseRecord`,
//!   `StudentRecord`, `SubmissionRecord`, ...) that can be turned into a `Row`.
//! - **Aggregation:** `CourseDataAggregator` walks the courses, applies the course allow-list
//!   and the active-window filter, and collects the requested categories into a `CourseBundle`.
//! - **Credentials:** `CanvasCredentials` can be read from the environment or the system keyring.
//!
//! ## Usage
//!
//! ```ignore
//! use canvas_course_status::{Category, CollectRequest, CourseDataAggregator, Table};
//!
//! let mut aggregator = CourseDataAggregator::connect("https://canvas.example.edu", "token")?;
//! let request = CollectRequest::new([], [Category::Students, Category::Submissions], true);
//! let bundle = aggregator.collect(&request)?;
//!
//! let students = Table::concat(&bundle.students);
//! for row in students.rows() {
//!     println!("{:?}", row);
//! }
//! ```
//!
//! Listings that Canvas answers with 404 or 403 for one course degrade that category to an
//! empty result for the course (with a warning through the `log` facade); any other error,
//! such as an expired token, is returned to the caller.
pub mod aggregator; // Per-course collection of the selected categories.
mod assignment; // Assignment and quiz records.
pub mod canvas; // The Canvas session and the `CourseSource` seam.
mod connection; // Authenticated GET requests and pagination.
pub mod course; // Course handles and course records.
pub mod credentials; // Loading of Canvas API credentials.
pub mod error;
mod module; // Module and module item records.
pub mod record; // Tables and rows.
mod student; // Student and student summary records.
mod submission; // Submission records.

// Exports key structures for external use.
pub use aggregator::{Category, CollectRequest, CourseBundle, CourseDataAggregator};
pub use assignment::{AssignmentRecord, QuizRecord};
pub use canvas::{CanvasSession, CourseSnapshot, CourseSource};
pub use course::{Course, CourseInfo, CourseRecord, SisCourseId};
pub use credentials::CanvasCredentials;
pub use error::{CanvasError, CanvasResult};
pub use module::{matching_module_url, ModuleItemKind, ModuleItemRecord, ModuleRecord};
pub use record::{CourseScoped, Row, Table};
pub use student::{StudentRecord, StudentSummary, StudentSummaryRecord};
pub use submission::SubmissionRecord;
