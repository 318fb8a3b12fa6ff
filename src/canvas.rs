use crate::connection::{fetch_all_pages, fetch_json};
use crate::error::{CanvasError, CanvasResult};
use crate::record::Table;
use crate::{
    AssignmentRecord, CanvasCredentials, Course, CourseRecord, ModuleItemRecord, ModuleRecord,
    QuizRecord, StudentRecord, StudentSummaryRecord, SubmissionRecord,
};
use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use serde_json::Value;

/// Course list captured by one full listing.
///
/// `records` and `handles` are parallel: `records[i]` is the flat record of `handles[i]`.
/// The handles are kept because the record mapping is lossy and every per-course listing
/// starts from the handle.
#[derive(Debug, Clone)]
pub struct CourseSnapshot {
    pub records: Vec<CourseRecord>,
    pub handles: Vec<Course>,
    pub as_of: DateTime<Utc>,
}

/// Source of course data for the aggregator.
///
/// `CanvasSession` is the implementation backed by the Canvas API; any other source
/// (a recorded dataset, another LMS) can drive the aggregator through this trait.
/// Listing methods report not-found and forbidden as errors; deciding to degrade them is
/// left to the caller.
pub trait CourseSource {
    /// Returns the cached course snapshot, loading it on first use.
    fn snapshot(&mut self) -> CanvasResult<&CourseSnapshot>;

    fn get_quizzes(&self, course: &Course) -> CanvasResult<Table<QuizRecord>>;

    fn get_modules(&self, course: &Course) -> CanvasResult<Table<ModuleRecord>>;

    fn get_module_items(&self, course: &Course) -> CanvasResult<Table<ModuleItemRecord>>;

    fn get_students(&self, course: &Course) -> CanvasResult<Table<StudentRecord>>;

    fn get_assignments(&self, course: &Course) -> CanvasResult<Table<AssignmentRecord>>;

    fn get_assignment_submissions(&self, course: &Course)
        -> CanvasResult<Table<SubmissionRecord>>;

    fn get_student_summaries(&self, course: &Course) -> CanvasResult<Table<StudentSummaryRecord>>;
}

/// One authenticated session against a Canvas instance.
///
/// The session owns the HTTP client and the credentials, and caches the course list in a
/// `CourseSnapshot`. The snapshot is only replaced by an explicit `refresh`.
///
/// Example:
/// ```ignore
/// let mut session = CanvasSession::connect("https://canvas.example.edu", "token")?;
/// for course in session.list_course_handles()? {
///     let students = session.get_students(course)?;
///     println!("{}: {} students", course, students.len());
/// }
/// ```
pub struct CanvasSession {
    credentials: CanvasCredentials,
    client: Client,
    snapshot: Option<CourseSnapshot>,
}

impl CanvasSession {
    /// Creates a session without contacting the server; the course list is fetched on
    /// first use.
    pub fn new(credentials: CanvasCredentials) -> CanvasSession {
        CanvasSession {
            credentials,
            client: Client::new(),
            snapshot: None,
        }
    }

    /// Creates a session and immediately fetches the full course list.
    ///
    /// Arguments:
    /// - `url`: Canvas instance URL (with or without the `/api/v1` suffix).
    /// - `key`: API access token.
    pub fn connect(url: &str, key: &str) -> CanvasResult<CanvasSession> {
        let mut session = CanvasSession::new(CanvasCredentials::new(url, key));
        session.refresh()?;
        Ok(session)
    }

    pub fn credentials(&self) -> &CanvasCredentials {
        &self.credentials
    }

    /// Re-fetches the full course list and replaces the cached snapshot.
    pub fn refresh(&mut self) -> CanvasResult<&CourseSnapshot> {
        let snapshot = self.fetch_snapshot()?;
        Ok(self.snapshot.insert(snapshot))
    }

    fn fetch_snapshot(&self) -> CanvasResult<CourseSnapshot> {
        let url = self.credentials.endpoint("/courses");
        let courses = fetch_all_pages(&self.client, &self.credentials, &url, Vec::new())?;

        let handles: Vec<Course> = courses.iter().filter_map(Course::from_json).collect();
        let records = handles.iter().map(Course::record).collect();
        log::info!("Fetched {} courses from {}", handles.len(), self.credentials.url_canvas);

        Ok(CourseSnapshot {
            records,
            handles,
            as_of: Utc::now(),
        })
    }

    /// Flat records of every course visible to the session.
    pub fn list_courses(&mut self) -> CanvasResult<&[CourseRecord]> {
        Ok(&self.snapshot()?.records)
    }

    /// Live handles of every course visible to the session.
    pub fn list_course_handles(&mut self) -> CanvasResult<&[Course]> {
        Ok(&self.snapshot()?.handles)
    }

    /// When the cached course list was fetched, if it has been.
    pub fn as_of(&self) -> Option<DateTime<Utc>> {
        self.snapshot.as_ref().map(|snapshot| snapshot.as_of)
    }

    /// Fetches a specific course by id, bypassing the cached list.
    pub fn get_course(&self, course_id: u64) -> CanvasResult<Course> {
        let url = self.credentials.endpoint(&format!("/courses/{}", course_id));
        let course = fetch_json(&self.client, &self.credentials, &url)?;
        Course::from_json(&course).ok_or_else(|| {
            CanvasError::Decode(serde::de::Error::custom(format!(
                "course {} has no numeric id",
                course_id
            )))
        })
    }

    fn list(&self, path: &str, params: Vec<(String, String)>) -> CanvasResult<Vec<Value>> {
        let url = self.credentials.endpoint(path);
        fetch_all_pages(&self.client, &self.credentials, &url, params)
    }

    fn list_modules(&self, course: &Course) -> CanvasResult<Vec<ModuleRecord>> {
        let modules = self.list(&format!("/courses/{}/modules", course.id()), Vec::new())?;
        Ok(modules.iter().filter_map(ModuleRecord::from_json).collect())
    }
}

impl CourseSource for CanvasSession {
    fn snapshot(&mut self) -> CanvasResult<&CourseSnapshot> {
        let snapshot = match self.snapshot.take() {
            Some(snapshot) => snapshot,
            None => self.fetch_snapshot()?,
        };
        Ok(self.snapshot.insert(snapshot))
    }

    fn get_quizzes(&self, course: &Course) -> CanvasResult<Table<QuizRecord>> {
        let quizzes = self.list(&format!("/courses/{}/quizzes", course.id()), Vec::new())?;
        Ok(quizzes.iter().filter_map(QuizRecord::from_json).collect())
    }

    fn get_modules(&self, course: &Course) -> CanvasResult<Table<ModuleRecord>> {
        Ok(self.list_modules(course)?.into())
    }

    /// Lists the modules of the course, then the items of each module.
    fn get_module_items(&self, course: &Course) -> CanvasResult<Table<ModuleItemRecord>> {
        let mut items = Vec::new();
        for module in self.list_modules(course)? {
            let path = format!("/courses/{}/modules/{}/items", course.id(), module.id);
            let module_items = self.list(&path, Vec::new())?;
            items.extend(
                module_items
                    .iter()
                    .filter_map(|item| ModuleItemRecord::from_json(&module, item)),
            );
        }
        Ok(items.into())
    }

    fn get_students(&self, course: &Course) -> CanvasResult<Table<StudentRecord>> {
        let params = vec![
            ("enrollment_type[]".to_string(), "student".to_string()),
            ("include[]".to_string(), "email".to_string()),
        ];
        let students = self.list(&format!("/courses/{}/users", course.id()), params)?;
        Ok(students.iter().filter_map(StudentRecord::from_json).collect())
    }

    fn get_assignments(&self, course: &Course) -> CanvasResult<Table<AssignmentRecord>> {
        let assignments =
            self.list(&format!("/courses/{}/assignments", course.id()), Vec::new())?;
        Ok(assignments
            .iter()
            .filter_map(AssignmentRecord::from_json)
            .collect())
    }

    /// Lists the assignments of the course, then the submissions of each assignment.
    fn get_assignment_submissions(
        &self,
        course: &Course,
    ) -> CanvasResult<Table<SubmissionRecord>> {
        let assignments =
            self.list(&format!("/courses/{}/assignments", course.id()), Vec::new())?;

        let mut submissions = Vec::new();
        for assignment_id in assignments.iter().filter_map(|a| a["id"].as_u64()) {
            let path = format!(
                "/courses/{}/assignments/{}/submissions",
                course.id(),
                assignment_id
            );
            let page = self.list(&path, Vec::new())?;
            submissions.extend(page.iter().filter_map(SubmissionRecord::from_json));
            log::debug!(
                "{} submissions after adding assignment {}",
                submissions.len(),
                assignment_id
            );
        }
        Ok(submissions.into())
    }

    fn get_student_summaries(&self, course: &Course) -> CanvasResult<Table<StudentSummaryRecord>> {
        let path = format!("/courses/{}/analytics/student_summaries", course.id());
        let summaries = self.list(&path, Vec::new())?;
        Ok(summaries
            .iter()
            .filter_map(StudentSummaryRecord::from_item)
            .collect())
    }
}
