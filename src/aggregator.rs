//! Course-by-course collection of Canvas data into per-category tables.
//!
//! The aggregator walks the course list of a `CourseSource` in listing order, keeps the
//! courses selected by a `CollectRequest`, and fetches the requested categories for each
//! of them, one course and one category at a time.
//!
//! A category that Canvas reports as not found or forbidden for a course is logged and
//! contributes nothing for that course; any other failure ends the run.

use crate::canvas::{CanvasSession, CourseSource};
use crate::error::CanvasResult;
use crate::record::{CourseScoped, Table};
use crate::{
    AssignmentRecord, Course, CourseRecord, ModuleItemRecord, ModuleRecord, QuizRecord,
    StudentRecord, StudentSummaryRecord, SubmissionRecord,
};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Optional data category fetched per course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Quizzes,
    /// Modules and the items inside them.
    Modules,
    Students,
    Assignments,
    Summaries,
    Submissions,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Quizzes,
        Category::Modules,
        Category::Students,
        Category::Assignments,
        Category::Summaries,
        Category::Submissions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Quizzes => "quizzes",
            Category::Modules => "modules",
            Category::Students => "students",
            Category::Assignments => "assignments",
            Category::Summaries => "summaries",
            Category::Submissions => "submissions",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

/// Selection of what one `collect` run fetches.
///
/// - `course_ids`: allow-list of course ids; empty means every course.
/// - `categories`: data categories to fetch for each selected course.
/// - `active_only`: only process courses whose `[start_at, end_at]` window contains now.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectRequest {
    pub course_ids: Vec<u64>,
    pub categories: BTreeSet<Category>,
    pub active_only: bool,
}

impl CollectRequest {
    pub fn new(
        course_ids: impl IntoIterator<Item = u64>,
        categories: impl IntoIterator<Item = Category>,
        active_only: bool,
    ) -> Self {
        CollectRequest {
            course_ids: course_ids.into_iter().collect(),
            categories: categories.into_iter().collect(),
            active_only,
        }
    }

    /// Whether the allow-list admits `course_id`.
    pub fn allows(&self, course_id: u64) -> bool {
        self.course_ids.is_empty() || self.course_ids.contains(&course_id)
    }

    pub fn wants(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }
}

/// Result of one `collect` run.
///
/// `courses` is the complete course list, unaffected by the allow-list. Every other field
/// holds one non-empty table per processed course, in course listing order; concatenating
/// them (see `Table::concat`) is up to the caller.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CourseBundle {
    pub courses: Table<CourseRecord>,
    pub students: Vec<Table<StudentRecord>>,
    pub assignments: Vec<Table<AssignmentRecord>>,
    pub submissions: Vec<Table<SubmissionRecord>>,
    pub summaries: Vec<Table<StudentSummaryRecord>>,
    pub quizzes: Vec<Table<QuizRecord>>,
    pub modules: Vec<Table<ModuleRecord>>,
    pub module_items: Vec<Table<ModuleItemRecord>>,
    /// When the course list behind this bundle was fetched.
    pub as_of: Option<DateTime<Utc>>,
}

pub struct CourseDataAggregator<S: CourseSource = CanvasSession> {
    source: S,
}

impl CourseDataAggregator<CanvasSession> {
    /// Connects to Canvas and fetches the course list.
    pub fn connect(url: &str, key: &str) -> CanvasResult<Self> {
        Ok(CourseDataAggregator::new(CanvasSession::connect(url, key)?))
    }
}

impl<S: CourseSource> CourseDataAggregator<S> {
    pub fn new(source: S) -> Self {
        CourseDataAggregator { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Collects the requested data, judging course activity against the current time.
    pub fn collect(&mut self, request: &CollectRequest) -> CanvasResult<CourseBundle> {
        self.collect_at(request, Utc::now())
    }

    /// Collects the requested data, judging course activity against `now`.
    pub fn collect_at(
        &mut self,
        request: &CollectRequest,
        now: DateTime<Utc>,
    ) -> CanvasResult<CourseBundle> {
        let snapshot = self.source.snapshot()?.clone();
        let mut bundle = CourseBundle {
            courses: snapshot.records.into(),
            as_of: Some(snapshot.as_of),
            ..CourseBundle::default()
        };

        debug!(
            "Getting course info from Canvas for {:?}",
            request.course_ids
        );

        for course in &snapshot.handles {
            if !request.allows(course.id()) {
                continue;
            }
            info!("{}", course);

            if request.active_only && !course.is_active_at(now) {
                debug!(
                    "Skipping inactive course {} ({:?} through {:?})",
                    course, course.info.start_at, course.info.end_at
                );
                continue;
            }

            for category in request.categories.iter().copied() {
                self.collect_category(category, course, &mut bundle)?;
            }
        }

        Ok(bundle)
    }

    fn collect_category(
        &self,
        category: Category,
        course: &Course,
        bundle: &mut CourseBundle,
    ) -> CanvasResult<()> {
        let source = &self.source;
        match category {
            Category::Quizzes => append(
                &mut bundle.quizzes,
                degrade_absent(category, course, source.get_quizzes(course))?,
            ),
            Category::Modules => {
                append(
                    &mut bundle.modules,
                    degrade_absent(category, course, source.get_modules(course))?,
                );
                append(
                    &mut bundle.module_items,
                    degrade_absent(category, course, source.get_module_items(course))?,
                );
            }
            Category::Students => append(
                &mut bundle.students,
                degrade_absent(category, course, source.get_students(course))?,
            ),
            Category::Assignments => append(
                &mut bundle.assignments,
                degrade_absent(category, course, source.get_assignments(course))?,
            ),
            Category::Summaries => append(
                &mut bundle.summaries,
                degrade_absent(category, course, source.get_student_summaries(course))?,
            ),
            Category::Submissions => append(
                &mut bundle.submissions,
                degrade_absent(category, course, source.get_assignment_submissions(course))?,
            ),
        }
        Ok(())
    }
}

/// Category-level fallback: not-found and forbidden become an empty table for this course.
/// Records of a successful listing are tagged with the course id.
fn degrade_absent<R: CourseScoped>(
    category: Category,
    course: &Course,
    result: CanvasResult<Table<R>>,
) -> CanvasResult<Table<R>> {
    match result {
        Ok(table) => Ok(table.tagged(course.id())),
        Err(err) if err.is_absent_resource() => {
            warn!("No {} available for course {}: {}", category, course, err);
            Ok(Table::new())
        }
        Err(err) => Err(err),
    }
}

fn append<R>(accumulator: &mut Vec<Table<R>>, table: Table<R>) {
    if !table.is_empty() {
        debug!("{} records", table.len());
        accumulator.push(table);
    }
}
