//! Attendance recording — the idempotent ledger writes.
//!
//! Two operations: recording a confirmed presence (first Present write
//! wins) and seeding a session's ledger with every enrolled student absent.
//! Both are idempotent, so the scheduler and the recognition path can retry
//! after a store failure without double-writing.

use crate::catalog::CourseCatalog;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rollcall_core::{AttendanceRecord, AttendanceStatus, RegistrationPolicy};
use rollcall_store::{Document, DocumentStore, StoreError};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("course not found: {0}")]
    CourseNotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of a presence write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded { late: bool },
    /// The student already holds a Present record today; nothing written.
    AlreadyRecorded,
}

/// Result of a seeding attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created { students: usize },
    AlreadyExists,
}

pub struct AttendanceRecorder<S> {
    store: Arc<S>,
    catalog: CourseCatalog<S>,
    policy: RegistrationPolicy,
}

fn ledger_path(course_id: &str, date: NaiveDate) -> String {
    format!("courses/{course_id}/assistances/{}", date.format("%Y-%m-%d"))
}

fn encode_record(record: &AttendanceRecord) -> Result<Value, StoreError> {
    serde_json::to_value(record).map_err(|e| StoreError::Backend(e.to_string()))
}

impl<S: DocumentStore> AttendanceRecorder<S> {
    pub fn new(store: Arc<S>, policy: RegistrationPolicy) -> Self {
        Self {
            catalog: CourseCatalog::new(store.clone()),
            store,
            policy,
        }
    }

    /// Record a confirmed presence against the canonical start of an
    /// already-resolved session. First Present write wins: a second call for
    /// the same student and date changes nothing.
    pub fn record_presence(
        &self,
        student_id: &str,
        course_id: &str,
        date: NaiveDate,
        starts_at: NaiveTime,
        observed_at: NaiveDateTime,
    ) -> Result<RecordOutcome, StoreError> {
        let late =
            observed_at - date.and_time(starts_at) > Duration::minutes(self.policy.late_after_mins);

        // Enrollment is advisory: an unenrolled student still gets recorded,
        // the roster mismatch is only surfaced in the log.
        if let Some(course) = self.catalog.get(course_id)? {
            if !course.students.iter().any(|s| s == student_id) {
                tracing::warn!(
                    student = student_id,
                    course = course_id,
                    "student not on the course roster"
                );
            }
        }

        let path = ledger_path(course_id, date);
        let ledger = self.store.get(&path)?;

        let already_present = ledger
            .as_ref()
            .and_then(|doc| doc.get(student_id))
            .and_then(|slot| serde_json::from_value::<AttendanceRecord>(slot.clone()).ok())
            .is_some_and(|record| record.status == AttendanceStatus::Present);
        if already_present {
            tracing::debug!(
                student = student_id,
                course = course_id,
                "presence already recorded today"
            );
            return Ok(RecordOutcome::AlreadyRecorded);
        }

        let record = AttendanceRecord::present(observed_at.time(), late);
        let mut fields = Document::new();
        fields.insert(student_id.to_string(), encode_record(&record)?);

        match ledger {
            Some(_) => self.store.update(&path, fields)?,
            None => self.store.set(&path, fields)?,
        }

        tracing::info!(
            student = student_id,
            course = course_id,
            date = %date,
            late,
            "presence recorded"
        );
        Ok(RecordOutcome::Recorded { late })
    }

    /// Seed the (course, date) ledger with every enrolled student absent.
    ///
    /// Idempotent: an existing ledger, even an empty one, is left untouched.
    /// A course with no enrolled students still gets an empty ledger so
    /// "seeded, empty" and "never seeded" stay distinguishable downstream.
    pub fn seed_absentees(
        &self,
        course_id: &str,
        date: NaiveDate,
    ) -> Result<SeedOutcome, RecorderError> {
        let path = ledger_path(course_id, date);
        if self.store.get(&path)?.is_some() {
            return Ok(SeedOutcome::AlreadyExists);
        }

        let course = self
            .catalog
            .get(course_id)?
            .ok_or_else(|| RecorderError::CourseNotFound(course_id.to_string()))?;

        let mut ledger = Document::new();
        for student in &course.students {
            ledger.insert(student.clone(), encode_record(&AttendanceRecord::absent())?);
        }
        let students = ledger.len();
        self.store.set(&path, ledger)?;

        tracing::info!(course = course_id, date = %date, students, "ledger seeded");
        Ok(SeedOutcome::Created { students })
    }
}
