//! The recognition path — one inbound frame observation at a time.
//!
//! Applies the acceptance threshold, drives the debounce state machine, and
//! on confirmation resolves the active session and records presence. The
//! debouncer mutex is held only for the in-memory transition; store reads
//! and writes happen outside it, so concurrent frame handlers never queue
//! behind I/O.

use crate::catalog::CourseCatalog;
use crate::directory::PersonDirectory;
use crate::recorder::{AttendanceRecorder, RecordOutcome};
use crate::room::RoomConfig;
use chrono::NaiveDateTime;
use rollcall_core::{
    resolver, DebounceOutcome, FaceMatch, RecognitionDebouncer, RegistrationPolicy,
};
use rollcall_store::{DocumentStore, StoreError};
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Retryable: the debounce state was reopened, a later frame drives the
    /// retry.
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("recognition state lock poisoned")]
    StatePoisoned,
}

/// What one frame observation amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObserveOutcome {
    /// No identity, or the confidence missed the accept boundary.
    Rejected,
    /// Recognition cannot be attached to a session without a configured
    /// room.
    NoRoomConfigured,
    /// Accepted hit, dwell floor not yet met.
    Dwelling { identity: String },
    /// Already confirmed today; nothing to do.
    AlreadyConfirmed { identity: String },
    /// Confirmed, but no student in the directory carries this name.
    UnknownIdentity { identity: String },
    /// Confirmed and identified, but no session owns this instant:
    /// recognized but not recorded.
    NoActiveSession { student_id: String },
    Recorded {
        student_id: String,
        course_id: String,
        late: bool,
    },
    /// The ledger already held a Present record for today.
    AlreadyRecorded {
        student_id: String,
        course_id: String,
    },
}

pub struct RecognitionPipeline<S> {
    debouncer: Mutex<RecognitionDebouncer>,
    rooms: Arc<RoomConfig<S>>,
    catalog: CourseCatalog<S>,
    directory: PersonDirectory<S>,
    recorder: Arc<AttendanceRecorder<S>>,
    policy: RegistrationPolicy,
}

impl<S: DocumentStore> RecognitionPipeline<S> {
    pub fn new(
        store: Arc<S>,
        rooms: Arc<RoomConfig<S>>,
        recorder: Arc<AttendanceRecorder<S>>,
        policy: RegistrationPolicy,
    ) -> Self {
        Self {
            debouncer: Mutex::new(RecognitionDebouncer::new(policy.confirm_dwell_secs)),
            catalog: CourseCatalog::new(store.clone()),
            directory: PersonDirectory::new(store),
            rooms,
            recorder,
            policy,
        }
    }

    /// Feed one face-match observation taken at `at`.
    pub fn observe(
        &self,
        hit: &FaceMatch,
        at: NaiveDateTime,
    ) -> Result<ObserveOutcome, PipelineError> {
        let Some(identity) = hit.identity.as_deref() else {
            return Ok(ObserveOutcome::Rejected);
        };
        if hit.confidence >= self.policy.accept_threshold {
            tracing::trace!(
                identity,
                confidence = hit.confidence,
                "hit rejected by confidence boundary"
            );
            return Ok(ObserveOutcome::Rejected);
        }
        let Some(room) = self.rooms.current() else {
            return Ok(ObserveOutcome::NoRoomConfigured);
        };

        let outcome = self
            .debouncer
            .lock()
            .map_err(|_| PipelineError::StatePoisoned)?
            .observe(&room, identity, at);
        match outcome {
            DebounceOutcome::Pending => {
                return Ok(ObserveOutcome::Dwelling {
                    identity: identity.to_string(),
                })
            }
            DebounceOutcome::AlreadyConfirmed => {
                return Ok(ObserveOutcome::AlreadyConfirmed {
                    identity: identity.to_string(),
                })
            }
            DebounceOutcome::Confirmed => {}
        }
        tracing::info!(identity, room = %room, "presence confirmed; recording");

        match self.record_confirmed(identity, &room, at) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                // Reopen so a later frame drives the retry; the ledger write
                // is idempotent.
                if let Ok(mut debouncer) = self.debouncer.lock() {
                    debouncer.reopen(identity);
                }
                Err(err)
            }
        }
    }

    fn record_confirmed(
        &self,
        identity: &str,
        room: &str,
        at: NaiveDateTime,
    ) -> Result<ObserveOutcome, PipelineError> {
        let Some(student) = self.directory.find_student(identity)? else {
            tracing::warn!(identity, "confirmed identity not found in person directory");
            return Ok(ObserveOutcome::UnknownIdentity {
                identity: identity.to_string(),
            });
        };

        let courses = self.catalog.all()?;
        let Some(session) = resolver::active_session(at, room, &courses, &self.policy) else {
            tracing::info!(
                student = %student.id,
                room,
                "recognized but no active session; not recorded"
            );
            return Ok(ObserveOutcome::NoActiveSession {
                student_id: student.id,
            });
        };

        let outcome = self.recorder.record_presence(
            &student.id,
            &session.course_id,
            session.date,
            session.starts_at,
            at,
        )?;
        Ok(match outcome {
            RecordOutcome::Recorded { late } => ObserveOutcome::Recorded {
                student_id: student.id,
                course_id: session.course_id,
                late,
            },
            RecordOutcome::AlreadyRecorded => ObserveOutcome::AlreadyRecorded {
                student_id: student.id,
                course_id: session.course_id,
            },
        })
    }
}
