//! rollcall-core — schedule-gated attendance logic.
//!
//! Pure domain logic for turning noisy face-recognition hits into attendance
//! decisions: resolving which class session owns a given instant in a given
//! room, and debouncing per-frame hits into a single confirmed presence per
//! student per session. No I/O and no clock reads: every operation takes
//! its instant as a parameter.

pub mod debounce;
pub mod policy;
pub mod resolver;
pub mod types;

pub use debounce::{DebounceOutcome, RecognitionDebouncer};
pub use policy::RegistrationPolicy;
pub use resolver::{ActiveSession, UpcomingSession};
pub use types::{
    AttendanceRecord, AttendanceStatus, Course, FaceMatch, FaceMatcher, Person, ScheduleEntry,
};
