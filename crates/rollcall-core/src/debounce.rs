//! Recognition debouncing — noisy per-frame hits to one confirmed presence.
//!
//! Per-student state machine: Unseen → Pending (first hit, timestamp kept)
//! → Confirmed. Confirmation requires a minimum dwell between the first and
//! a later hit; the first-seen timestamp is never reset, so this is a dwell
//! floor, not a sliding window. All state is scoped to one room and one
//! calendar day: observing a different room, or a new day, clears
//! everything first; presence in one room is not evidence for another.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Streak {
    Pending { first_seen: NaiveDateTime },
    Confirmed { first_seen: NaiveDateTime },
}

/// Outcome of feeding one accepted hit to the debouncer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceOutcome {
    /// Hit observed, dwell floor not yet met. No event.
    Pending,
    /// Dwell floor met: exactly one confirmed-presence event.
    Confirmed,
    /// Already confirmed today in this room. No event.
    AlreadyConfirmed,
}

/// In-memory recognition state for the configured room.
///
/// Owns all the bookkeeping the recognition path shares. Callers guard it
/// with a single mutex and never hold that lock across store I/O; the
/// machine itself is pure and takes its instant as input.
#[derive(Debug)]
pub struct RecognitionDebouncer {
    dwell: Duration,
    room: Option<String>,
    day: Option<NaiveDate>,
    streaks: HashMap<String, Streak>,
}

impl RecognitionDebouncer {
    pub fn new(confirm_dwell_secs: i64) -> Self {
        Self {
            dwell: Duration::seconds(confirm_dwell_secs),
            room: None,
            day: None,
            streaks: HashMap::new(),
        }
    }

    /// Feed one accepted hit for `student`, observed in `room` at `at`.
    pub fn observe(&mut self, room: &str, student: &str, at: NaiveDateTime) -> DebounceOutcome {
        if self.room.as_deref() != Some(room) {
            if self.room.is_some() {
                tracing::info!(room, "room changed; clearing recognition state");
            }
            self.streaks.clear();
            self.room = Some(room.to_string());
        }
        if self.day != Some(at.date()) {
            self.streaks.clear();
            self.day = Some(at.date());
        }

        match self.streaks.get(student).copied() {
            None => {
                self.streaks
                    .insert(student.to_string(), Streak::Pending { first_seen: at });
                DebounceOutcome::Pending
            }
            Some(Streak::Pending { first_seen }) => {
                if at - first_seen >= self.dwell {
                    self.streaks
                        .insert(student.to_string(), Streak::Confirmed { first_seen });
                    DebounceOutcome::Confirmed
                } else {
                    DebounceOutcome::Pending
                }
            }
            Some(Streak::Confirmed { .. }) => DebounceOutcome::AlreadyConfirmed,
        }
    }

    /// Demote a confirmed student back to Pending with the dwell already
    /// served, so the next hit re-confirms immediately. Used when the
    /// downstream write failed and a later frame must drive the retry.
    pub fn reopen(&mut self, student: &str) {
        if let Some(streak) = self.streaks.get_mut(student) {
            if let Streak::Confirmed { first_seen } = *streak {
                *streak = Streak::Pending { first_seen };
            }
        }
    }
}
