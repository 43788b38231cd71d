//! Session initialization — the background seeding sweep.
//!
//! Wakes every sweep interval, asks the resolver (lookahead mode) for
//! sessions about to start in the configured room, and seeds each ledger
//! with every enrolled student absent. An in-memory (course, date) memo
//! keeps one process from re-seeding inside a lead window; the recorder's
//! own idempotence is the second net. The memo is pruned when the calendar
//! date advances.

use crate::catalog::CourseCatalog;
use crate::recorder::{AttendanceRecorder, SeedOutcome};
use crate::room::RoomConfig;
use chrono::{Local, NaiveDate, NaiveDateTime};
use rollcall_core::{resolver, RegistrationPolicy};
use rollcall_store::DocumentStore;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

pub struct SessionInitializer<S> {
    catalog: CourseCatalog<S>,
    recorder: Arc<AttendanceRecorder<S>>,
    rooms: Arc<RoomConfig<S>>,
    policy: RegistrationPolicy,
    seeded: HashSet<(String, NaiveDate)>,
    last_sweep: Option<NaiveDate>,
}

impl<S: DocumentStore + 'static> SessionInitializer<S> {
    pub fn new(
        store: Arc<S>,
        recorder: Arc<AttendanceRecorder<S>>,
        rooms: Arc<RoomConfig<S>>,
        policy: RegistrationPolicy,
    ) -> Self {
        Self {
            catalog: CourseCatalog::new(store),
            recorder,
            rooms,
            policy,
            seeded: HashSet::new(),
            last_sweep: None,
        }
    }

    /// One pass: prune the memo on a date change, then seed every session
    /// starting a lead time from `now` in the configured room. Per-session
    /// failures are logged and never abort the sweep.
    pub fn sweep(&mut self, now: NaiveDateTime) {
        let today = now.date();
        if self.last_sweep.is_some_and(|date| date != today) {
            self.seeded.retain(|(_, date)| *date == today);
        }
        self.last_sweep = Some(today);

        let Some(room) = self.rooms.current() else {
            tracing::debug!("no room configured; skipping seeding sweep");
            return;
        };

        let courses = match self.catalog.all() {
            Ok(courses) => courses,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load courses; skipping sweep");
                return;
            }
        };

        for session in resolver::upcoming_sessions(now, &room, &courses, &self.policy) {
            let key = (session.course_id.clone(), session.date);
            if self.seeded.contains(&key) {
                continue;
            }
            match self.recorder.seed_absentees(&session.course_id, session.date) {
                Ok(SeedOutcome::Created { students }) => {
                    tracing::info!(
                        course = %session.course_id,
                        date = %session.date,
                        starts_at = %session.starts_at,
                        students,
                        "seeded upcoming session"
                    );
                    self.seeded.insert(key);
                }
                Ok(SeedOutcome::AlreadyExists) => {
                    self.seeded.insert(key);
                }
                Err(err) => {
                    tracing::warn!(
                        course = %session.course_id,
                        error = %err,
                        "seeding failed; will retry next sweep"
                    );
                }
            }
        }
    }

    /// Run the periodic sweep until the stop channel fires.
    pub async fn run(mut self, mut stop: watch::Receiver<bool>) {
        let period = Duration::from_secs(self.policy.sweep_interval_secs.max(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tracing::info!(period_secs = period.as_secs(), "session initializer started");
        loop {
            tokio::select! {
                _ = ticker.tick() => self.sweep(Local::now().naive_local()),
                _ = stop.changed() => {
                    tracing::info!("session initializer stopping");
                    return;
                }
            }
        }
    }
}
