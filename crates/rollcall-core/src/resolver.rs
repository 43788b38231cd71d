//! Session resolution — matching an instant against course schedules.
//!
//! Two modes: [`active_session`] answers "which session owns this instant in
//! this room", honoring the registration window around the official times;
//! [`upcoming_sessions`] answers "which entries start a lead time from now",
//! which drives the seeding scheduler.

use crate::policy::RegistrationPolicy;
use crate::types::Course;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// A resolved, currently-active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    pub course_id: String,
    pub date: NaiveDate,
    /// Canonical start time of the owning schedule entry. Lateness is
    /// computed against this, not against the window open.
    pub starts_at: NaiveTime,
}

/// A session about to start, from lookahead mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingSession {
    pub course_id: String,
    pub date: NaiveDate,
    pub starts_at: NaiveTime,
}

/// Resolve the session that owns `now` in `room`, if any.
///
/// An entry's registration window is
/// `[start - window_open, end - window_close]`, inclusive at both ends.
/// The first matching entry in iteration order wins; overlapping entries in
/// the same room and window are unvalidated input. Malformed entries never
/// match.
pub fn active_session(
    now: NaiveDateTime,
    room: &str,
    courses: &[Course],
    policy: &RegistrationPolicy,
) -> Option<ActiveSession> {
    let today = now.weekday();
    for course in courses {
        for entry in &course.schedule {
            let Some((day, start, end)) = entry.parsed() else {
                tracing::debug!(
                    course = %course.id,
                    day = %entry.day,
                    start = %entry.start,
                    "skipping malformed schedule entry"
                );
                continue;
            };
            if entry.room != room || day != today {
                continue;
            }
            let opens = now.date().and_time(start) - Duration::minutes(policy.window_open_mins);
            let closes = now.date().and_time(end) - Duration::minutes(policy.window_close_mins);
            if opens <= now && now <= closes {
                return Some(ActiveSession {
                    course_id: course.id.clone(),
                    date: now.date(),
                    starts_at: start,
                });
            }
        }
    }
    None
}

/// Lookahead mode: entries in `room` whose start lies
/// `seed_lead ± seed_tolerance` ahead of `now`, inclusive.
pub fn upcoming_sessions(
    now: NaiveDateTime,
    room: &str,
    courses: &[Course],
    policy: &RegistrationPolicy,
) -> Vec<UpcomingSession> {
    let lo = (policy.seed_lead_mins - policy.seed_tolerance_mins) * 60;
    let hi = (policy.seed_lead_mins + policy.seed_tolerance_mins) * 60;
    let today = now.weekday();
    let mut sessions = Vec::new();
    for course in courses {
        for entry in &course.schedule {
            let Some((day, start, _)) = entry.parsed() else {
                continue;
            };
            if entry.room != room || day != today {
                continue;
            }
            let until_start = (now.date().and_time(start) - now).num_seconds();
            if (lo..=hi).contains(&until_start) {
                sessions.push(UpcomingSession {
                    course_id: course.id.clone(),
                    date: now.date(),
                    starts_at: start,
                });
            }
        }
    }
    sessions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScheduleEntry;

    fn course(id: &str, entries: &[(&str, &str, &str, &str)]) -> Course {
        Course {
            id: id.into(),
            name: id.into(),
            students: vec![],
            schedule: entries
                .iter()
                .map(|(day, start, end, room)| ScheduleEntry {
                    day: (*day).into(),
                    start: (*start).into(),
                    end: (*end).into(),
                    room: (*room).into(),
                })
                .collect(),
        }
    }

    fn monday(h: u32, m: u32, s: u32) -> NaiveDateTime {
        // 2026-08-03 is a Monday.
        NaiveDate::from_ymd_opt(2026, 8, 3)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn policy() -> RegistrationPolicy {
        RegistrationPolicy::default()
    }

    #[test]
    fn test_active_inside_window() {
        let courses = [course("C1", &[("Monday", "09:00", "10:00", "R1")])];
        let session = active_session(monday(9, 10, 0), "R1", &courses, &policy()).unwrap();
        assert_eq!(session.course_id, "C1");
        assert_eq!(session.starts_at, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(session.date, NaiveDate::from_ymd_opt(2026, 8, 3).unwrap());
    }

    #[test]
    fn test_window_open_bound_inclusive() {
        let courses = [course("C1", &[("Monday", "09:00", "10:00", "R1")])];
        // Opens at start - 5min = 08:55:00 exactly.
        assert!(active_session(monday(8, 55, 0), "R1", &courses, &policy()).is_some());
        assert!(active_session(monday(8, 54, 59), "R1", &courses, &policy()).is_none());
    }

    #[test]
    fn test_window_close_bound_inclusive() {
        let courses = [course("C1", &[("Monday", "09:00", "10:00", "R1")])];
        // Closes at end - 15min = 09:45:00 exactly.
        assert!(active_session(monday(9, 45, 0), "R1", &courses, &policy()).is_some());
        assert!(active_session(monday(9, 45, 1), "R1", &courses, &policy()).is_none());
    }

    #[test]
    fn test_canonical_start_not_window_open() {
        let courses = [course("C1", &[("Monday", "09:00", "10:00", "R1")])];
        let session = active_session(monday(8, 56, 0), "R1", &courses, &policy()).unwrap();
        assert_eq!(session.starts_at, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    }

    #[test]
    fn test_room_and_day_filter() {
        let courses = [course(
            "C1",
            &[
                ("Tuesday", "09:00", "10:00", "R1"),
                ("Monday", "09:00", "10:00", "R2"),
            ],
        )];
        assert!(active_session(monday(9, 10, 0), "R1", &courses, &policy()).is_none());
        assert!(active_session(monday(9, 10, 0), "R2", &courses, &policy()).is_some());
    }

    #[test]
    fn test_spanish_day_matches() {
        let courses = [course("C1", &[("Lunes", "09:00", "10:00", "R1")])];
        assert!(active_session(monday(9, 10, 0), "R1", &courses, &policy()).is_some());
    }

    #[test]
    fn test_malformed_entry_skipped_not_fatal() {
        let courses = [course(
            "C1",
            &[
                ("Monday", "nine", "10:00", "R1"),
                ("Monday", "09:00", "10:00", "R1"),
            ],
        )];
        // The malformed first entry is skipped; the valid one still resolves.
        assert!(active_session(monday(9, 10, 0), "R1", &courses, &policy()).is_some());
    }

    #[test]
    fn test_first_match_wins_across_courses() {
        let courses = [
            course("C1", &[("Monday", "09:00", "10:00", "R1")]),
            course("C2", &[("Monday", "09:00", "10:00", "R1")]),
        ];
        let session = active_session(monday(9, 10, 0), "R1", &courses, &policy()).unwrap();
        assert_eq!(session.course_id, "C1");
    }

    #[test]
    fn test_upcoming_band_inclusive() {
        let courses = [course("C1", &[("Monday", "09:00", "10:00", "R1")])];
        // Lead 5min, tolerance 1min: start must be 4..=6 minutes ahead.
        assert_eq!(upcoming_sessions(monday(8, 54, 0), "R1", &courses, &policy()).len(), 1);
        assert_eq!(upcoming_sessions(monday(8, 55, 0), "R1", &courses, &policy()).len(), 1);
        assert_eq!(upcoming_sessions(monday(8, 56, 0), "R1", &courses, &policy()).len(), 1);
        assert!(upcoming_sessions(monday(8, 53, 59), "R1", &courses, &policy()).is_empty());
        assert!(upcoming_sessions(monday(8, 56, 1), "R1", &courses, &policy()).is_empty());
    }

    #[test]
    fn test_upcoming_filters_room() {
        let courses = [
            course("C1", &[("Monday", "09:00", "10:00", "R1")]),
            course("C2", &[("Monday", "09:00", "10:00", "R2")]),
        ];
        let upcoming = upcoming_sessions(monday(8, 55, 0), "R1", &courses, &policy());
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].course_id, "C1");
    }

    #[test]
    fn test_upcoming_ignores_already_started() {
        let courses = [course("C1", &[("Monday", "09:00", "10:00", "R1")])];
        assert!(upcoming_sessions(monday(9, 0, 0), "R1", &courses, &policy()).is_empty());
    }
}
