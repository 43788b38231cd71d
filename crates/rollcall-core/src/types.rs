//! Domain types shared across the workspace.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One weekly meeting of a course.
///
/// Day and time fields are kept as the raw strings stored in the course
/// document and parsed at resolution time: a malformed entry is
/// non-matching, never fatal. Schedule documents are operator-edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub day: String,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub room: String,
}

impl ScheduleEntry {
    /// Parse this entry's day and times. `None` when any field is malformed.
    pub fn parsed(&self) -> Option<(Weekday, NaiveTime, NaiveTime)> {
        let day = parse_weekday(&self.day)?;
        let start = parse_time(&self.start)?;
        let end = parse_time(&self.end)?;
        Some((day, start, end))
    }
}

/// Accepts "HH:MM" and "HH:MM:SS".
fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

/// Parse a day name, case-insensitively, in English or Spanish.
/// Deployed schedule documents carry either.
pub fn parse_weekday(s: &str) -> Option<Weekday> {
    match s.trim().to_lowercase().as_str() {
        "monday" | "lunes" => Some(Weekday::Mon),
        "tuesday" | "martes" => Some(Weekday::Tue),
        "wednesday" | "miércoles" | "miercoles" => Some(Weekday::Wed),
        "thursday" | "jueves" => Some(Weekday::Thu),
        "friday" | "viernes" => Some(Weekday::Fri),
        "saturday" | "sábado" | "sabado" => Some(Weekday::Sat),
        "sunday" | "domingo" => Some(Weekday::Sun),
        _ => None,
    }
}

/// A course as stored at `courses/{id}`, with the document id attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    /// Enrolled student ids.
    #[serde(default)]
    pub students: Vec<String>,
    #[serde(default)]
    pub schedule: Vec<ScheduleEntry>,
}

impl Course {
    /// Build a course from its store document. `None` when the document
    /// does not have the course shape.
    pub fn from_document(id: &str, doc: Value) -> Option<Self> {
        let mut course: Course = serde_json::from_value(doc).ok()?;
        course.id = id.to_string();
        Some(course)
    }
}

/// A person as stored at `person/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    #[serde(skip)]
    pub id: String,
    /// Display name, the join key against recognition output.
    pub name: String,
    #[serde(default)]
    pub kind: String,
    /// Courses this person is enrolled in.
    #[serde(default)]
    pub courses: Vec<String>,
}

impl Person {
    pub fn from_document(id: &str, doc: Value) -> Option<Self> {
        let mut person: Person = serde_json::from_value(doc).ok()?;
        person.id = id.to_string();
        Some(person)
    }
}

/// Attendance state of one student for one session day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

/// One row of a per-course, per-date attendance ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub status: AttendanceStatus,
    #[serde(default)]
    pub registered_at: Option<NaiveTime>,
    /// Meaningful only when status is Present.
    #[serde(default)]
    pub late: bool,
}

impl AttendanceRecord {
    /// The seeded state: enrolled, not yet seen today.
    pub fn absent() -> Self {
        Self {
            status: AttendanceStatus::Absent,
            registered_at: None,
            late: false,
        }
    }

    pub fn present(at: NaiveTime, late: bool) -> Self {
        Self {
            status: AttendanceStatus::Present,
            registered_at: Some(at),
            late,
        }
    }
}

/// Output of the external face-matching capability for one frame.
///
/// Confidence is an LBPH-style distance; lower means a closer match. The
/// accept boundary lives in
/// [`RegistrationPolicy`](crate::policy::RegistrationPolicy), not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceMatch {
    /// Display name of the matched person, if any face matched at all.
    pub identity: Option<String>,
    pub confidence: f32,
}

/// The face-matching capability consumed by the recognition pipeline:
/// one image in, at most one identity out. Implementations live in the
/// capture layer outside this workspace; tests substitute fixed outputs.
pub trait FaceMatcher {
    type Error: std::error::Error;

    fn match_face(&self, image: &[u8]) -> Result<FaceMatch, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_weekday_english_and_spanish() {
        assert_eq!(parse_weekday("Monday"), Some(Weekday::Mon));
        assert_eq!(parse_weekday("Lunes"), Some(Weekday::Mon));
        assert_eq!(parse_weekday("miércoles"), Some(Weekday::Wed));
        assert_eq!(parse_weekday("MIERCOLES"), Some(Weekday::Wed));
        assert_eq!(parse_weekday(" sábado "), Some(Weekday::Sat));
        assert_eq!(parse_weekday("Mondayy"), None);
        assert_eq!(parse_weekday(""), None);
    }

    #[test]
    fn test_schedule_entry_parsed() {
        let entry = ScheduleEntry {
            day: "Friday".into(),
            start: "09:00".into(),
            end: "10:30".into(),
            room: "R1".into(),
        };
        let (day, start, end) = entry.parsed().unwrap();
        assert_eq!(day, Weekday::Fri);
        assert_eq!(start, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(end, NaiveTime::from_hms_opt(10, 30, 0).unwrap());
    }

    #[test]
    fn test_schedule_entry_malformed_time() {
        let entry = ScheduleEntry {
            day: "Friday".into(),
            start: "9 o'clock".into(),
            end: "10:30".into(),
            room: "R1".into(),
        };
        assert!(entry.parsed().is_none());
    }

    #[test]
    fn test_course_from_document() {
        let doc = json!({
            "name": "Databases II",
            "students": ["S1", "S2"],
            "schedule": [
                {"day": "Monday", "start": "09:00", "end": "10:00", "room": "R1"}
            ]
        });
        let course = Course::from_document("C1", doc).unwrap();
        assert_eq!(course.id, "C1");
        assert_eq!(course.students, vec!["S1", "S2"]);
        assert_eq!(course.schedule.len(), 1);
    }

    #[test]
    fn test_course_from_document_missing_name() {
        assert!(Course::from_document("C1", json!({"students": []})).is_none());
    }

    #[test]
    fn test_attendance_record_wire_shape() {
        let absent = serde_json::to_value(AttendanceRecord::absent()).unwrap();
        assert_eq!(
            absent,
            json!({"status": "absent", "registered_at": null, "late": false})
        );

        let at = NaiveTime::from_hms_opt(8, 56, 5).unwrap();
        let present = serde_json::to_value(AttendanceRecord::present(at, true)).unwrap();
        assert_eq!(
            present,
            json!({"status": "present", "registered_at": "08:56:05", "late": true})
        );
    }
}
