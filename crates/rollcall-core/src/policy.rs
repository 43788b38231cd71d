/// Timing and acceptance policy for attendance registration.
///
/// Every number that gates a write is configuration rather than a literal;
/// the daemon overrides the defaults from `ROLLCALL_*` environment
/// variables.
#[derive(Debug, Clone)]
pub struct RegistrationPolicy {
    /// Minutes before an entry's start at which its registration window opens.
    pub window_open_mins: i64,
    /// Minutes before an entry's end at which its registration window closes.
    pub window_close_mins: i64,
    /// A presence registered more than this many minutes after the canonical
    /// start is marked late. Exactly this many minutes is on time.
    pub late_after_mins: i64,
    /// Minimum dwell in seconds between the first and a later hit before a
    /// recognition is confirmed.
    pub confirm_dwell_secs: i64,
    /// Lead time in minutes ahead of a session start at which its ledger is
    /// seeded.
    pub seed_lead_mins: i64,
    /// Tolerance band in minutes around the seeding lead time.
    pub seed_tolerance_mins: i64,
    /// Recognition confidence accept boundary. Confidence is an LBPH-style
    /// distance, lower is better; a hit at or above this value is rejected.
    pub accept_threshold: f32,
    /// Seconds between seeding sweeps.
    pub sweep_interval_secs: u64,
}

impl Default for RegistrationPolicy {
    fn default() -> Self {
        Self {
            window_open_mins: 5,
            window_close_mins: 15,
            late_after_mins: 30,
            confirm_dwell_secs: 3,
            seed_lead_mins: 5,
            seed_tolerance_mins: 1,
            accept_threshold: 70.0,
            sweep_interval_secs: 60,
        }
    }
}
