use rollcall_core::RegistrationPolicy;
use std::path::PathBuf;

/// Daemon configuration, loaded from environment variables.
pub struct Config {
    /// Path to the SQLite store file.
    pub db_path: PathBuf,
    /// Timing and acceptance policy for registration.
    pub policy: RegistrationPolicy,
}

impl Config {
    /// Load configuration from `ROLLCALL_*` environment variables with
    /// defaults.
    pub fn from_env() -> Self {
        let data_dir = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
                PathBuf::from(home).join(".local/share")
            })
            .join("rollcall");

        let db_path = std::env::var("ROLLCALL_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("attendance.db"));

        let defaults = RegistrationPolicy::default();
        let policy = RegistrationPolicy {
            window_open_mins: env_i64("ROLLCALL_WINDOW_OPEN_MINS", defaults.window_open_mins),
            window_close_mins: env_i64("ROLLCALL_WINDOW_CLOSE_MINS", defaults.window_close_mins),
            late_after_mins: env_i64("ROLLCALL_LATE_AFTER_MINS", defaults.late_after_mins),
            confirm_dwell_secs: env_i64("ROLLCALL_CONFIRM_DWELL_SECS", defaults.confirm_dwell_secs),
            seed_lead_mins: env_i64("ROLLCALL_SEED_LEAD_MINS", defaults.seed_lead_mins),
            seed_tolerance_mins: env_i64(
                "ROLLCALL_SEED_TOLERANCE_MINS",
                defaults.seed_tolerance_mins,
            ),
            accept_threshold: env_f32("ROLLCALL_ACCEPT_THRESHOLD", defaults.accept_threshold),
            sweep_interval_secs: env_u64(
                "ROLLCALL_SWEEP_INTERVAL_SECS",
                defaults.sweep_interval_secs,
            ),
        };

        Self { db_path, policy }
    }
}

fn env_i64(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
