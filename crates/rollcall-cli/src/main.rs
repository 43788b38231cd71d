use anyhow::{bail, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use rollcall_core::resolver;
use rollcall_store::{DocumentStore, SqliteStore};
use rollcalld::catalog::CourseCatalog;
use rollcalld::config::Config;
use rollcalld::recorder::{AttendanceRecorder, SeedOutcome};
use rollcalld::room::RoomConfig;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "rollcall", about = "Rollcall attendance CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the configured room
    Room,
    /// Set the configured room
    SetRoom {
        room: String,
    },
    /// Resolve the session active right now in the configured room
    Resolve,
    /// List sessions about to start in the configured room
    Upcoming,
    /// Seed a course's ledger for a date with every student absent
    Seed {
        course: String,
        /// Date (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Print a course's ledger for a date
    Ledger {
        course: String,
        /// Date (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    let store = Arc::new(SqliteStore::open(&config.db_path)?);
    let rooms = RoomConfig::load(store.clone())?;

    match cli.command {
        Commands::Room => match rooms.current() {
            Some(room) => println!("{room}"),
            None => println!("no room configured"),
        },
        Commands::SetRoom { room } => {
            rooms.set(&room)?;
            println!("room set to {room}");
        }
        Commands::Resolve => {
            let Some(room) = rooms.current() else {
                bail!("no room configured; run `rollcall set-room` first");
            };
            let courses = CourseCatalog::new(store).all()?;
            let now = Local::now().naive_local();
            match resolver::active_session(now, &room, &courses, &config.policy) {
                Some(session) => println!(
                    "{} on {} starting {}",
                    session.course_id, session.date, session.starts_at
                ),
                None => println!("no active session in {room}"),
            }
        }
        Commands::Upcoming => {
            let Some(room) = rooms.current() else {
                bail!("no room configured; run `rollcall set-room` first");
            };
            let courses = CourseCatalog::new(store).all()?;
            let now = Local::now().naive_local();
            let upcoming = resolver::upcoming_sessions(now, &room, &courses, &config.policy);
            if upcoming.is_empty() {
                println!("no sessions about to start in {room}");
            }
            for session in upcoming {
                println!(
                    "{} on {} starting {}",
                    session.course_id, session.date, session.starts_at
                );
            }
        }
        Commands::Seed { course, date } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let recorder = AttendanceRecorder::new(store, config.policy);
            match recorder.seed_absentees(&course, date)? {
                SeedOutcome::Created { students } => {
                    println!("seeded {course} for {date}: {students} students absent");
                }
                SeedOutcome::AlreadyExists => {
                    println!("ledger for {course} on {date} already exists");
                }
            }
        }
        Commands::Ledger { course, date } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let path = format!("courses/{course}/assistances/{}", date.format("%Y-%m-%d"));
            match store.get(&path)? {
                Some(ledger) => println!("{}", serde_json::to_string_pretty(&ledger)?),
                None => println!("no ledger for {course} on {date}"),
            }
        }
    }

    Ok(())
}
