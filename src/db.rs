//! The JSON-backed store and shared utility functions.
//!
//! This module provides the `Database` struct holding tasks and the roster,
//! along with date-input parsing, display formatting, validation, and the
//! console table printer. The store is the only component that assigns IDs
//! and touches timestamps; the calendar view-model never mutates a task.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::week_start;
use crate::fields::*;
use crate::roster::{Barn, Worker};
use crate::task::Task;

/// In-memory store for tasks and the farm roster.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Database {
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub barns: Vec<Barn>,
    #[serde(default)]
    pub workers: Vec<Worker>,
}

impl Database {
    /// Load the database from a JSON file, starting empty if the file is
    /// missing or unreadable.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Database::default();
        }
        let mut buf = String::new();
        match File::open(path).and_then(|mut f| f.read_to_string(&mut buf)) {
            Ok(_) => match serde_json::from_str(&buf) {
                Ok(db) => db,
                Err(e) => {
                    eprintln!("Error parsing DB, starting fresh: {e}");
                    Database::default()
                }
            },
            Err(e) => {
                eprintln!("Error reading DB, starting fresh: {e}");
                Database::default()
            }
        }
    }

    /// Save the database to a JSON file using atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        // Atomic-ish write via temp + rename.
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp)?;
        let data = serde_json::to_string_pretty(self).expect("database serialises");
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    /// Generate the next task ID ("T1", "T2", ...).
    pub fn next_task_id(&self) -> String {
        format!("T{}", next_seq(self.tasks.iter().map(|t| t.id.as_str()), 'T'))
    }

    /// Generate the next barn ID ("B1", "B2", ...).
    pub fn next_barn_id(&self) -> String {
        format!("B{}", next_seq(self.barns.iter().map(|b| b.id.as_str()), 'B'))
    }

    /// Generate the next worker ID ("W1", "W2", ...).
    pub fn next_worker_id(&self) -> String {
        format!("W{}", next_seq(self.workers.iter().map(|w| w.id.as_str()), 'W'))
    }

    /// Get a task by ID.
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Get a mutable reference to a task by ID.
    pub fn task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Remove a task by ID. Returns true if a task was removed.
    pub fn remove_task(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// Get a barn by ID.
    pub fn barn(&self, id: &str) -> Option<&Barn> {
        self.barns.iter().find(|b| b.id == id)
    }

    /// Get a worker by ID.
    pub fn worker(&self, id: &str) -> Option<&Worker> {
        self.workers.iter().find(|w| w.id == id)
    }
}

/// Highest numeric suffix among IDs with the given prefix letter, plus one.
fn next_seq<'a>(ids: impl Iterator<Item = &'a str>, prefix: char) -> u64 {
    ids.filter_map(|id| id.strip_prefix(prefix))
        .filter_map(|n| n.parse::<u64>().ok())
        .max()
        .unwrap_or(0)
        + 1
}

/// Resolve a barn given on the command line, by ID or by name
/// (case-insensitive). Ambiguous names ask for the ID instead.
pub fn resolve_barn<'a>(identifier: &str, db: &'a Database) -> Result<&'a Barn, String> {
    if let Some(barn) = db.barn(identifier) {
        return Ok(barn);
    }
    let matches: Vec<&Barn> = db
        .barns
        .iter()
        .filter(|b| b.name.to_lowercase() == identifier.to_lowercase())
        .collect();
    match matches.len() {
        0 => Err(format!("No barn found matching '{}'", identifier)),
        1 => Ok(matches[0]),
        _ => Err(format!(
            "Multiple barns named '{}'. Please use the specific ID instead.",
            identifier
        )),
    }
}

/// Resolve a worker given on the command line, by ID or by name
/// (case-insensitive).
pub fn resolve_worker<'a>(identifier: &str, db: &'a Database) -> Result<&'a Worker, String> {
    if let Some(worker) = db.worker(identifier) {
        return Ok(worker);
    }
    let matches: Vec<&Worker> = db
        .workers
        .iter()
        .filter(|w| w.name.to_lowercase() == identifier.to_lowercase())
        .collect();
    match matches.len() {
        0 => Err(format!("No worker found matching '{}'", identifier)),
        1 => Ok(matches[0]),
        _ => Err(format!(
            "Multiple workers named '{}'. Please use the specific ID instead.",
            identifier
        )),
    }
}

/// Parse human-readable date input with smart natural language support.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "monday".."sunday", "next monday", "this friday"
/// - "end of week", "end of month"
/// - "in 3d", "in 2w"
/// - "YYYY-MM-DD" format
pub fn parse_date_input(s: &str) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();
    let today = Local::now().date_naive();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        "end of week" | "eow" => {
            // The schedule week runs Sunday to Saturday.
            return Some(week_start(today) + Duration::days(6));
        }
        "end of month" | "eom" => {
            return Some(crate::calendar::last_day_of_month(today));
        }
        _ => {}
    }

    // "in X" patterns
    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(nd) = rest.strip_suffix('d') {
            if let Ok(days) = nd.trim().parse::<i64>() {
                return Some(today + Duration::days(days));
            }
        }
        if let Some(nw) = rest.strip_suffix('w') {
            if let Ok(weeks) = nw.trim().parse::<i64>() {
                return Some(today + Duration::weeks(weeks));
            }
        }
    }

    // Weekday patterns
    let weekdays = [
        ("monday", 0), ("tuesday", 1), ("wednesday", 2), ("thursday", 3),
        ("friday", 4), ("saturday", 5), ("sunday", 6),
        ("mon", 0), ("tue", 1), ("wed", 2), ("thu", 3),
        ("fri", 4), ("sat", 5), ("sun", 6),
    ];

    for (day_name, target_day) in weekdays {
        let current_day = today.weekday().num_days_from_monday() as i32;
        let days_ahead = (target_day + 7 - current_day) % 7;

        if s == day_name || s == format!("this {}", day_name) {
            return Some(today + Duration::days(days_ahead as i64));
        }
        if s == format!("next {}", day_name) {
            let days_to_add = if days_ahead == 0 { 7 } else { days_ahead + 7 };
            return Some(today + Duration::days(days_to_add as i64));
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

/// Format a scheduled date relative to today ("today", "tomorrow", "in 3d", "2d ago").
pub fn format_date_relative(date: NaiveDate, today: NaiveDate) -> String {
    let delta = (date - today).num_days();
    if delta == 0 {
        "today".into()
    } else if delta == 1 {
        "tomorrow".into()
    } else if delta > 1 {
        format!("in {}d", delta)
    } else {
        format!("{}d ago", -delta)
    }
}

/// Format a shift for display.
pub fn format_shift(s: Shift) -> &'static str {
    match s {
        Shift::Morning => "Morning",
        Shift::Afternoon => "Afternoon",
        Shift::Night => "Night",
    }
}

/// Format a task type for display.
pub fn format_task_type(t: TaskType) -> &'static str {
    match t {
        TaskType::Feeding => "Feeding",
        TaskType::Cleaning => "Cleaning",
        TaskType::HealthCheck => "Health Check",
        TaskType::Vaccination => "Vaccination",
        TaskType::Monitoring => "Monitoring",
        TaskType::Other => "Other",
    }
}

/// Format a task status for display.
pub fn format_status(s: Status) -> &'static str {
    match s {
        Status::Pending => "Pending",
        Status::InProgress => "InProgress",
        Status::Completed => "Completed",
        Status::Cancelled => "Cancelled",
    }
}

/// Format a worker role for display.
pub fn format_role(r: Role) -> &'static str {
    match r {
        Role::Admin => "Admin",
        Role::Employee => "Employee",
        Role::Veterinarian => "Veterinarian",
        Role::Unknown => "Unknown",
    }
}

/// Print tasks in a formatted console table.
pub fn print_table(tasks: &[&Task]) {
    println!(
        "{:<6} {:<12} {:<10} {:<13} {:<12} {:<14} {:<14} {}",
        "ID", "Date", "Shift", "Type", "Status", "Barn", "Worker", "Notes"
    );
    let today = Local::now().date_naive();
    for t in tasks {
        let date = format!("{} ({})", t.date.format("%Y-%m-%d"), format_date_relative(t.date, today));
        println!(
            "{:<6} {:<12} {:<10} {:<13} {:<12} {:<14} {:<14} {}",
            t.id,
            truncate(&date, 22),
            format_shift(t.shift),
            format_task_type(t.task_type),
            format_status(t.status),
            truncate(&t.barn_name, 14),
            truncate(&t.worker_name, 14),
            t.notes.as_deref().unwrap_or("-"),
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Role;

    #[test]
    fn test_next_ids_scan_numeric_suffix() {
        let mut db = Database::default();
        assert_eq!(db.next_task_id(), "T1");
        db.workers.push(Worker { id: "W7".into(), name: "Ana".into(), role: Role::Employee });
        db.workers.push(Worker { id: "W3".into(), name: "Bo".into(), role: Role::Admin });
        assert_eq!(db.next_worker_id(), "W8");
        assert_eq!(db.next_barn_id(), "B1");
    }

    #[test]
    fn test_parse_date_input_iso() {
        assert_eq!(
            parse_date_input("2025-11-20"),
            NaiveDate::from_ymd_opt(2025, 11, 20)
        );
        assert_eq!(parse_date_input("not a date"), None);
    }

    #[test]
    fn test_parse_date_input_relative() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date_input("today"), Some(today));
        assert_eq!(parse_date_input("tomorrow"), Some(today + Duration::days(1)));
        assert_eq!(parse_date_input("in 3d"), Some(today + Duration::days(3)));
        assert_eq!(parse_date_input("in 2w"), Some(today + Duration::weeks(2)));
    }

    #[test]
    fn test_format_date_relative() {
        let today = NaiveDate::from_ymd_opt(2025, 11, 20).unwrap();
        assert_eq!(format_date_relative(today, today), "today");
        assert_eq!(format_date_relative(today + Duration::days(1), today), "tomorrow");
        assert_eq!(format_date_relative(today + Duration::days(4), today), "in 4d");
        assert_eq!(format_date_relative(today - Duration::days(2), today), "2d ago");
    }

    #[test]
    fn test_resolve_worker_by_name_and_id() {
        let mut db = Database::default();
        db.workers.push(Worker { id: "W1".into(), name: "Ana".into(), role: Role::Employee });
        db.workers.push(Worker { id: "W2".into(), name: "Bo".into(), role: Role::Veterinarian });
        assert_eq!(resolve_worker("W2", &db).unwrap().name, "Bo");
        assert_eq!(resolve_worker("ana", &db).unwrap().id, "W1");
        assert!(resolve_worker("Cara", &db).is_err());
    }
}
