//! Task data structure and the ingestion boundary.
//!
//! This module defines the core `Task` struct that represents a single work
//! assignment — one barn, one worker, one calendar day, one shift — plus the
//! `RawTask` normalisation step that turns loosely-typed records arriving
//! from outside the store (CSV rows, external exports) into strongly-typed
//! tasks, rejecting malformed records instead of silently defaulting fields.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::fields::*;

/// A single work assignment on the farm schedule.
///
/// A task belongs to exactly one day and one shift; there are no multi-day
/// or multi-shift tasks. Barn and worker names are denormalised copies kept
/// for display so the calendar can render without a roster lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub date: NaiveDate,
    pub shift: Shift,
    pub barn_id: String,
    pub barn_name: String,
    pub worker_id: String,
    pub worker_name: String,
    pub task_type: TaskType,
    pub status: Status,
    pub notes: Option<String>,
    pub created_at_utc: i64,
    pub updated_at_utc: i64,
}

/// A loosely-typed task record as it arrives from outside the store.
///
/// Every field is a plain string; `normalise` is the only way to turn one
/// into a `Task`.
#[derive(Debug, Clone, Default)]
pub struct RawTask {
    pub id: String,
    pub date: String,
    pub shift: String,
    pub barn_id: String,
    pub barn_name: String,
    pub worker_id: String,
    pub worker_name: String,
    pub task_type: String,
    pub status: String,
    pub notes: String,
}

/// Why a raw record was rejected at the ingestion boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormaliseError {
    BadDate(String),
    UnknownShift(String),
    UnknownTaskType(String),
    UnknownStatus(String),
    MissingField(&'static str),
}

impl std::fmt::Display for NormaliseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormaliseError::BadDate(s) => write!(f, "invalid date '{}' (expected YYYY-MM-DD)", s),
            NormaliseError::UnknownShift(s) => write!(f, "unknown shift '{}'", s),
            NormaliseError::UnknownTaskType(s) => write!(f, "unknown task type '{}'", s),
            NormaliseError::UnknownStatus(s) => write!(f, "unknown status '{}'", s),
            NormaliseError::MissingField(name) => write!(f, "missing required field '{}'", name),
        }
    }
}

impl std::error::Error for NormaliseError {}

/// Parse a shift string in kebab-case.
pub fn parse_shift(s: &str) -> Option<Shift> {
    match s.trim().to_lowercase().as_str() {
        "morning" => Some(Shift::Morning),
        "afternoon" => Some(Shift::Afternoon),
        "night" => Some(Shift::Night),
        _ => None,
    }
}

/// Parse a task-type string in kebab-case.
pub fn parse_task_type(s: &str) -> Option<TaskType> {
    match s.trim().to_lowercase().as_str() {
        "feeding" => Some(TaskType::Feeding),
        "cleaning" => Some(TaskType::Cleaning),
        "health-check" => Some(TaskType::HealthCheck),
        "vaccination" => Some(TaskType::Vaccination),
        "monitoring" => Some(TaskType::Monitoring),
        "other" => Some(TaskType::Other),
        _ => None,
    }
}

/// Parse a status string in kebab-case.
pub fn parse_status(s: &str) -> Option<Status> {
    match s.trim().to_lowercase().as_str() {
        "pending" => Some(Status::Pending),
        "in-progress" => Some(Status::InProgress),
        "completed" => Some(Status::Completed),
        "cancelled" => Some(Status::Cancelled),
        _ => None,
    }
}

/// Normalise a raw record into a strongly-typed `Task`.
///
/// Rejects the record on the first malformed field. Unknown enum values are
/// an error, not a default: a record claiming a shift outside the three
/// known shifts is a data-contract violation and must surface, never be
/// bucketed somewhere arbitrary.
pub fn normalise(raw: &RawTask, now_utc: i64) -> Result<Task, NormaliseError> {
    if raw.date.trim().is_empty() {
        return Err(NormaliseError::MissingField("date"));
    }
    if raw.worker_id.trim().is_empty() {
        return Err(NormaliseError::MissingField("worker_id"));
    }
    let date = NaiveDate::parse_from_str(raw.date.trim(), "%Y-%m-%d")
        .map_err(|_| NormaliseError::BadDate(raw.date.clone()))?;
    let shift = parse_shift(&raw.shift).ok_or_else(|| NormaliseError::UnknownShift(raw.shift.clone()))?;
    let task_type =
        parse_task_type(&raw.task_type).ok_or_else(|| NormaliseError::UnknownTaskType(raw.task_type.clone()))?;
    let status = if raw.status.trim().is_empty() {
        Status::Pending
    } else {
        parse_status(&raw.status).ok_or_else(|| NormaliseError::UnknownStatus(raw.status.clone()))?
    };
    let notes = raw.notes.trim();

    Ok(Task {
        id: raw.id.clone(),
        date,
        shift,
        barn_id: raw.barn_id.trim().to_string(),
        barn_name: raw.barn_name.trim().to_string(),
        worker_id: raw.worker_id.trim().to_string(),
        worker_name: raw.worker_name.trim().to_string(),
        task_type,
        status,
        notes: if notes.is_empty() { None } else { Some(notes.to_string()) },
        created_at_utc: now_utc,
        updated_at_utc: now_utc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawTask {
        RawTask {
            id: "T1".into(),
            date: "2025-11-20".into(),
            shift: "morning".into(),
            barn_id: "B1".into(),
            barn_name: "Farrowing barn".into(),
            worker_id: "W1".into(),
            worker_name: "Ana".into(),
            task_type: "feeding".into(),
            status: "pending".into(),
            notes: "".into(),
        }
    }

    #[test]
    fn test_normalise_valid_record() {
        let task = normalise(&raw(), 1_700_000_000).unwrap();
        assert_eq!(task.date, NaiveDate::from_ymd_opt(2025, 11, 20).unwrap());
        assert_eq!(task.shift, Shift::Morning);
        assert_eq!(task.task_type, TaskType::Feeding);
        assert_eq!(task.status, Status::Pending);
        assert_eq!(task.notes, None);
    }

    #[test]
    fn test_normalise_rejects_unknown_shift() {
        let mut r = raw();
        r.shift = "graveyard".into();
        assert_eq!(
            normalise(&r, 0).unwrap_err(),
            NormaliseError::UnknownShift("graveyard".into())
        );
    }

    #[test]
    fn test_normalise_rejects_unknown_task_type() {
        let mut r = raw();
        r.task_type = "welding".into();
        assert!(matches!(normalise(&r, 0), Err(NormaliseError::UnknownTaskType(_))));
    }

    #[test]
    fn test_normalise_rejects_bad_date() {
        let mut r = raw();
        r.date = "20-11-2025".into();
        assert!(matches!(normalise(&r, 0), Err(NormaliseError::BadDate(_))));
    }

    #[test]
    fn test_normalise_defaults_empty_status_to_pending() {
        let mut r = raw();
        r.status = "".into();
        assert_eq!(normalise(&r, 0).unwrap().status, Status::Pending);
    }

    #[test]
    fn test_normalise_requires_worker() {
        let mut r = raw();
        r.worker_id = "  ".into();
        assert_eq!(normalise(&r, 0).unwrap_err(), NormaliseError::MissingField("worker_id"));
    }

    #[test]
    fn test_task_date_roundtrips_through_json() {
        let task = normalise(&raw(), 0).unwrap();
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"2025-11-20\""));
        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back.date, task.date);
    }
}
