//! Enumerations and field types for farm task scheduling.
//!
//! This module defines all the structured data types used to categorise work
//! assignments, including shifts, task types, status values, worker roles and
//! calendar view modes.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The three fixed daily work shifts.
///
/// Every task belongs to exactly one shift. Wall-clock ranges are fixed:
/// morning 06:00-12:00, afternoon 12:00-18:00, night 18:00-06:00.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Shift {
    #[serde(alias = "Morning")]
    Morning,
    #[serde(alias = "Afternoon")]
    Afternoon,
    #[serde(alias = "Night")]
    Night,
}

impl Shift {
    /// All shifts in wall-clock order.
    pub const ALL: [Shift; 3] = [Shift::Morning, Shift::Afternoon, Shift::Night];

    /// The wall-clock range of this shift as a display string.
    pub fn hours(self) -> &'static str {
        match self {
            Shift::Morning => "06:00-12:00",
            Shift::Afternoon => "12:00-18:00",
            Shift::Night => "18:00-06:00",
        }
    }
}

/// Categories of farm work.
///
/// Role-based visibility is derived from the task type (see `roles`),
/// never stored per-task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TaskType {
    Feeding,
    Cleaning,
    HealthCheck,
    Vaccination,
    Monitoring,
    Other,
}

/// Task completion status.
///
/// No transition table is enforced; any status may be set to any other
/// via update.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[serde(alias = "Pending")]
    Pending,
    #[serde(alias = "InProgress")]
    InProgress,
    #[serde(alias = "Completed")]
    Completed,
    #[serde(alias = "Cancelled")]
    Cancelled,
}

/// Worker roles, which drive task-type visibility.
///
/// `Unknown` catches unrecognised role strings in stored data; it maps to an
/// empty allowed-type set so an unknown role never sees any task (fail
/// closed). It is not offered on the command line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Admin,
    Employee,
    Veterinarian,
    #[serde(other)]
    #[value(skip)]
    Unknown,
}

/// Calendar granularity for the schedule views.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    Day,
    Week,
    Month,
}

/// Available sorting options for task lists.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortKey {
    Date,
    Shift,
    Id,
}

/// Filtering options for tasks based on their scheduled date.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateFilter {
    Today,
    ThisWeek,
    Overdue,
}
