//! Command implementations for the CLI interface.
//!
//! This module contains all the command handlers that implement the various
//! subcommands available in the CLI, from task CRUD and roster management to
//! the text schedule printer and the calendar TUI launcher.

use clap::Subcommand;
use clap_complete::{generate, Shell};

use std::fs;
use std::path::Path;

use chrono::{Datelike, Local, TimeZone, Utc};

use crate::calendar::{build_calendar, date_key, week_start, CalendarDay};
use crate::db::*;
use crate::fields::*;
use crate::roles::allowed_task_types;
use crate::roster::{Barn, Viewer, Worker};
use crate::task::{normalise, RawTask, Task};
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive calendar UI.
    Ui {
        /// View the calendar as this worker (ID or name). Defaults to the
        /// unfiltered team view.
        #[arg(long)]
        worker: Option<String>,
        /// Start in the personal "my schedule" view (requires --worker).
        #[arg(long)]
        personal: bool,
    },

    /// Add a new task to the schedule.
    Add {
        /// Scheduled date: YYYY-MM-DD, "today", "tomorrow", "in Nd", or a weekday name.
        date: String,
        /// Shift: morning | afternoon | night.
        #[arg(long, value_enum)]
        shift: Shift,
        /// Barn ID or name.
        #[arg(long)]
        barn: String,
        /// Assigned worker ID or name.
        #[arg(long)]
        worker: String,
        /// Task type: feeding | cleaning | health-check | vaccination | monitoring | other.
        #[arg(long = "type", value_enum)]
        task_type: TaskType,
        /// Status: pending | in-progress | completed | cancelled.
        #[arg(long, value_enum, default_value_t = Status::Pending)]
        status: Status,
        /// Optional free-text notes.
        #[arg(long)]
        notes: Option<String>,
    },

    /// List tasks with optional filters.
    List {
        /// Include completed and cancelled tasks.
        #[arg(long)]
        all: bool,
        /// Filter by status.
        #[arg(long, value_enum)]
        status: Option<Status>,
        /// Filter by shift.
        #[arg(long, value_enum)]
        shift: Option<Shift>,
        /// Filter by task type.
        #[arg(long = "type", value_enum)]
        task_type: Option<TaskType>,
        /// Filter by barn ID or name.
        #[arg(long)]
        barn: Option<String>,
        /// Filter by worker ID or name.
        #[arg(long)]
        worker: Option<String>,
        /// Date filter: today | this-week | overdue.
        #[arg(long, value_enum)]
        date: Option<DateFilter>,
        /// Sort key.
        #[arg(long, value_enum, default_value_t = SortKey::Date)]
        sort: SortKey,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// View a single task by ID.
    View {
        /// Task ID to view.
        id: String,
    },

    /// Update fields on a task.
    Update {
        /// Task ID to update.
        id: String,
        /// New scheduled date.
        #[arg(long)]
        date: Option<String>,
        #[arg(long, value_enum)]
        shift: Option<Shift>,
        /// Reassign to a barn (ID or name).
        #[arg(long)]
        barn: Option<String>,
        /// Reassign to a worker (ID or name).
        #[arg(long)]
        worker: Option<String>,
        #[arg(long = "type", value_enum)]
        task_type: Option<TaskType>,
        #[arg(long, value_enum)]
        status: Option<Status>,
        #[arg(long)]
        notes: Option<String>,
        /// Clear the notes field.
        #[arg(long)]
        clear_notes: bool,
    },

    /// Mark a task completed.
    Complete {
        /// Task ID to complete.
        id: String,
    },

    /// Reopen a task (status pending).
    Reopen {
        /// Task ID to reopen.
        id: String,
    },

    /// Cancel a task.
    Cancel {
        /// Task ID to cancel.
        id: String,
    },

    /// Delete a task by ID.
    Delete {
        /// Task ID to delete.
        id: String,
    },

    /// Print the day/week/month schedule as text.
    Schedule {
        /// Anchor date (defaults to today). Accepts the same forms as `add`.
        #[arg(long)]
        on: Option<String>,
        /// Calendar granularity.
        #[arg(long, value_enum, default_value_t = ViewMode::Week)]
        view: ViewMode,
        /// View the schedule as this worker (ID or name).
        #[arg(long)]
        worker: Option<String>,
        /// Personal "my schedule" view: only tasks assigned to --worker.
        #[arg(long)]
        personal: bool,
    },

    /// Manage barns.
    Barn {
        #[command(subcommand)]
        action: BarnAction,
    },

    /// Manage workers.
    Worker {
        #[command(subcommand)]
        action: WorkerAction,
    },

    /// Export tasks to CSV format.
    Export {
        /// Output file path (default: schedule.csv).
        #[arg(long, short)]
        output: Option<String>,
        /// Include completed and cancelled tasks.
        #[arg(long)]
        all: bool,
    },

    /// Import tasks from CSV format.
    Import {
        /// Input CSV file path.
        input: String,
        /// Skip creating backup before import.
        #[arg(long)]
        no_backup: bool,
    },

    /// Create a timestamped backup of the database file.
    Backup,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum BarnAction {
    /// Register a new barn.
    Add {
        /// Barn display name.
        name: String,
        /// Pen capacity (head count).
        #[arg(long)]
        capacity: Option<u32>,
    },
    /// List all barns.
    List,
    /// Remove a barn by ID.
    Remove {
        /// Barn ID to remove.
        id: String,
    },
}

#[derive(Subcommand)]
pub enum WorkerAction {
    /// Register a new worker.
    Add {
        /// Worker display name.
        name: String,
        /// Role: admin | employee | veterinarian.
        #[arg(long, value_enum, default_value_t = Role::Employee)]
        role: Role,
    },
    /// List all workers.
    List,
    /// Remove a worker by ID.
    Remove {
        /// Worker ID to remove.
        id: String,
    },
}

/// Launch the terminal calendar interface.
pub fn cmd_ui(db_path: &Path, worker: Option<String>, personal: bool) {
    let viewer = worker.map(|w| {
        let db = Database::load(db_path);
        match resolve_worker(&w, &db) {
            Ok(worker) => Viewer::from(worker),
            Err(e) => {
                eprintln!("Error resolving worker: {}", e);
                std::process::exit(1);
            }
        }
    });
    if personal && viewer.is_none() {
        eprintln!("--personal requires --worker.");
        std::process::exit(1);
    }
    if let Err(e) = run_tui(db_path, viewer, personal) {
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

/// Add a new task to the schedule.
pub fn cmd_add(
    db: &mut Database,
    db_path: &Path,
    date: String,
    shift: Shift,
    barn: String,
    worker: String,
    task_type: TaskType,
    status: Status,
    notes: Option<String>,
) {
    let Some(date) = parse_date_input(&date) else {
        eprintln!("Could not parse date '{}'.", date);
        std::process::exit(1);
    };

    let (barn_id, barn_name) = match resolve_barn(&barn, db) {
        Ok(b) => (b.id.clone(), b.name.clone()),
        Err(e) => {
            eprintln!("Error resolving barn: {}", e);
            std::process::exit(1);
        }
    };
    let (worker_id, worker_name, worker_role) = match resolve_worker(&worker, db) {
        Ok(w) => (w.id.clone(), w.name.clone(), w.role),
        Err(e) => {
            eprintln!("Error resolving worker: {}", e);
            std::process::exit(1);
        }
    };

    // Assigning outside the worker's role is allowed (an admin may cover any
    // shift), but worth a nudge since the task won't show on their calendar.
    if !allowed_task_types(worker_role).contains(&task_type) {
        println!(
            "Note: {} ({}) does not cover {} tasks; it will not appear in their role-filtered view.",
            worker_name,
            format_role(worker_role),
            format_task_type(task_type)
        );
    }

    let now_utc = Utc::now().timestamp();
    let id = db.next_task_id();
    let task = Task {
        id: id.clone(),
        date,
        shift,
        barn_id,
        barn_name,
        worker_id,
        worker_name,
        task_type,
        status,
        notes: notes.filter(|n| !n.trim().is_empty()),
        created_at_utc: now_utc,
        updated_at_utc: now_utc,
    };
    db.tasks.push(task);
    if let Err(e) = db.save(db_path) {
        eprintln!("Failed to save DB: {e}");
        std::process::exit(1);
    }
    println!("Added task {} on {} ({})", id, date_key(date), format_shift(shift));
}

/// List tasks with optional filtering and sorting.
pub fn cmd_list(
    db: &Database,
    all: bool,
    status: Option<Status>,
    shift: Option<Shift>,
    task_type: Option<TaskType>,
    barn: Option<String>,
    worker: Option<String>,
    date: Option<DateFilter>,
    sort: SortKey,
    limit: Option<usize>,
) {
    let today = Local::now().date_naive();
    let start = week_start(today);
    let week_end = start + chrono::Duration::days(6);

    let barn_id = barn.map(|b| match resolve_barn(&b, db) {
        Ok(barn) => barn.id.clone(),
        Err(e) => {
            eprintln!("Error resolving barn: {}", e);
            std::process::exit(1);
        }
    });
    let worker_id = worker.map(|w| match resolve_worker(&w, db) {
        Ok(worker) => worker.id.clone(),
        Err(e) => {
            eprintln!("Error resolving worker: {}", e);
            std::process::exit(1);
        }
    });

    let mut filtered: Vec<&Task> = db
        .tasks
        .iter()
        .filter(|t| {
            if !all && status.is_none() && matches!(t.status, Status::Completed | Status::Cancelled) {
                return false;
            }
            if let Some(s) = status {
                if t.status != s {
                    return false;
                }
            }
            if let Some(s) = shift {
                if t.shift != s {
                    return false;
                }
            }
            if let Some(tt) = task_type {
                if t.task_type != tt {
                    return false;
                }
            }
            if let Some(ref b) = barn_id {
                if &t.barn_id != b {
                    return false;
                }
            }
            if let Some(ref w) = worker_id {
                if &t.worker_id != w {
                    return false;
                }
            }
            if let Some(df) = date {
                match df {
                    DateFilter::Today => {
                        if t.date != today {
                            return false;
                        }
                    }
                    DateFilter::ThisWeek => {
                        if t.date < start || t.date > week_end {
                            return false;
                        }
                    }
                    DateFilter::Overdue => {
                        if t.date >= today || t.status != Status::Pending {
                            return false;
                        }
                    }
                }
            }
            true
        })
        .collect();

    match sort {
        SortKey::Date => filtered.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then(shift_order(a.shift).cmp(&shift_order(b.shift)))
                .then(a.id.cmp(&b.id))
        }),
        SortKey::Shift => filtered.sort_by(|a, b| {
            shift_order(a.shift)
                .cmp(&shift_order(b.shift))
                .then(a.date.cmp(&b.date))
                .then(a.id.cmp(&b.id))
        }),
        SortKey::Id => filtered.sort_by(|a, b| id_order(&a.id).cmp(&id_order(&b.id))),
    }

    if let Some(n) = limit {
        filtered.truncate(n);
    }

    print_table(&filtered);
}

/// Wall-clock ordering index for a shift.
fn shift_order(s: Shift) -> u8 {
    match s {
        Shift::Morning => 0,
        Shift::Afternoon => 1,
        Shift::Night => 2,
    }
}

/// Numeric ordering for store-assigned IDs ("T10" after "T9").
fn id_order(id: &str) -> (u64, &str) {
    let n = id
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .parse::<u64>()
        .unwrap_or(u64::MAX);
    (n, id)
}

/// View detailed information about a specific task.
pub fn cmd_view(db: &Database, id: String) {
    let Some(task) = db.task(&id) else {
        eprintln!("Task {} not found.", id);
        std::process::exit(1);
    };
    let today = Local::now().date_naive();
    println!("ID:           {}", task.id);
    println!(
        "Date:         {} ({})",
        date_key(task.date),
        format_date_relative(task.date, today)
    );
    println!("Shift:        {} ({})", format_shift(task.shift), task.shift.hours());
    println!("Type:         {}", format_task_type(task.task_type));
    println!("Status:       {}", format_status(task.status));
    println!("Barn:         {} ({})", task.barn_name, task.barn_id);
    println!("Worker:       {} ({})", task.worker_name, task.worker_id);
    println!("Notes:        {}", task.notes.as_deref().unwrap_or("-"));
    println!(
        "Created UTC:  {}",
        Utc.timestamp_opt(task.created_at_utc, 0).single().map(|t| t.to_rfc3339()).unwrap_or_else(|| "-".into())
    );
    println!(
        "Updated UTC:  {}",
        Utc.timestamp_opt(task.updated_at_utc, 0).single().map(|t| t.to_rfc3339()).unwrap_or_else(|| "-".into())
    );
}

/// Update an existing task's fields.
pub fn cmd_update(
    db: &mut Database,
    db_path: &Path,
    id: String,
    date: Option<String>,
    shift: Option<Shift>,
    barn: Option<String>,
    worker: Option<String>,
    task_type: Option<TaskType>,
    status: Option<Status>,
    notes: Option<String>,
    clear_notes: bool,
) {
    if db.task(&id).is_none() {
        eprintln!("Task {} not found.", id);
        std::process::exit(1);
    }

    let new_date = date.map(|d| match parse_date_input(&d) {
        Some(date) => date,
        None => {
            eprintln!("Could not parse date '{}'.", d);
            std::process::exit(1);
        }
    });
    let new_barn = barn.map(|b| match resolve_barn(&b, db) {
        Ok(barn) => (barn.id.clone(), barn.name.clone()),
        Err(e) => {
            eprintln!("Error resolving barn: {}", e);
            std::process::exit(1);
        }
    });
    let new_worker = worker.map(|w| match resolve_worker(&w, db) {
        Ok(worker) => (worker.id.clone(), worker.name.clone()),
        Err(e) => {
            eprintln!("Error resolving worker: {}", e);
            std::process::exit(1);
        }
    });

    let task = db.task_mut(&id).expect("checked above");
    if let Some(d) = new_date {
        task.date = d;
    }
    if let Some(s) = shift {
        task.shift = s;
    }
    if let Some((bid, bname)) = new_barn {
        task.barn_id = bid;
        task.barn_name = bname;
    }
    if let Some((wid, wname)) = new_worker {
        task.worker_id = wid;
        task.worker_name = wname;
    }
    if let Some(tt) = task_type {
        task.task_type = tt;
    }
    if let Some(s) = status {
        task.status = s;
    }
    if clear_notes {
        task.notes = None;
    } else if let Some(n) = notes {
        task.notes = if n.trim().is_empty() { None } else { Some(n) };
    }
    task.updated_at_utc = Utc::now().timestamp();

    if let Err(e) = db.save(db_path) {
        eprintln!("Failed to save DB: {e}");
        std::process::exit(1);
    }
    println!("Updated task {}", id);
}

/// Set a task's status (used by complete / reopen / cancel).
pub fn cmd_set_status(db: &mut Database, db_path: &Path, id: String, status: Status) {
    let Some(task) = db.task_mut(&id) else {
        eprintln!("Task {} not found.", id);
        std::process::exit(1);
    };
    task.status = status;
    task.updated_at_utc = Utc::now().timestamp();
    if let Err(e) = db.save(db_path) {
        eprintln!("Failed to save DB: {e}");
        std::process::exit(1);
    }
    println!("Task {} is now {}", id, format_status(status));
}

/// Delete a task by ID.
pub fn cmd_delete(db: &mut Database, db_path: &Path, id: String) {
    if !db.remove_task(&id) {
        eprintln!("Task {} not found.", id);
        std::process::exit(1);
    }
    if let Err(e) = db.save(db_path) {
        eprintln!("Failed to save DB: {e}");
        std::process::exit(1);
    }
    println!("Deleted task {}", id);
}

/// Print the schedule for a day, week or month as text.
pub fn cmd_schedule(
    db: &Database,
    on: Option<String>,
    view: ViewMode,
    worker: Option<String>,
    personal: bool,
) {
    let anchor = match on {
        Some(s) => match parse_date_input(&s) {
            Some(d) => d,
            None => {
                eprintln!("Could not parse date '{}'.", s);
                std::process::exit(1);
            }
        },
        None => Local::now().date_naive(),
    };

    let viewer = worker.map(|w| match resolve_worker(&w, db) {
        Ok(worker) => Viewer::from(worker),
        Err(e) => {
            eprintln!("Error resolving worker: {}", e);
            std::process::exit(1);
        }
    });
    if personal && viewer.is_none() {
        eprintln!("--personal requires --worker.");
        std::process::exit(1);
    }

    let days = build_calendar(&db.tasks, anchor, view, viewer.as_ref(), personal);

    match view {
        ViewMode::Day => print_day(&days[0]),
        ViewMode::Week => {
            println!(
                "Week of {} - {}",
                date_key(days.first().expect("week has 7 days").date),
                date_key(days.last().expect("week has 7 days").date)
            );
            for day in &days {
                print_day(day);
            }
        }
        ViewMode::Month => print_month_grid(&days, anchor.format("%B %Y").to_string()),
    }
}

/// Print one day's tasks, grouped by shift.
fn print_day(day: &CalendarDay) {
    let marker = if day.is_today { "  <- today" } else { "" };
    println!("\n{} ({}){}", date_key(day.date), day.date.format("%a"), marker);
    if day.shifts.is_empty() {
        println!("  (no tasks)");
        return;
    }
    for shift in Shift::ALL {
        let bucket = day.shifts.get(shift);
        if bucket.is_empty() {
            continue;
        }
        println!("  {} ({})", format_shift(shift), shift.hours());
        for t in bucket {
            println!(
                "    {} {} - {} @ {} ({})",
                t.id,
                format_task_type(t.task_type),
                t.worker_name,
                t.barn_name,
                format_status(t.status)
            );
        }
    }
}

/// Print the month as a 7-column grid of day numbers and task counts.
fn print_month_grid(days: &[CalendarDay], title: String) {
    println!("{}", title);
    println!("{:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}", "Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat");
    for week in days.chunks(7) {
        let cells: Vec<String> = week
            .iter()
            .map(|day| {
                let count = day.shifts.len();
                let mark = if day.is_today {
                    '*'
                } else if !day.in_anchor_month {
                    '.'
                } else {
                    ' '
                };
                if count == 0 {
                    format!("{}{:>3}  - ", mark, day.date.day())
                } else {
                    format!("{}{:>3} [{}]", mark, day.date.day(), count)
                }
            })
            .collect();
        println!("{:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
            cells[0], cells[1], cells[2], cells[3], cells[4], cells[5], cells[6]);
    }
}

/// Barn roster management.
pub fn cmd_barn(db: &mut Database, db_path: &Path, action: BarnAction) {
    match action {
        BarnAction::Add { name, capacity } => {
            if name.trim().is_empty() {
                eprintln!("Barn name cannot be empty.");
                std::process::exit(1);
            }
            let id = db.next_barn_id();
            db.barns.push(Barn { id: id.clone(), name: name.clone(), capacity });
            if let Err(e) = db.save(db_path) {
                eprintln!("Failed to save DB: {e}");
                std::process::exit(1);
            }
            println!("Added barn {} ({})", id, name);
        }
        BarnAction::List => {
            println!("{:<6} {:<20} {}", "ID", "Name", "Capacity");
            for b in &db.barns {
                println!(
                    "{:<6} {:<20} {}",
                    b.id,
                    truncate(&b.name, 20),
                    b.capacity.map(|c| c.to_string()).unwrap_or_else(|| "-".into())
                );
            }
        }
        BarnAction::Remove { id } => {
            let in_use = db.tasks.iter().any(|t| t.barn_id == id);
            if in_use {
                eprintln!("Barn {} still has scheduled tasks; delete or reassign them first.", id);
                std::process::exit(1);
            }
            let before = db.barns.len();
            db.barns.retain(|b| b.id != id);
            if db.barns.len() == before {
                eprintln!("Barn {} not found.", id);
                std::process::exit(1);
            }
            if let Err(e) = db.save(db_path) {
                eprintln!("Failed to save DB: {e}");
                std::process::exit(1);
            }
            println!("Removed barn {}", id);
        }
    }
}

/// Worker roster management.
pub fn cmd_worker(db: &mut Database, db_path: &Path, action: WorkerAction) {
    match action {
        WorkerAction::Add { name, role } => {
            if name.trim().is_empty() {
                eprintln!("Worker name cannot be empty.");
                std::process::exit(1);
            }
            let id = db.next_worker_id();
            db.workers.push(Worker { id: id.clone(), name: name.clone(), role });
            if let Err(e) = db.save(db_path) {
                eprintln!("Failed to save DB: {e}");
                std::process::exit(1);
            }
            println!("Added worker {} ({}, {})", id, name, format_role(role));
        }
        WorkerAction::List => {
            println!("{:<6} {:<20} {:<14} {}", "ID", "Name", "Role", "Covers");
            for w in &db.workers {
                let covers: Vec<&str> = allowed_task_types(w.role).iter().map(|&tt| format_task_type(tt)).collect();
                println!(
                    "{:<6} {:<20} {:<14} {}",
                    w.id,
                    truncate(&w.name, 20),
                    format_role(w.role),
                    if covers.is_empty() { "-".into() } else { covers.join(", ") }
                );
            }
        }
        WorkerAction::Remove { id } => {
            let in_use = db.tasks.iter().any(|t| t.worker_id == id);
            if in_use {
                eprintln!("Worker {} still has scheduled tasks; delete or reassign them first.", id);
                std::process::exit(1);
            }
            let before = db.workers.len();
            db.workers.retain(|w| w.id != id);
            if db.workers.len() == before {
                eprintln!("Worker {} not found.", id);
                std::process::exit(1);
            }
            if let Err(e) = db.save(db_path) {
                eprintln!("Failed to save DB: {e}");
                std::process::exit(1);
            }
            println!("Removed worker {}", id);
        }
    }
}

const CSV_HEADER: &str = "ID,Date,Shift,Type,Status,BarnID,Barn,WorkerID,Worker,Notes";

/// Export tasks to CSV.
pub fn cmd_export(db: &Database, output: Option<String>, all: bool) {
    let output_path = output.unwrap_or_else(|| "schedule.csv".to_string());

    let tasks: Vec<&Task> = db
        .tasks
        .iter()
        .filter(|t| all || !matches!(t.status, Status::Completed | Status::Cancelled))
        .collect();

    let mut csv_content = String::new();
    csv_content.push_str(CSV_HEADER);
    csv_content.push('\n');

    // Escape CSV fields that contain commas, quotes or newlines.
    let escape_csv = |s: &str| {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    };

    let task_count = tasks.len();
    for task in &tasks {
        csv_content.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{}\n",
            task.id,
            date_key(task.date),
            shift_key(task.shift),
            task_type_key(task.task_type),
            status_key(task.status),
            escape_csv(&task.barn_id),
            escape_csv(&task.barn_name),
            escape_csv(&task.worker_id),
            escape_csv(&task.worker_name),
            escape_csv(task.notes.as_deref().unwrap_or("")),
        ));
    }

    match std::fs::write(&output_path, csv_content) {
        Ok(_) => {
            println!("Exported {} task(s) to {}", task_count, output_path);
        }
        Err(e) => {
            eprintln!("Failed to write CSV file: {}", e);
            std::process::exit(1);
        }
    }
}

/// Kebab-case storage key for a shift.
fn shift_key(s: Shift) -> &'static str {
    match s {
        Shift::Morning => "morning",
        Shift::Afternoon => "afternoon",
        Shift::Night => "night",
    }
}

/// Kebab-case storage key for a task type.
fn task_type_key(t: TaskType) -> &'static str {
    match t {
        TaskType::Feeding => "feeding",
        TaskType::Cleaning => "cleaning",
        TaskType::HealthCheck => "health-check",
        TaskType::Vaccination => "vaccination",
        TaskType::Monitoring => "monitoring",
        TaskType::Other => "other",
    }
}

/// Kebab-case storage key for a status.
fn status_key(s: Status) -> &'static str {
    match s {
        Status::Pending => "pending",
        Status::InProgress => "in-progress",
        Status::Completed => "completed",
        Status::Cancelled => "cancelled",
    }
}

/// Create a timestamped backup of the database file.
pub fn create_backup(db_path: &Path) -> Result<String, std::io::Error> {
    if !db_path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Database file does not exist",
        ));
    }

    let parent_dir = db_path.parent().unwrap_or_else(|| Path::new("."));
    let backup_dir = parent_dir.join("backup");
    fs::create_dir_all(&backup_dir)?;

    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let db_filename = db_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("farm_tasks.json");

    let backup_filename = format!("{}_{}", timestamp, db_filename);
    let backup_path = backup_dir.join(backup_filename);
    fs::copy(db_path, &backup_path)?;

    Ok(backup_path.to_string_lossy().to_string())
}

/// Import tasks from CSV format with automatic backup.
///
/// Every row passes through the normalisation boundary: rows with unknown
/// shift/type/status values or malformed dates are reported and skipped,
/// never silently defaulted.
pub fn cmd_import(db: &mut Database, db_path: &Path, input: String, no_backup: bool) {
    if !no_backup {
        match create_backup(db_path) {
            Ok(backup_path) => {
                println!("Created backup: {}", backup_path);
            }
            Err(e) => {
                eprintln!("Warning: Failed to create backup: {}", e);
                print!("Continue without backup? (y/N): ");
                use std::io::{self, Write};
                let _ = io::stdout().flush();

                let mut response = String::new();
                if io::stdin().read_line(&mut response).is_err()
                    || !response.trim().to_lowercase().starts_with('y')
                {
                    println!("Import cancelled.");
                    return;
                }
            }
        }
    }

    let csv_content = match fs::read_to_string(&input) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Failed to read CSV file '{}': {}", input, e);
            std::process::exit(1);
        }
    };

    let lines: Vec<&str> = csv_content.lines().collect();
    if lines.is_empty() {
        eprintln!("CSV file is empty");
        std::process::exit(1);
    }

    if lines[0] != CSV_HEADER {
        eprintln!("Invalid CSV header. Expected:\n{}\nGot:\n{}", CSV_HEADER, lines[0]);
        std::process::exit(1);
    }

    let mut imported_count = 0;
    let mut skipped_count = 0;
    let now_utc = Utc::now().timestamp();

    for (line_num, line) in lines.iter().skip(1).enumerate() {
        let line_num = line_num + 2; // header skipped, line numbers 1-based

        let fields = parse_csv_line(line);
        if fields.len() != 10 {
            eprintln!("Warning: Line {} has {} fields, expected 10. Skipping.", line_num, fields.len());
            skipped_count += 1;
            continue;
        }

        let raw = RawTask {
            id: String::new(), // store assigns its own IDs
            date: fields[1].clone(),
            shift: fields[2].clone(),
            barn_id: fields[5].clone(),
            barn_name: fields[6].clone(),
            worker_id: fields[7].clone(),
            worker_name: fields[8].clone(),
            task_type: fields[3].clone(),
            status: fields[4].clone(),
            notes: fields[9].clone(),
        };

        let mut task = match normalise(&raw, now_utc) {
            Ok(task) => task,
            Err(e) => {
                eprintln!("Warning: Line {}: {}. Skipping.", line_num, e);
                skipped_count += 1;
                continue;
            }
        };

        // Skip rows that duplicate an existing assignment.
        let duplicate = db.tasks.iter().any(|t| {
            t.date == task.date
                && t.shift == task.shift
                && t.worker_id == task.worker_id
                && t.task_type == task.task_type
        });
        if duplicate {
            eprintln!(
                "Warning: Line {}: {} already has a {} task on {} ({}). Skipping.",
                line_num,
                task.worker_name,
                task_type_key(task.task_type),
                date_key(task.date),
                shift_key(task.shift)
            );
            skipped_count += 1;
            continue;
        }

        task.id = db.next_task_id();
        db.tasks.push(task);
        imported_count += 1;
    }

    if let Err(e) = db.save(db_path) {
        eprintln!("Failed to save database: {}", e);
        std::process::exit(1);
    }

    println!("Import completed. {} tasks imported, {} skipped.", imported_count, skipped_count);
}

/// Simple CSV line parser that handles quoted fields.
fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current_field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    // Escaped quote
                    current_field.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                fields.push(current_field);
                current_field = String::new();
            }
            _ => {
                current_field.push(ch);
            }
        }
    }

    fields.push(current_field);
    fields
}

/// Create a backup command implementation.
pub fn cmd_backup(db_path: &Path) {
    match create_backup(db_path) {
        Ok(backup_path) => {
            println!("Backup created: {}", backup_path);
        }
        Err(e) => {
            eprintln!("Failed to create backup: {}", e);
            std::process::exit(1);
        }
    }
}

/// Generate shell completion scripts on stdout.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    let mut cmd = crate::cli::Cli::command();
    generate(shell, &mut cmd, "fh", &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_line_quoted_fields() {
        let fields = parse_csv_line("T1,2025-11-20,morning,\"a, quoted\",\"he said \"\"hi\"\"\"");
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[3], "a, quoted");
        assert_eq!(fields[4], "he said \"hi\"");
    }

    #[test]
    fn test_id_order_sorts_numerically() {
        let mut ids = vec!["T10", "T2", "T1"];
        ids.sort_by_key(|id| id_order(id));
        assert_eq!(ids, vec!["T1", "T2", "T10"]);
    }

    #[test]
    fn test_enum_storage_keys_roundtrip_through_normalise_parsers() {
        use crate::task::{parse_shift, parse_status, parse_task_type};
        for s in Shift::ALL {
            assert_eq!(parse_shift(shift_key(s)), Some(s));
        }
        for t in [
            TaskType::Feeding,
            TaskType::Cleaning,
            TaskType::HealthCheck,
            TaskType::Vaccination,
            TaskType::Monitoring,
            TaskType::Other,
        ] {
            assert_eq!(parse_task_type(task_type_key(t)), Some(t));
        }
        for st in [Status::Pending, Status::InProgress, Status::Completed, Status::Cancelled] {
            assert_eq!(parse_status(status_key(st)), Some(st));
        }
    }
}
