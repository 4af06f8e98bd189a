//! # FH - Farm Shift Scheduling CLI
//!
//! A command-line scheduling tool for farm work assignments, with a
//! day/week/month calendar TUI partitioned by work shift and filtered by
//! worker role.
//!
//! ## Key Features
//!
//! - **Three Fixed Shifts**: Morning (06:00-12:00), Afternoon (12:00-18:00)
//!   and Night (18:00-06:00); every task lands in exactly one shift on one day
//! - **Role-Based Views**: Admins see every task type, employees see feeding
//!   and cleaning, veterinarians see health checks and vaccinations
//! - **Multiple Interfaces**: Full CLI for automation + interactive calendar
//!   TUI for visual scheduling
//! - **Barn & Worker Roster**: Tasks reference barns and staff with
//!   denormalised names for fast display
//! - **Local File Storage**: Simple JSON file with CSV export/import and
//!   backup functionality
//!
//! ## Quick Start
//!
//! ```bash
//! # Register a barn and a worker
//! fh barn add "Farrowing barn 1"
//! fh worker add "Ana" --role veterinarian
//!
//! # Schedule a task
//! fh add tomorrow --shift morning --barn B1 --worker Ana --type vaccination
//!
//! # Print this week's schedule
//! fh schedule --view week
//!
//! # Launch the calendar TUI as a specific worker
//! fh ui --worker Ana --personal
//! ```
//!
//! Data is stored locally in `~/.farmhand/farm_tasks.json`. We recommend you
//! source control this folder via `git init` and back it up periodically.

use std::path::PathBuf;

use clap::Parser;

pub mod calendar;
pub mod cli;
pub mod cmd;
pub mod db;
pub mod fields;
pub mod roles;
pub mod roster;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod run;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use db::Database;
use fields::Status;

fn main() {
    let cli = Cli::parse();

    // Determine the database file to use
    let db_path = cli.db.unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let data_dir = PathBuf::from(home).join(".farmhand");
        if let Err(e) = std::fs::create_dir_all(&data_dir) {
            eprintln!("Failed to create data directory {}: {}", data_dir.display(), e);
            std::process::exit(1);
        }
        data_dir.join("farm_tasks.json")
    });

    match cli.command {
        // Completions don't need the database at all
        Commands::Completions { shell } => cmd_completions(shell),

        // The UI loads the database itself so it can reload on demand
        Commands::Ui { worker, personal } => cmd_ui(&db_path, worker, personal),

        command => {
            let mut db = Database::load(&db_path);
            match command {
                Commands::Ui { .. } => unreachable!("UI command handled above"),
                Commands::Completions { .. } => unreachable!("Completions command handled above"),

                Commands::Add { date, shift, barn, worker, task_type, status, notes } =>
                    cmd_add(&mut db, &db_path, date, shift, barn, worker, task_type, status, notes),

                Commands::List { all, status, shift, task_type, barn, worker, date, sort, limit } =>
                    cmd_list(&db, all, status, shift, task_type, barn, worker, date, sort, limit),

                Commands::View { id } => cmd_view(&db, id),

                Commands::Update { id, date, shift, barn, worker, task_type, status, notes, clear_notes } =>
                    cmd_update(&mut db, &db_path, id, date, shift, barn, worker, task_type, status, notes, clear_notes),

                Commands::Complete { id } => cmd_set_status(&mut db, &db_path, id, Status::Completed),

                Commands::Reopen { id } => cmd_set_status(&mut db, &db_path, id, Status::Pending),

                Commands::Cancel { id } => cmd_set_status(&mut db, &db_path, id, Status::Cancelled),

                Commands::Delete { id } => cmd_delete(&mut db, &db_path, id),

                Commands::Schedule { on, view, worker, personal } =>
                    cmd_schedule(&db, on, view, worker, personal),

                Commands::Barn { action } => cmd_barn(&mut db, &db_path, action),

                Commands::Worker { action } => cmd_worker(&mut db, &db_path, action),

                Commands::Export { output, all } => cmd_export(&db, output, all),

                Commands::Import { input, no_backup } => cmd_import(&mut db, &db_path, input, no_backup),

                Commands::Backup => cmd_backup(&db_path),
            }
        }
    }
}
