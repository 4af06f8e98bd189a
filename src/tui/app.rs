//! Main application logic for the terminal calendar interface.
//!
//! This module contains the `CalendarApp` struct which owns the only pieces
//! of UI state — the anchor date, the view mode and the viewer filter — and
//! recomputes the calendar from the task list on every frame. All grouping
//! and filtering goes through the pure functions in `calendar` and `roles`;
//! nothing here caches a computed calendar between frames.

use std::io;
use std::path::Path;
use std::time::Duration;

use chrono::{Datelike, Local, NaiveDate};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};

use crate::calendar::{build_calendar, date_key, step, CalendarDay};
use crate::db::{format_role, format_shift, format_status, format_task_type, truncate, Database};
use crate::fields::{Shift, ViewMode};
use crate::roster::Viewer;
use crate::tui::colors::{AFTERNOON_GREEN, MORNING_GOLD, NIGHT_PURPLE};
use crate::tui::enums::AppState;
use crate::tui::utils::centered_rect;

/// Main application state for the terminal calendar interface.
pub struct CalendarApp {
    state: AppState,
    db: Database,
    db_path: std::path::PathBuf,
    /// The date the calendar is centred on; also the selected day.
    anchor: NaiveDate,
    view_mode: ViewMode,
    viewer: Option<Viewer>,
    personal: bool,
    status_message: String,
}

impl CalendarApp {
    /// Create a new app instance, loading the database from the specified path.
    pub fn new(db_path: &Path, viewer: Option<Viewer>, personal: bool) -> io::Result<Self> {
        let db = Database::load(db_path);
        Ok(CalendarApp {
            state: AppState::Calendar,
            db,
            db_path: db_path.to_path_buf(),
            anchor: Local::now().date_naive(),
            view_mode: ViewMode::Month,
            viewer,
            personal,
            status_message: String::new(),
        })
    }

    /// Reload the database from disk.
    fn refresh(&mut self) {
        self.db = Database::load(&self.db_path);
        self.status_message = "Reloaded.".to_string();
    }

    /// Handle one input event. Returns true when the app should exit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if !event::poll(Duration::from_millis(200))? {
            return Ok(false);
        }
        let Event::Key(key) = event::read()? else {
            return Ok(false);
        };
        if key.kind != KeyEventKind::Press {
            return Ok(false);
        }

        match self.state {
            AppState::DayDetail | AppState::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                    self.state = AppState::Calendar;
                }
                Ok(false)
            }
            AppState::Calendar => self.handle_calendar_input(key.code),
        }
    }

    fn handle_calendar_input(&mut self, code: KeyCode) -> io::Result<bool> {
        self.status_message.clear();
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Left => self.anchor = step(self.anchor, ViewMode::Day, -1),
            KeyCode::Right => self.anchor = step(self.anchor, ViewMode::Day, 1),
            KeyCode::Up => self.anchor = step(self.anchor, ViewMode::Week, -1),
            KeyCode::Down => self.anchor = step(self.anchor, ViewMode::Week, 1),
            KeyCode::Char('b') | KeyCode::PageUp => {
                self.anchor = step(self.anchor, self.view_mode, -1);
            }
            KeyCode::Char('n') | KeyCode::PageDown => {
                self.anchor = step(self.anchor, self.view_mode, 1);
            }
            KeyCode::Char('t') => self.anchor = Local::now().date_naive(),
            KeyCode::Char('d') => self.view_mode = ViewMode::Day,
            KeyCode::Char('w') => self.view_mode = ViewMode::Week,
            KeyCode::Char('m') => self.view_mode = ViewMode::Month,
            KeyCode::Char('p') => {
                if self.viewer.is_some() {
                    self.personal = !self.personal;
                } else {
                    self.status_message = "No viewer set; launch with --worker for a personal view.".into();
                }
            }
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Enter => self.state = AppState::DayDetail,
            KeyCode::Char('?') => self.state = AppState::Help,
            _ => {}
        }
        Ok(false)
    }

    /// The calendar for the current anchor/view/viewer, computed fresh.
    fn current_days(&self) -> Vec<CalendarDay> {
        build_calendar(
            &self.db.tasks,
            self.anchor,
            self.view_mode,
            self.viewer.as_ref(),
            self.personal,
        )
    }

    fn view_color(&self) -> Color {
        match self.view_mode {
            ViewMode::Day => MORNING_GOLD,
            ViewMode::Week => AFTERNOON_GREEN,
            ViewMode::Month => NIGHT_PURPLE,
        }
    }

    fn shift_color(shift: Shift) -> Color {
        match shift {
            Shift::Morning => MORNING_GOLD,
            Shift::Afternoon => AFTERNOON_GREEN,
            Shift::Night => NIGHT_PURPLE,
        }
    }

    /// The context line shown in the header.
    fn context_line(&self) -> String {
        let period = match self.view_mode {
            ViewMode::Day => self.anchor.format("%A, %-d %B %Y").to_string(),
            ViewMode::Week => {
                let days = crate::calendar::generate_range(self.anchor, ViewMode::Week);
                format!("Week {} - {}", date_key(days[0]), date_key(days[6]))
            }
            ViewMode::Month => self.anchor.format("%B %Y").to_string(),
        };
        let who = match &self.viewer {
            None => "Team view".to_string(),
            Some(v) => {
                let name = self
                    .db
                    .worker(&v.id)
                    .map(|w| w.name.clone())
                    .unwrap_or_else(|| v.id.clone());
                let scope = if self.personal { "my schedule" } else { "team" };
                format!("{} ({}, {})", name, format_role(v.role), scope)
            }
        };
        format!("{}  |  {}", period, who)
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let header_text = vec![Line::from(vec![
            Span::styled("FARMHAND", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                self.context_line(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        ])];
        let header_block = Paragraph::new(header_text)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(header_block, area);
    }

    /// Render the month grid: one bordered cell per day, whole weeks only.
    fn render_month(&self, f: &mut Frame, area: Rect) {
        let days = self.current_days();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(area);

        let weekday_cells: Vec<Span> = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
            .iter()
            .map(|d| Span::styled(format!("{:^10}", d), Style::default().add_modifier(Modifier::BOLD)))
            .collect();
        f.render_widget(Paragraph::new(Line::from(weekday_cells)), chunks[0]);

        let week_count = days.len() / 7;
        let row_constraints: Vec<Constraint> =
            (0..week_count).map(|_| Constraint::Ratio(1, week_count as u32)).collect();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(row_constraints)
            .split(chunks[1]);

        for (week_idx, week) in days.chunks(7).enumerate() {
            let col_constraints: Vec<Constraint> = (0..7).map(|_| Constraint::Ratio(1, 7)).collect();
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(col_constraints)
                .split(rows[week_idx]);

            for (day_idx, day) in week.iter().enumerate() {
                self.render_month_cell(f, cols[day_idx], day);
            }
        }
    }

    fn render_month_cell(&self, f: &mut Frame, area: Rect, day: &CalendarDay) {
        let selected = day.date == self.anchor;
        let border_style = if day.is_today {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else if selected {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let text_style = if day.in_anchor_month {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let mut lines: Vec<Line> = Vec::new();
        for shift in Shift::ALL {
            let count = day.shifts.get(shift).len();
            if count > 0 {
                lines.push(Line::from(Span::styled(
                    format!("{} {}", count, format_shift(shift)),
                    Style::default().fg(Self::shift_color(shift)),
                )));
            }
        }

        let title = if selected {
            format!("[{:>2}]", day.date.day())
        } else {
            format!(" {:>2} ", day.date.day())
        };
        let cell = Paragraph::new(lines)
            .style(text_style)
            .block(Block::default().borders(Borders::ALL).border_style(border_style).title(title));
        f.render_widget(cell, area);
    }

    /// Render the week view: seven columns with shift lanes.
    fn render_week(&self, f: &mut Frame, area: Rect) {
        let days = self.current_days();
        let col_constraints: Vec<Constraint> = (0..7).map(|_| Constraint::Ratio(1, 7)).collect();
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(col_constraints)
            .split(area);

        for (idx, day) in days.iter().enumerate() {
            let selected = day.date == self.anchor;
            let border_style = if day.is_today {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if selected {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let title = format!("{} {}", day.date.format("%a"), day.date.day());

            let cell = Paragraph::new(day_lines(day, true))
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).border_style(border_style).title(title));
            f.render_widget(cell, cols[idx]);
        }
    }

    /// Render the single-day view: three shift sections.
    fn render_day(&self, f: &mut Frame, area: Rect) {
        let days = self.current_days();
        let day = &days[0];
        let title = format!(
            "{} ({}){}",
            date_key(day.date),
            day.date.format("%A"),
            if day.is_today { " - today" } else { "" }
        );
        let body = Paragraph::new(day_lines(day, false))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(body, area);
    }

    fn render_day_detail(&self, f: &mut Frame, area: Rect) {
        let popup = centered_rect(70, 70, area);
        f.render_widget(Clear, popup);

        let days = build_calendar(
            &self.db.tasks,
            self.anchor,
            ViewMode::Day,
            self.viewer.as_ref(),
            self.personal,
        );
        let day = &days[0];

        let mut lines: Vec<Line> = Vec::new();
        if day.shifts.is_empty() {
            lines.push(Line::from("No tasks scheduled."));
        }
        for shift in Shift::ALL {
            let bucket = day.shifts.get(shift);
            if bucket.is_empty() {
                continue;
            }
            lines.push(Line::from(Span::styled(
                format!("{} ({})", format_shift(shift), shift.hours()),
                Style::default()
                    .fg(Self::shift_color(shift))
                    .add_modifier(Modifier::BOLD),
            )));
            for t in bucket {
                lines.push(Line::from(format!(
                    "  {} {} - {} @ {} ({})",
                    t.id,
                    format_task_type(t.task_type),
                    t.worker_name,
                    t.barn_name,
                    format_status(t.status)
                )));
                if let Some(notes) = &t.notes {
                    lines.push(Line::from(Span::styled(
                        format!("      {}", truncate(notes, 60)),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
            }
            lines.push(Line::from(""));
        }

        let body = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("{} (Esc to close)", date_key(day.date))),
            );
        f.render_widget(body, popup);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let popup = centered_rect(60, 70, area);
        f.render_widget(Clear, popup);
        let lines = vec![
            Line::from("Navigation"),
            Line::from("  Left/Right   previous / next day"),
            Line::from("  Up/Down      previous / next week"),
            Line::from("  b / n        previous / next period (view-sized step)"),
            Line::from("  t            jump to today"),
            Line::from(""),
            Line::from("Views"),
            Line::from("  d / w / m    day / week / month view"),
            Line::from("  p            toggle personal / team view"),
            Line::from("  Enter        day detail"),
            Line::from(""),
            Line::from("Other"),
            Line::from("  r            reload from disk"),
            Line::from("  q            quit"),
        ];
        let body = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Help (Esc to close)"));
        f.render_widget(body, popup);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            "Arrows move | b/n step | t today | d/w/m views | p personal | Enter detail | ? help | q quit"
                .to_string()
        };
        let bg = self.view_color();
        let fg = match bg {
            MORNING_GOLD => Color::Rgb(20, 20, 20),
            _ => Color::White,
        };
        let status = Paragraph::new(status_text)
            .style(Style::default().bg(bg).fg(fg))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Main render function that dispatches to the current view.
    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)].as_ref())
            .split(f.area());

        self.render_header(f, chunks[0]);

        match self.view_mode {
            ViewMode::Month => self.render_month(f, chunks[1]),
            ViewMode::Week => self.render_week(f, chunks[1]),
            ViewMode::Day => self.render_day(f, chunks[1]),
        }

        match self.state {
            AppState::DayDetail => self.render_day_detail(f, chunks[1]),
            AppState::Help => self.render_help(f, chunks[1]),
            AppState::Calendar => {}
        }

        self.render_status_bar(f, chunks[2]);
    }

    /// Main event loop for the TUI application.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

/// Build the text lines for one day's shift lanes.
///
/// `compact` drops worker names so the week columns fit.
fn day_lines(day: &CalendarDay, compact: bool) -> Vec<Line<'static>> {
    let mut lines: Vec<Line> = Vec::new();
    for shift in Shift::ALL {
        let bucket = day.shifts.get(shift);
        lines.push(Line::from(Span::styled(
            format_shift(shift).to_string(),
            Style::default()
                .fg(CalendarApp::shift_color(shift))
                .add_modifier(Modifier::BOLD),
        )));
        if bucket.is_empty() {
            lines.push(Line::from(Span::styled("  -", Style::default().fg(Color::DarkGray))));
        }
        for t in bucket {
            let text = if compact {
                format!("  {}", format_task_type(t.task_type))
            } else {
                format!(
                    "  {} {} - {} @ {} ({})",
                    t.id,
                    format_task_type(t.task_type),
                    t.worker_name,
                    t.barn_name,
                    format_status(t.status)
                )
            };
            lines.push(Line::from(text));
        }
    }
    lines
}
