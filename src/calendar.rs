//! Pure calendar view-model for the schedule views.
//!
//! Everything in this module is a pure function over plain values: given a
//! task list, an anchor date, a view mode and a viewer, it produces the
//! render-ready day/week/month structure. The UI layer owns the
//! `(anchor, view mode)` pair and recomputes the calendar on every
//! transition; nothing here reads ambient state or performs I/O.
//!
//! Date policy: all dates are local-time `NaiveDate` values and the one
//! canonical string form is `date_key` (`YYYY-MM-DD`, zero-padded). No UTC
//! conversion happens anywhere on this path, so a task scheduled for a day
//! always lands on that day regardless of the viewer's UTC offset.

use chrono::{Datelike, Duration, Local, Months, NaiveDate};

use crate::fields::{Shift, ViewMode};
use crate::roles::visible_tasks;
use crate::roster::Viewer;
use crate::task::Task;

/// A day's tasks bucketed into the three fixed shifts.
///
/// All three buckets are always present, even when empty, and each preserves
/// the order tasks arrived in (stable partition).
#[derive(Debug, Default)]
pub struct ShiftBuckets<'a> {
    pub morning: Vec<&'a Task>,
    pub afternoon: Vec<&'a Task>,
    pub night: Vec<&'a Task>,
}

impl<'a> ShiftBuckets<'a> {
    /// The bucket for a given shift.
    pub fn get(&self, shift: Shift) -> &[&'a Task] {
        match shift {
            Shift::Morning => &self.morning,
            Shift::Afternoon => &self.afternoon,
            Shift::Night => &self.night,
        }
    }

    /// Total number of tasks across all three shifts.
    pub fn len(&self) -> usize {
        self.morning.len() + self.afternoon.len() + self.night.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One cell of the rendered calendar.
#[derive(Debug)]
pub struct CalendarDay<'a> {
    pub date: NaiveDate,
    /// False for the grid-padding days that belong to a neighbouring month.
    pub in_anchor_month: bool,
    pub is_today: bool,
    pub shifts: ShiftBuckets<'a>,
}

/// The Sunday on or before `date`. The calendar week runs Sunday to Saturday.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// Generate the ordered list of dates a view displays.
///
/// - `Day`: just the anchor.
/// - `Week`: the 7 days of the anchor's Sunday-to-Saturday week.
/// - `Month`: whole weeks covering the anchor's month, from the Sunday on or
///   before the 1st through the Saturday on or after the last day, so the
///   grid never has a partial row. Padding days from neighbouring months are
///   included; `is_same_month` tells them apart.
pub fn generate_range(anchor: NaiveDate, mode: ViewMode) -> Vec<NaiveDate> {
    match mode {
        ViewMode::Day => vec![anchor],
        ViewMode::Week => {
            let start = week_start(anchor);
            (0..7).map(|i| start + Duration::days(i)).collect()
        }
        ViewMode::Month => {
            let first = anchor.with_day(1).expect("day 1 exists in every month");
            let start = week_start(first);
            let last = last_day_of_month(anchor);
            let end = last + Duration::days(6 - last.weekday().num_days_from_sunday() as i64);
            let days = (end - start).num_days() + 1;
            (0..days).map(|i| start + Duration::days(i)).collect()
        }
    }
}

/// The last calendar day of `date`'s month.
pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let first = date.with_day(1).expect("day 1 exists in every month");
    first + Months::new(1) - Duration::days(1)
}

/// Step the anchor date backwards or forwards by one view unit.
///
/// Month mode moves by a calendar month (chrono clamps the day-of-month at
/// the target month's end, so Jan 31 steps to Feb 28); week mode moves by
/// exactly 7 days; day mode by 1 day. `direction` is negative for back,
/// positive for forward; zero is a no-op.
pub fn step(current: NaiveDate, mode: ViewMode, direction: i32) -> NaiveDate {
    if direction == 0 {
        return current;
    }
    let forward = direction > 0;
    match mode {
        ViewMode::Day => current + Duration::days(if forward { 1 } else { -1 }),
        ViewMode::Week => current + Duration::days(if forward { 7 } else { -7 }),
        ViewMode::Month => {
            if forward {
                current + Months::new(1)
            } else {
                current - Months::new(1)
            }
        }
    }
}

/// Bucket a day's tasks into the three shifts, preserving input order.
pub fn partition_by_shift<'a>(tasks: &[&'a Task]) -> ShiftBuckets<'a> {
    let mut buckets = ShiftBuckets::default();
    for &task in tasks {
        match task.shift {
            Shift::Morning => buckets.morning.push(task),
            Shift::Afternoon => buckets.afternoon.push(task),
            Shift::Night => buckets.night.push(task),
        }
    }
    buckets
}

/// Whether `date` is the local calendar date right now.
pub fn is_today(date: NaiveDate) -> bool {
    date == Local::now().date_naive()
}

/// Whether `date` falls in the same year and month as `anchor`.
pub fn is_same_month(date: NaiveDate, anchor: NaiveDate) -> bool {
    date.year() == anchor.year() && date.month() == anchor.month()
}

/// The canonical `YYYY-MM-DD` key for a date, zero-padded, local time.
///
/// This is the join key between calendar dates and stored task dates; every
/// code path that needs a date string goes through here.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Build the render-ready calendar for one view.
///
/// Applies the role filter (and, when `personal`, the ownership filter) once
/// up front, then groups what is left by day and shift. With no viewer the
/// full task list is shown.
pub fn build_calendar<'a>(
    tasks: &'a [Task],
    anchor: NaiveDate,
    mode: ViewMode,
    viewer: Option<&Viewer>,
    personal: bool,
) -> Vec<CalendarDay<'a>> {
    let visible: Vec<&Task> = match viewer {
        Some(v) => visible_tasks(tasks, v, personal),
        None => tasks.iter().collect(),
    };

    generate_range(anchor, mode)
        .into_iter()
        .map(|date| {
            let day_tasks: Vec<&Task> = visible.iter().copied().filter(|t| t.date == date).collect();
            CalendarDay {
                date,
                in_anchor_month: is_same_month(date, anchor),
                is_today: is_today(date),
                shifts: partition_by_shift(&day_tasks),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{Role, Status, TaskType};
    use chrono::Weekday;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn task(id: &str, date: NaiveDate, shift: Shift, task_type: TaskType, worker_id: &str) -> Task {
        Task {
            id: id.to_string(),
            date,
            shift,
            barn_id: "B1".into(),
            barn_name: "Barn 1".into(),
            worker_id: worker_id.to_string(),
            worker_name: worker_id.to_string(),
            task_type,
            status: Status::Pending,
            notes: None,
            created_at_utc: 0,
            updated_at_utc: 0,
        }
    }

    #[test]
    fn test_week_start_is_sunday_on_or_before() {
        // 2025-11-20 is a Thursday.
        assert_eq!(week_start(d(2025, 11, 20)), d(2025, 11, 16));
        // A Sunday is its own week start.
        assert_eq!(week_start(d(2025, 11, 16)), d(2025, 11, 16));
        // A Saturday belongs to the week that started six days earlier.
        assert_eq!(week_start(d(2025, 11, 22)), d(2025, 11, 16));
    }

    #[test]
    fn test_day_range_is_just_the_anchor() {
        assert_eq!(generate_range(d(2025, 11, 20), ViewMode::Day), vec![d(2025, 11, 20)]);
    }

    #[test]
    fn test_week_range_is_sunday_through_saturday() {
        let range = generate_range(d(2025, 11, 20), ViewMode::Week);
        assert_eq!(range.len(), 7);
        assert_eq!(range[0], d(2025, 11, 16));
        assert_eq!(range[6], d(2025, 11, 22));
        assert_eq!(range[0].weekday(), Weekday::Sun);
        for pair in range.windows(2) {
            assert_eq!((pair[1] - pair[0]).num_days(), 1);
        }
    }

    #[test]
    fn test_month_range_is_whole_weeks_covering_the_month() {
        let range = generate_range(d(2025, 11, 20), ViewMode::Month);
        assert_eq!(range.len() % 7, 0);
        assert_eq!(range.first().unwrap().weekday(), Weekday::Sun);
        assert_eq!(range.last().unwrap().weekday(), Weekday::Sat);
        // Every day of November 2025 is present.
        for day in 1..=30 {
            assert!(range.contains(&d(2025, 11, day)));
        }
        // November 2025 starts on a Saturday, so the grid starts in October.
        assert_eq!(*range.first().unwrap(), d(2025, 10, 26));
        assert!(!is_same_month(range[0], d(2025, 11, 20)));
    }

    #[test]
    fn test_month_range_february_leap_year() {
        // February 2026 starts on a Sunday; 28 days ending Saturday = exactly
        // four rows with no padding at all.
        let range = generate_range(d(2026, 2, 10), ViewMode::Month);
        assert_eq!(range.len(), 28);
        assert!(range.iter().all(|&day| is_same_month(day, d(2026, 2, 10))));

        // February 2024 (leap year) needs padding on both sides.
        let range = generate_range(d(2024, 2, 15), ViewMode::Month);
        assert_eq!(range.len() % 7, 0);
        assert!(range.contains(&d(2024, 2, 29)));
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(d(2025, 11, 20)), d(2025, 11, 30));
        assert_eq!(last_day_of_month(d(2024, 2, 1)), d(2024, 2, 29));
        assert_eq!(last_day_of_month(d(2025, 12, 31)), d(2025, 12, 31));
    }

    #[test]
    fn test_step_day_and_week() {
        assert_eq!(step(d(2025, 11, 20), ViewMode::Day, 1), d(2025, 11, 21));
        assert_eq!(step(d(2025, 11, 20), ViewMode::Day, -1), d(2025, 11, 19));
        assert_eq!(step(d(2025, 11, 20), ViewMode::Week, 1), d(2025, 11, 27));
        assert_eq!(step(d(2025, 11, 2), ViewMode::Week, -1), d(2025, 10, 26));
    }

    #[test]
    fn test_step_month_handles_rollover_and_clamping() {
        assert_eq!(step(d(2025, 12, 15), ViewMode::Month, 1), d(2026, 1, 15));
        assert_eq!(step(d(2026, 1, 15), ViewMode::Month, -1), d(2025, 12, 15));
        // Day-of-month clamps at the shorter month's end.
        assert_eq!(step(d(2025, 1, 31), ViewMode::Month, 1), d(2025, 2, 28));
        assert_eq!(step(d(2025, 3, 31), ViewMode::Month, -1), d(2025, 2, 28));
    }

    #[test]
    fn test_step_month_twelve_times_is_one_year() {
        let mut date = d(2025, 11, 20);
        for _ in 0..12 {
            date = step(date, ViewMode::Month, 1);
        }
        assert_eq!(date, d(2026, 11, 20));
    }

    #[test]
    fn test_step_zero_direction_is_identity() {
        assert_eq!(step(d(2025, 11, 20), ViewMode::Month, 0), d(2025, 11, 20));
    }

    #[test]
    fn test_partition_is_stable_and_exhaustive() {
        let day = d(2025, 11, 20);
        let tasks = vec![
            task("T1", day, Shift::Night, TaskType::Monitoring, "W1"),
            task("T2", day, Shift::Morning, TaskType::Feeding, "W1"),
            task("T3", day, Shift::Morning, TaskType::Cleaning, "W2"),
            task("T4", day, Shift::Afternoon, TaskType::Feeding, "W2"),
        ];
        let refs: Vec<&Task> = tasks.iter().collect();
        let buckets = partition_by_shift(&refs);

        assert_eq!(
            buckets.morning.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
            vec!["T2", "T3"]
        );
        assert_eq!(buckets.afternoon.len(), 1);
        assert_eq!(buckets.night.len(), 1);
        // Union of the buckets equals the input.
        assert_eq!(buckets.len(), tasks.len());
    }

    #[test]
    fn test_partition_always_has_three_buckets() {
        let buckets = partition_by_shift(&[]);
        assert!(buckets.get(Shift::Morning).is_empty());
        assert!(buckets.get(Shift::Afternoon).is_empty());
        assert!(buckets.get(Shift::Night).is_empty());
        assert!(buckets.is_empty());
    }

    #[test]
    fn test_is_today() {
        assert!(is_today(Local::now().date_naive()));
        assert!(!is_today(d(2020, 1, 1)));
    }

    #[test]
    fn test_date_key_zero_pads() {
        assert_eq!(date_key(d(2025, 1, 5)), "2025-01-05");
        assert_eq!(date_key(d(2025, 11, 20)), "2025-11-20");
    }

    #[test]
    fn test_date_key_inverts_parse() {
        for (y, m, day) in [(2025, 1, 1), (2024, 2, 29), (1999, 12, 31), (2025, 11, 20)] {
            let date = d(y, m, day);
            let key = date_key(date);
            assert_eq!(NaiveDate::parse_from_str(&key, "%Y-%m-%d").unwrap(), date);
        }
    }

    #[test]
    fn test_build_calendar_personal_week_view() {
        let tasks = vec![
            task("T1", d(2025, 11, 20), Shift::Morning, TaskType::Feeding, "W1"),
            task("T2", d(2025, 11, 20), Shift::Night, TaskType::Vaccination, "W2"),
            task("T3", d(2025, 11, 25), Shift::Morning, TaskType::Feeding, "W1"),
        ];
        let viewer = Viewer::new("W1", Role::Employee);
        let days = build_calendar(&tasks, d(2025, 11, 20), ViewMode::Week, Some(&viewer), true);

        assert_eq!(days.len(), 7);
        // Thursday cell holds only the viewer's own feeding task; the other
        // worker's vaccination task is outside the employee role anyway.
        let thursday = days.iter().find(|c| c.date == d(2025, 11, 20)).unwrap();
        assert_eq!(thursday.shifts.len(), 1);
        assert_eq!(thursday.shifts.morning[0].id, "T1");
        // T3 falls outside this week.
        assert!(days.iter().all(|c| c.date != d(2025, 11, 25)));
    }

    #[test]
    fn test_build_calendar_month_flags_padding_days() {
        let days = build_calendar(&[], d(2025, 11, 20), ViewMode::Month, None, false);
        assert_eq!(days.len() % 7, 0);
        assert!(!days[0].in_anchor_month);
        assert!(days.iter().any(|c| c.in_anchor_month));
        assert!(days.iter().filter(|c| c.in_anchor_month).count() == 30);
    }

    #[test]
    fn test_build_calendar_without_viewer_shows_everything() {
        let tasks = vec![
            task("T1", d(2025, 11, 20), Shift::Morning, TaskType::Feeding, "W1"),
            task("T2", d(2025, 11, 20), Shift::Morning, TaskType::Vaccination, "W2"),
        ];
        let days = build_calendar(&tasks, d(2025, 11, 20), ViewMode::Day, None, false);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].shifts.morning.len(), 2);
    }
}
