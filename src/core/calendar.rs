//! Academic calendar computation.
//!
//! Expands a semester window into the ordered list of working days, skipping
//! Sundays, holidays, and exam ranges (both endpoints of an exam range
//! count). Weeks are whole groups of `days_per_week` working days.

use crate::core::models::{ExamRange, Holiday, SemesterWindow};
use crate::warn;
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::HashSet;

/// The working-day calendar of one semester
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcademicCalendar {
    /// Working days in chronological order
    pub working_dates: Vec<NaiveDate>,

    /// Teaching days per week
    pub days_per_week: u32,

    /// Teaching periods per day
    pub periods_per_day: u32,
}

impl AcademicCalendar {
    /// Compute the calendar for a semester window.
    ///
    /// An inverted window (start after end) yields zero working days with a
    /// warning; it never aborts.
    #[must_use]
    pub fn compute(
        window: &SemesterWindow,
        holidays: &[Holiday],
        exam_ranges: &[ExamRange],
        days_per_week: u32,
        periods_per_day: u32,
    ) -> Self {
        let mut exam_days: HashSet<NaiveDate> = HashSet::new();
        for range in exam_ranges {
            let mut cur = range.start_date;
            while cur <= range.end_date {
                exam_days.insert(cur);
                match cur.succ_opt() {
                    Some(next) => cur = next,
                    None => break,
                }
            }
        }

        let holiday_days: HashSet<NaiveDate> =
            holidays.iter().map(|h| h.holiday_date).collect();

        if window.start_date > window.end_date {
            warn!(
                "semester '{}' window is inverted ({} > {}); 0 working days",
                window.id, window.start_date, window.end_date
            );
            return Self {
                working_dates: Vec::new(),
                days_per_week,
                periods_per_day,
            };
        }

        let mut working_dates = Vec::new();
        let mut cur = window.start_date;
        while cur <= window.end_date {
            if cur.weekday() != Weekday::Sun
                && !holiday_days.contains(&cur)
                && !exam_days.contains(&cur)
            {
                working_dates.push(cur);
            }
            match cur.succ_opt() {
                Some(next) => cur = next,
                None => break,
            }
        }

        Self {
            working_dates,
            days_per_week,
            periods_per_day,
        }
    }

    /// Number of working days in the semester
    #[must_use]
    pub fn working_days(&self) -> u32 {
        u32::try_from(self.working_dates.len()).unwrap_or(u32::MAX)
    }

    /// Number of whole teaching weeks
    #[must_use]
    pub fn total_weeks(&self) -> u32 {
        if self.days_per_week == 0 {
            0
        } else {
            self.working_days() / self.days_per_week
        }
    }

    /// Total schedulable periods across the semester
    #[must_use]
    pub fn total_periods(&self) -> u32 {
        self.working_days() * self.periods_per_day
    }

    /// Weeks to model; falls back to `default_weeks` when the calendar
    /// yielded none
    #[must_use]
    pub fn weeks_or_default(&self, default_weeks: u32) -> u32 {
        let weeks = self.total_weeks();
        if weeks == 0 {
            warn!(
                "calendar yielded no whole weeks; falling back to {default_weeks}"
            );
            default_weeks
        } else {
            weeks
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(start: &str, end: &str) -> SemesterWindow {
        SemesterWindow {
            id: "3-2".to_string(),
            name: "Test Semester".to_string(),
            start_date: start.parse().expect("start date"),
            end_date: end.parse().expect("end date"),
            total_hours: 0,
        }
    }

    #[test]
    fn skips_sundays() {
        // 2025-01-06 is a Monday; one full Mon-Sun span
        let calendar = AcademicCalendar::compute(&window("2025-01-06", "2025-01-12"), &[], &[], 6, 8);
        assert_eq!(calendar.working_days(), 6);
        assert_eq!(calendar.total_weeks(), 1);
        assert_eq!(calendar.total_periods(), 48);
    }

    #[test]
    fn skips_holidays() {
        let holidays = vec![Holiday {
            holiday_date: "2025-01-08".parse().expect("date"),
            description: "Festival".to_string(),
        }];
        let calendar =
            AcademicCalendar::compute(&window("2025-01-06", "2025-01-12"), &holidays, &[], 6, 8);
        assert_eq!(calendar.working_days(), 5);
        assert_eq!(calendar.total_weeks(), 0);
    }

    #[test]
    fn exam_ranges_are_inclusive() {
        let exams = vec![ExamRange {
            id: "mid-1".to_string(),
            semester_id: "3-2".to_string(),
            start_date: "2025-01-07".parse().expect("date"),
            end_date: "2025-01-09".parse().expect("date"),
        }];
        let calendar =
            AcademicCalendar::compute(&window("2025-01-06", "2025-01-12"), &[], &exams, 6, 8);
        // Mon, Fri, Sat remain (Tue/Wed/Thu are exams, Sun skipped)
        assert_eq!(calendar.working_days(), 3);
        assert_eq!(
            calendar.working_dates,
            vec![
                "2025-01-06".parse::<NaiveDate>().expect("date"),
                "2025-01-10".parse::<NaiveDate>().expect("date"),
                "2025-01-11".parse::<NaiveDate>().expect("date"),
            ]
        );
    }

    #[test]
    fn inverted_window_yields_zero_days() {
        let calendar = AcademicCalendar::compute(&window("2025-05-10", "2025-01-06"), &[], &[], 6, 8);
        assert_eq!(calendar.working_days(), 0);
        assert_eq!(calendar.total_periods(), 0);
    }

    #[test]
    fn falls_back_to_default_weeks() {
        let calendar = AcademicCalendar::compute(&window("2025-05-10", "2025-01-06"), &[], &[], 6, 8);
        assert_eq!(calendar.weeks_or_default(19), 19);

        let full = AcademicCalendar::compute(&window("2025-01-06", "2025-01-12"), &[], &[], 6, 8);
        assert_eq!(full.weeks_or_default(19), 1);
    }
}
