//! Monthly and yearly hour aggregates.
//!
//! Everything here is recomputed from a borrowed snapshot of the schedule on
//! every call. Expected hours follow a flat Monday to Friday, eight hours per
//! day baseline; holidays on weekdays still count toward it.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::error::{EngineError, EngineResult};
use crate::models::shift::{BuiltinShift, ShiftId};
use crate::models::summary::{MonthlySummary, WeekdayCounts, YearlySummary};
use crate::repositories::shift_catalog::ShiftCatalog;
use crate::services::holiday::is_weekday;
use crate::services::work_hours::FULL_DAY_HOURS;
use crate::utils::time::{days_in_month, days_of_month, month_bounds};

pub struct OvertimeCalculator<'a> {
    assignments: &'a BTreeMap<NaiveDate, ShiftId>,
    catalog: &'a ShiftCatalog,
}

impl<'a> OvertimeCalculator<'a> {
    pub fn new(assignments: &'a BTreeMap<NaiveDate, ShiftId>, catalog: &'a ShiftCatalog) -> Self {
        Self {
            assignments,
            catalog,
        }
    }

    fn month_assignments(
        &self,
        year: i32,
        month: u32,
    ) -> impl Iterator<Item = (&'a NaiveDate, &'a ShiftId)> + 'a {
        let range = month_bounds(year, month);
        let assignments = self.assignments;
        range
            .into_iter()
            .flat_map(move |(start, next)| assignments.range(start..next))
    }

    /// Raw shift hours, not adjusted for holidays.
    pub fn monthly_total(&self, year: i32, month: u32) -> u32 {
        self.month_assignments(year, month)
            .map(|(_, shift_id)| self.catalog.hours_of(shift_id))
            .sum()
    }

    pub fn monthly_expected(&self, year: i32, month: u32) -> u32 {
        days_of_month(year, month)
            .into_iter()
            .filter(|day| is_weekday(*day))
            .count() as u32
            * FULL_DAY_HOURS
    }

    pub fn weekend_days(&self, year: i32, month: u32) -> u32 {
        days_of_month(year, month)
            .into_iter()
            .filter(|day| !is_weekday(*day))
            .count() as u32
    }

    pub fn working_days(&self, year: i32, month: u32) -> u32 {
        days_in_month(year, month) - self.weekend_days(year, month)
    }

    pub fn shift_counts(&self, year: i32, month: u32) -> BTreeMap<ShiftId, u32> {
        let mut counts = BTreeMap::new();
        for (_, shift_id) in self.month_assignments(year, month) {
            *counts.entry(*shift_id).or_insert(0) += 1;
        }
        counts
    }

    pub fn weekday_counts(&self, year: i32, month: u32) -> WeekdayCounts {
        let mut counts = WeekdayCounts::default();
        for (date, _) in self.month_assignments(year, month) {
            counts.record(date.weekday());
        }
        counts
    }

    pub fn monthly_summary(&self, year: i32, month: u32) -> EngineResult<MonthlySummary> {
        if month_bounds(year, month).is_none() {
            return Err(EngineError::InvalidMonth { year, month });
        }

        let worked_hours = self.monthly_total(year, month);
        let expected_hours = self.monthly_expected(year, month);
        let days_in_month = days_in_month(year, month);
        let weekend_days = self.weekend_days(year, month);

        Ok(MonthlySummary {
            year,
            month,
            worked_hours,
            expected_hours,
            overtime_hours: worked_hours.saturating_sub(expected_hours),
            shortfall_hours: expected_hours.saturating_sub(worked_hours),
            days_in_month,
            weekend_days,
            working_days: days_in_month - weekend_days,
            assigned_days: self.month_assignments(year, month).count() as u32,
            shift_counts: self.shift_counts(year, month),
            weekday_counts: self.weekday_counts(year, month),
        })
    }

    /// Field-wise sum of the twelve months. Overtime and shortfall are summed
    /// per month, so a year can carry both.
    pub fn yearly_summary(&self, year: i32) -> EngineResult<YearlySummary> {
        let mut summary = YearlySummary {
            year,
            worked_hours: 0,
            expected_hours: 0,
            overtime_hours: 0,
            shortfall_hours: 0,
            working_days: 0,
            assigned_days: 0,
            shift_counts: BTreeMap::new(),
            weekday_counts: WeekdayCounts::default(),
            day_shifts_by_weekday: WeekdayCounts::default(),
            night_or_full_by_weekday: WeekdayCounts::default(),
            months: Vec::with_capacity(12),
        };

        for month in 1..=12 {
            let monthly = self.monthly_summary(year, month)?;
            summary.worked_hours += monthly.worked_hours;
            summary.expected_hours += monthly.expected_hours;
            summary.overtime_hours += monthly.overtime_hours;
            summary.shortfall_hours += monthly.shortfall_hours;
            summary.working_days += monthly.working_days;
            summary.assigned_days += monthly.assigned_days;
            for (shift_id, count) in &monthly.shift_counts {
                *summary.shift_counts.entry(*shift_id).or_insert(0) += count;
            }
            summary.weekday_counts += monthly.weekday_counts;

            for (date, shift_id) in self.month_assignments(year, month) {
                match shift_id.builtin() {
                    Some(BuiltinShift::Morning) => {
                        summary.day_shifts_by_weekday.record(date.weekday())
                    }
                    Some(BuiltinShift::Night | BuiltinShift::Full) => {
                        summary.night_or_full_by_weekday.record(date.weekday())
                    }
                    None => {}
                }
            }
            summary.months.push(monthly);
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn expected_baseline_ignores_holidays() {
        // May 2025: 22 weekdays, including the May 1 and May 19 holidays.
        let assignments = BTreeMap::new();
        let catalog = ShiftCatalog::default();
        let calc = OvertimeCalculator::new(&assignments, &catalog);

        assert_eq!(calc.monthly_expected(2025, 5), 176);
        assert_eq!(calc.weekend_days(2025, 5), 9);
        assert_eq!(calc.working_days(2025, 5), 22);
    }

    #[test]
    fn worked_hours_use_raw_shift_hours() {
        // 2025-10-28 is a partial day but the morning shift still counts 8.
        let assignments = BTreeMap::from([
            (date(2025, 10, 28), ShiftId::MORNING),
            (date(2025, 10, 29), ShiftId::FULL),
        ]);
        let catalog = ShiftCatalog::default();
        let calc = OvertimeCalculator::new(&assignments, &catalog);

        assert_eq!(calc.monthly_total(2025, 10), 32);
    }

    #[test]
    fn assignments_outside_the_month_are_ignored() {
        let assignments = BTreeMap::from([
            (date(2025, 2, 28), ShiftId::MORNING),
            (date(2025, 3, 1), ShiftId::NIGHT),
            (date(2025, 4, 1), ShiftId::FULL),
        ]);
        let catalog = ShiftCatalog::default();
        let calc = OvertimeCalculator::new(&assignments, &catalog);

        assert_eq!(calc.monthly_total(2025, 3), 16);
        assert_eq!(calc.shift_counts(2025, 3), BTreeMap::from([(ShiftId::NIGHT, 1)]));
    }

    #[test]
    fn unknown_custom_shift_counts_zero_hours() {
        let mut catalog = ShiftCatalog::default();
        let removed = catalog.add("Temp".into(), 6, "#000000".into());
        catalog.remove(&removed);
        let assignments = BTreeMap::from([(date(2025, 3, 3), removed)]);
        let calc = OvertimeCalculator::new(&assignments, &catalog);

        assert_eq!(calc.monthly_total(2025, 3), 0);
        assert_eq!(calc.shift_counts(2025, 3)[&removed], 1);
    }

    #[test]
    fn weekday_counts_bucket_by_day_of_week() {
        // 2025-03-03 and 2025-03-10 are Mondays, 2025-03-08 a Saturday.
        let assignments = BTreeMap::from([
            (date(2025, 3, 3), ShiftId::MORNING),
            (date(2025, 3, 8), ShiftId::NIGHT),
            (date(2025, 3, 10), ShiftId::FULL),
        ]);
        let catalog = ShiftCatalog::default();
        let counts = OvertimeCalculator::new(&assignments, &catalog).weekday_counts(2025, 3);

        assert_eq!(counts.get(Weekday::Mon), 2);
        assert_eq!(counts.get(Weekday::Sat), 1);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn invalid_month_is_rejected() {
        let assignments = BTreeMap::new();
        let catalog = ShiftCatalog::default();
        let calc = OvertimeCalculator::new(&assignments, &catalog);

        assert!(matches!(
            calc.monthly_summary(2025, 13),
            Err(EngineError::InvalidMonth { year: 2025, month: 13 })
        ));
    }

    #[test]
    fn yearly_distributions_split_day_and_night_shifts() {
        let mut catalog = ShiftCatalog::default();
        let custom = catalog.add("Split".into(), 4, "#123456".into());
        // 2025-01-06 Monday, 2025-06-07 Saturday, 2025-09-10 Wednesday.
        let assignments = BTreeMap::from([
            (date(2025, 1, 6), ShiftId::MORNING),
            (date(2025, 6, 7), ShiftId::NIGHT),
            (date(2025, 9, 10), ShiftId::FULL),
            (date(2025, 9, 11), custom),
        ]);
        let yearly = OvertimeCalculator::new(&assignments, &catalog)
            .yearly_summary(2025)
            .unwrap();

        assert_eq!(yearly.day_shifts_by_weekday.as_array(), [1, 0, 0, 0, 0, 0, 0]);
        assert_eq!(yearly.night_or_full_by_weekday.as_array(), [0, 0, 1, 0, 0, 1, 0]);
        assert_eq!(yearly.weekday_counts.total(), 4);
        assert_eq!(yearly.worked_hours, 8 + 16 + 24 + 4);
        assert_eq!(yearly.months.len(), 12);
    }
}
