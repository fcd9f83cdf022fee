use crate::models::{holiday::Holiday, shift::ShiftId};
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::AddAssign;

/// Tally per day of week, indexed Monday first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayCounts([u32; 7]);

impl WeekdayCounts {
    pub fn record(&mut self, weekday: Weekday) {
        self.0[weekday.num_days_from_monday() as usize] += 1;
    }

    pub fn get(&self, weekday: Weekday) -> u32 {
        self.0[weekday.num_days_from_monday() as usize]
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    pub fn as_array(&self) -> [u32; 7] {
        self.0
    }
}

impl AddAssign for WeekdayCounts {
    fn add_assign(&mut self, rhs: Self) {
        for (slot, value) in self.0.iter_mut().zip(rhs.0) {
            *slot += value;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub worked_hours: u32,
    pub expected_hours: u32,
    pub overtime_hours: u32,
    pub shortfall_hours: u32,
    pub days_in_month: u32,
    pub weekend_days: u32,
    pub working_days: u32,
    pub assigned_days: u32,
    pub shift_counts: BTreeMap<ShiftId, u32>,
    pub weekday_counts: WeekdayCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlySummary {
    pub year: i32,
    pub worked_hours: u32,
    pub expected_hours: u32,
    pub overtime_hours: u32,
    pub shortfall_hours: u32,
    pub working_days: u32,
    pub assigned_days: u32,
    pub shift_counts: BTreeMap<ShiftId, u32>,
    pub weekday_counts: WeekdayCounts,
    /// Morning assignments per weekday.
    pub day_shifts_by_weekday: WeekdayCounts,
    /// Night and full-day assignments per weekday.
    pub night_or_full_by_weekday: WeekdayCounts,
    pub months: Vec<MonthlySummary>,
}

/// Everything the report collaborator needs for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub summary: MonthlySummary,
    pub holidays: Vec<Holiday>,
    pub special_rule_days: Vec<NaiveDate>,
}
