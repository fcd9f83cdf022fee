//! Contractual hours expected on a given date.

use chrono::{Datelike, NaiveDate};

use crate::models::shift::ShiftId;
use crate::repositories::shift_catalog::ShiftCatalog;
use crate::services::holiday::{is_weekday, HolidayCalendar, PARTIAL_DAY_MONTH_DAY};

pub const FULL_DAY_HOURS: u32 = 8;
/// Expected hours on the partial day, independent of the holiday record.
pub const PARTIAL_DAY_HOURS: u32 = 5;

#[derive(Debug, Default, Clone, Copy)]
pub struct WorkHourRule {
    calendar: HolidayCalendar,
}

impl WorkHourRule {
    pub fn new(calendar: HolidayCalendar) -> Self {
        Self { calendar }
    }

    pub fn calendar(&self) -> &HolidayCalendar {
        &self.calendar
    }

    /// Always one of 0, 5 or 8. Half-day eves are not special-cased here.
    pub fn expected_hours(&self, date: NaiveDate) -> u32 {
        if self
            .calendar
            .holiday(date)
            .is_some_and(|holiday| holiday.kind.is_full_holiday())
        {
            return 0;
        }
        if (date.month(), date.day()) == PARTIAL_DAY_MONTH_DAY {
            return PARTIAL_DAY_HOURS;
        }
        if !is_weekday(date) {
            return 0;
        }
        FULL_DAY_HOURS
    }

    /// Like [`expected_hours`](Self::expected_hours), but a leave shift on a
    /// working day expects nothing.
    pub fn expected_hours_for_assignment(
        &self,
        date: NaiveDate,
        shift_id: &ShiftId,
        catalog: &ShiftCatalog,
    ) -> u32 {
        let base = self.expected_hours(date);
        if base > 0 && catalog.is_leave(shift_id) {
            0
        } else {
            base
        }
    }
}
