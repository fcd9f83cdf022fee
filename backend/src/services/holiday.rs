//! Statutory holiday calendar.
//!
//! Holidays are derived, never stored: each call regenerates the year from the
//! fixed-date table, the lunar religious table, the eve rule and the single
//! partial-day exception, then stable-sorts by date. Dates are not
//! de-duplicated, so lookups use first-match semantics.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::models::holiday::{Holiday, HolidayKind};

struct FixedHoliday {
    month: u32,
    day: u32,
    name: &'static str,
}

const FIXED_HOLIDAYS: &[FixedHoliday] = &[
    FixedHoliday {
        month: 1,
        day: 1,
        name: "New Year's Day",
    },
    FixedHoliday {
        month: 4,
        day: 23,
        name: "National Sovereignty and Children's Day",
    },
    FixedHoliday {
        month: 5,
        day: 1,
        name: "Labour and Solidarity Day",
    },
    FixedHoliday {
        month: 5,
        day: 19,
        name: "Commemoration of Atatürk, Youth and Sports Day",
    },
    FixedHoliday {
        month: 7,
        day: 15,
        name: "Democracy and National Unity Day",
    },
    FixedHoliday {
        month: 8,
        day: 30,
        name: "Victory Day",
    },
    FixedHoliday {
        month: 10,
        day: 29,
        name: "Republic Day",
    },
];

/// The eve rule never applies to this holiday.
const NO_EVE_MONTH_DAY: (u32, u32) = (8, 30);

/// The afternoon before Republic Day.
pub const PARTIAL_DAY_MONTH_DAY: (u32, u32) = (10, 28);
const PARTIAL_DAY_NAME: &str = "Republic Day Eve (afternoon off)";

/// A contiguous run of religious holiday days starting on `(month, day)`.
struct ReligiousRun {
    name: &'static str,
    month: u32,
    day: u32,
    days: u32,
}

const RAMADAN_FEAST: &str = "Ramadan Feast";
const SACRIFICE_FEAST: &str = "Feast of Sacrifice";

/// Lunar-calendar dates as announced per year. Must be extended yearly; a
/// missing year simply has no religious holidays.
fn religious_runs(year: i32) -> &'static [ReligiousRun] {
    const fn run(name: &'static str, month: u32, day: u32, days: u32) -> ReligiousRun {
        ReligiousRun {
            name,
            month,
            day,
            days,
        }
    }

    const Y2023: &[ReligiousRun] = &[
        run(RAMADAN_FEAST, 4, 21, 3),
        run(SACRIFICE_FEAST, 6, 28, 4),
    ];
    const Y2024: &[ReligiousRun] = &[
        run(RAMADAN_FEAST, 4, 10, 3),
        run(SACRIFICE_FEAST, 6, 16, 4),
    ];
    const Y2025: &[ReligiousRun] = &[
        run(RAMADAN_FEAST, 3, 30, 3),
        run(SACRIFICE_FEAST, 6, 6, 4),
    ];
    const Y2026: &[ReligiousRun] = &[
        run(RAMADAN_FEAST, 3, 20, 3),
        run(SACRIFICE_FEAST, 5, 27, 4),
    ];
    const Y2027: &[ReligiousRun] = &[
        run(RAMADAN_FEAST, 3, 9, 3),
        run(SACRIFICE_FEAST, 5, 16, 4),
    ];

    match year {
        2023 => Y2023,
        2024 => Y2024,
        2025 => Y2025,
        2026 => Y2026,
        2027 => Y2027,
        _ => &[],
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HolidayCalendar;

impl HolidayCalendar {
    pub fn new() -> Self {
        Self
    }

    /// All holidays dated within `year`, ascending by date.
    pub fn holidays_for_year(&self, year: i32) -> Vec<Holiday> {
        let mut holidays = fixed_holidays(year);
        holidays.extend(religious_holidays(year));

        // Eves can fall in the previous year (Dec 31 before New Year's Day),
        // so next year's holidays are consulted too.
        let eves = std::iter::once(year)
            .chain(year.checked_add(1))
            .flat_map(eve_holidays)
            .filter(|eve| eve.date.year() == year);
        holidays.extend(eves);

        holidays.extend(partial_day(year));

        holidays.sort_by_key(|holiday| holiday.date);
        holidays
    }

    /// First generated holiday on `date`, if any.
    pub fn holiday(&self, date: NaiveDate) -> Option<Holiday> {
        self.holidays_for_year(date.year())
            .into_iter()
            .find(|holiday| holiday.date == date)
    }

    pub fn holidays_in_month(&self, year: i32, month: u32) -> Vec<Holiday> {
        self.holidays_for_year(year)
            .into_iter()
            .filter(|holiday| holiday.date.month() == month)
            .collect()
    }
}

fn fixed_holidays(year: i32) -> Vec<Holiday> {
    FIXED_HOLIDAYS
        .iter()
        .filter_map(|fixed| {
            NaiveDate::from_ymd_opt(year, fixed.month, fixed.day)
                .map(|date| Holiday::new(date, fixed.name, HolidayKind::Official))
        })
        .collect()
}

fn religious_holidays(year: i32) -> Vec<Holiday> {
    religious_runs(year)
        .iter()
        .flat_map(|run| expand_run(year, run))
        .collect()
}

fn expand_run(year: i32, run: &ReligiousRun) -> Vec<Holiday> {
    let Some(start) = NaiveDate::from_ymd_opt(year, run.month, run.day) else {
        return Vec::new();
    };
    (0..run.days)
        .map(|offset| {
            Holiday::new(
                start + Duration::days(offset as i64),
                format!("{} Day {}", run.name, offset + 1),
                HolidayKind::Religious,
            )
        })
        .filter(|holiday| holiday.date.year() == year)
        .collect()
}

/// Half-day eves generated from `year`'s holidays; the eve itself may be
/// dated in the previous year.
fn eve_holidays(year: i32) -> Vec<Holiday> {
    let mut eves = Vec::new();

    for official in fixed_holidays(year) {
        let month_day = (official.date.month(), official.date.day());
        if month_day == NO_EVE_MONTH_DAY || !is_weekday(official.date) {
            continue;
        }
        if let Some(eve) = official.date.pred_opt() {
            eves.push(Holiday::new(
                eve,
                format!("{} Eve", official.name),
                HolidayKind::HalfDay,
            ));
        }
    }

    for run in religious_runs(year) {
        let Some(eve) =
            NaiveDate::from_ymd_opt(year, run.month, run.day).and_then(|start| start.pred_opt())
        else {
            continue;
        };
        if is_weekday(eve) {
            eves.push(Holiday::new(
                eve,
                format!("{} Eve", run.name),
                HolidayKind::HalfDay,
            ));
        }
    }

    eves
}

fn partial_day(year: i32) -> Option<Holiday> {
    let (month, day) = PARTIAL_DAY_MONTH_DAY;
    NaiveDate::from_ymd_opt(year, month, day)
        .filter(|date| is_weekday(*date))
        .map(|date| Holiday::new(date, PARTIAL_DAY_NAME, HolidayKind::PartialDay))
}

pub(crate) fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
