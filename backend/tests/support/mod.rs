#![allow(dead_code)]
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use shiftbook_backend::{
    models::reminder::ReminderSettings,
    repositories::{kv::InMemoryStore, schedule::SCHEDULE_DOCUMENT},
    services::{alarm::RecordingAlarmService, reminder::ReminderScheduler, shift_book::ShiftBook},
    utils::time::FixedClock,
};

pub const TZ: Tz = chrono_tz::Europe::Istanbul;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("valid instant")
}

/// 2025-01-01T00:00Z, well before every date the tests schedule.
pub fn early_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(utc(2025, 1, 1, 0, 0)))
}

pub fn scheduler(
    alarms: Arc<RecordingAlarmService>,
    enabled: bool,
    lead_days: Vec<u32>,
) -> ReminderScheduler {
    ReminderScheduler::new(
        alarms,
        early_clock(),
        TZ,
        ReminderSettings { enabled, lead_days },
    )
}

pub struct TestBook {
    pub book: ShiftBook,
    pub persistence: Arc<InMemoryStore>,
    pub alarms: Arc<RecordingAlarmService>,
}

pub fn open_book() -> TestBook {
    open_book_on(Arc::new(InMemoryStore::new()))
}

pub fn open_book_on(persistence: Arc<InMemoryStore>) -> TestBook {
    let alarms = Arc::new(RecordingAlarmService::new());
    let book = ShiftBook::open(
        persistence.clone(),
        alarms.clone(),
        early_clock(),
        TZ,
        SCHEDULE_DOCUMENT,
    );
    TestBook {
        book,
        persistence,
        alarms,
    }
}
