pub mod alarm;
pub mod holiday;
pub mod overtime;
pub mod reminder;
pub mod shift_book;
pub mod work_hours;

pub use alarm::{
    AlarmService, LogPresenter, NotificationPresenter, RecordingAlarmService, TokioAlarmService,
};
pub use holiday::HolidayCalendar;
pub use overtime::OvertimeCalculator;
pub use reminder::{ReminderScheduler, ScheduleReport};
pub use shift_book::ShiftBook;
pub use work_hours::WorkHourRule;
