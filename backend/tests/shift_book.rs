mod support;

use chrono::NaiveTime;
use shiftbook_backend::models::holiday::HolidayKind;
use shiftbook_backend::models::reminder::{ReminderKey, ReminderState};
use shiftbook_backend::models::shift::{BuiltinShift, ShiftId};
use shiftbook_backend::repositories::settings::SETTINGS_DOCUMENT;
use shiftbook_backend::repositories::shift_catalog::CATALOG_DOCUMENT;
use support::{date, open_book, open_book_on, utc};

#[test]
fn catalog_changes_survive_reopening() {
    let mut harness = open_book();
    let custom = harness.book.add_shift("Inventory".into(), 10, "#FF9800".into());
    harness
        .book
        .configure_builtin(BuiltinShift::Morning, 7, "Early".into());
    assert!(harness.persistence.get(CATALOG_DOCUMENT).is_some());

    let reopened = open_book_on(harness.persistence.clone());
    let catalog = reopened.book.catalog();
    assert_eq!(catalog.hours_of(&custom), 10);
    assert_eq!(catalog.label_of(&custom), "Inventory");
    assert_eq!(catalog.hours_of(&ShiftId::MORNING), 7);
    assert_eq!(catalog.label_of(&ShiftId::MORNING), "Early");
}

#[test]
fn definitions_list_builtins_first_then_customs_in_order() {
    let mut harness = open_book();
    let first = harness.book.add_shift("A".into(), 1, "#000001".into());
    let second = harness.book.add_shift("B".into(), 2, "#000002".into());

    let ids: Vec<_> = harness
        .book
        .catalog()
        .all_definitions()
        .map(|def| def.id)
        .collect();
    assert_eq!(
        ids,
        vec![ShiftId::MORNING, ShiftId::NIGHT, ShiftId::FULL, first, second]
    );
}

#[test]
fn builtins_cannot_be_removed() {
    let mut harness = open_book();
    assert!(!harness.book.remove_shift(&ShiftId::FULL));
    assert_eq!(harness.book.catalog().all_definitions().count(), 3);
}

#[test]
fn removing_a_custom_shift_keeps_its_assignments_at_zero_hours() {
    let mut harness = open_book();
    harness.book.set_reminders_enabled(true);
    let custom = harness.book.add_shift("Temp".into(), 5, "#607D8B".into());
    harness.book.assign(date(2025, 3, 4), custom);
    assert_eq!(harness.alarms.armed_count(), 1);

    assert!(harness.book.remove_shift(&custom));

    assert_eq!(harness.book.schedule().get(date(2025, 3, 4)), Some(custom));
    assert_eq!(harness.book.monthly_summary(2025, 3).unwrap().worked_hours, 0);
    assert_eq!(harness.alarms.armed_count(), 0);
    assert_eq!(harness.book.catalog().label_of(&custom), custom.to_string());
}

#[test]
fn leave_shift_zeroes_expected_hours_for_its_day() {
    let mut harness = open_book();
    let leave = harness
        .book
        .add_leave_shift("Annual leave".into(), 0, "#9E9E9E".into());
    // 2025-03-04 is a Tuesday.
    assert_eq!(harness.book.expected_hours(date(2025, 3, 4)), 8);
    harness.book.assign(date(2025, 3, 4), leave);
    assert_eq!(harness.book.expected_hours(date(2025, 3, 4)), 0);
}

#[test]
fn reminder_settings_are_persisted_and_reapplied() {
    let mut harness = open_book();
    harness.book.assign(date(2025, 3, 10), ShiftId::NIGHT);
    assert_eq!(harness.alarms.armed_count(), 0);

    let report = harness.book.set_reminders_enabled(true);
    assert_eq!(report.armed, 1);
    harness.book.set_lead_days(vec![1, 2]);
    assert_eq!(harness.alarms.armed_count(), 2);
    assert!(harness.persistence.get(SETTINGS_DOCUMENT).is_some());

    let mut reopened = open_book_on(harness.persistence.clone());
    assert!(reopened.book.reminders().is_enabled());
    assert_eq!(reopened.alarms.armed_count(), 0);
    let report = reopened.book.reschedule_all();
    assert_eq!(report.armed, 2);
}

#[test]
fn disabling_reminders_disarms_everything() {
    let mut harness = open_book();
    harness.book.set_reminders_enabled(true);
    harness.book.assign(date(2025, 3, 10), ShiftId::NIGHT);
    harness.book.assign(date(2025, 3, 11), ShiftId::MORNING);
    assert_eq!(harness.alarms.armed_count(), 2);

    harness.book.set_reminders_enabled(false);

    assert_eq!(harness.alarms.armed_count(), 0);
    let key = ReminderKey::new(date(2025, 3, 10), &ShiftId::NIGHT, 1);
    assert_eq!(harness.book.reminder_state(&key), ReminderState::Cancelled);
}

#[test]
fn moving_a_custom_start_time_rearms_its_reminders() {
    let mut harness = open_book();
    harness.book.set_reminders_enabled(true);
    let custom = harness.book.add_shift("Late".into(), 6, "#795548".into());
    harness.book.assign(date(2025, 3, 10), custom);
    let key = ReminderKey::new(date(2025, 3, 10), &custom, 1);
    // 08:00 Istanbul on the day before.
    assert_eq!(harness.alarms.armed()[&key].at, utc(2025, 3, 9, 5, 0));

    assert!(harness
        .book
        .set_shift_start_time(&custom, NaiveTime::from_hms_opt(20, 0, 0).unwrap()));

    assert_eq!(harness.alarms.armed()[&key].at, utc(2025, 3, 9, 17, 0));
    assert!(!harness
        .book
        .set_shift_start_time(&ShiftId::NIGHT, NaiveTime::from_hms_opt(20, 0, 0).unwrap()));
}

#[test]
fn monthly_report_lists_holidays_and_special_rule_days() {
    let mut harness = open_book();
    harness.book.assign(date(2025, 10, 28), ShiftId::MORNING);
    harness.book.assign(date(2025, 10, 29), ShiftId::MORNING);

    let report = harness.book.monthly_report(2025, 10).unwrap();

    assert_eq!(report.special_rule_days, vec![date(2025, 10, 28)]);
    assert!(report
        .holidays
        .iter()
        .any(|holiday| holiday.kind == HolidayKind::PartialDay));
    assert!(report.holidays.iter().all(|holiday| holiday.date.format("%m").to_string() == "10"));
    // Raw hours: the partial day still counts a full morning shift.
    assert_eq!(report.summary.worked_hours, 16);
}

#[test]
fn export_import_round_trip_through_the_facade() {
    let mut harness = open_book();
    harness.book.assign(date(2025, 6, 1), ShiftId::FULL);
    harness.book.assign(date(2025, 6, 2), ShiftId::NIGHT);
    let exported = harness.book.export().unwrap();

    let mut other = open_book();
    other.book.import(&exported).unwrap();

    assert_eq!(
        other.book.schedule().all_assignments(),
        harness.book.schedule().all_assignments()
    );
}
