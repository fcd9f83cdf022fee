//! Engine facade.
//!
//! Owns the catalog, the schedule and the reminder scheduler, wires them to
//! the persistence and alarm ports, and keeps catalog and settings changes
//! written through.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;

use crate::error::EngineResult;
use crate::models::holiday::Holiday;
use crate::models::reminder::{ReminderKey, ReminderState};
use crate::models::shift::{BuiltinShift, ShiftCategory, ShiftId};
use crate::models::summary::{MonthlyReport, MonthlySummary, YearlySummary};
use crate::repositories::kv::KeyValueStore;
use crate::repositories::schedule::{AssignOutcome, ImportOutcome, ScheduleStore};
use crate::repositories::settings::{load_reminder_settings, save_reminder_settings};
use crate::repositories::shift_catalog::ShiftCatalog;
use crate::services::alarm::AlarmService;
use crate::services::holiday::HolidayCalendar;
use crate::services::overtime::OvertimeCalculator;
use crate::services::reminder::{ReminderScheduler, ScheduleReport};
use crate::services::work_hours::WorkHourRule;
use crate::utils::time::{days_of_month, Clock};

pub struct ShiftBook {
    persistence: Arc<dyn KeyValueStore>,
    rule: WorkHourRule,
    catalog: ShiftCatalog,
    schedule: ScheduleStore,
    reminders: ReminderScheduler,
}

impl ShiftBook {
    /// Loads catalog, schedule and reminder settings from `persistence`.
    /// Nothing is armed until [`reschedule_all`](Self::reschedule_all) runs.
    pub fn open(
        persistence: Arc<dyn KeyValueStore>,
        alarms: Arc<dyn AlarmService>,
        clock: Arc<dyn Clock>,
        time_zone: Tz,
        schedule_key: &str,
    ) -> Self {
        let catalog = ShiftCatalog::load(persistence.as_ref());
        let settings = load_reminder_settings(persistence.as_ref());
        let schedule = ScheduleStore::load(Arc::clone(&persistence), schedule_key);
        tracing::info!(
            assignments = schedule.len(),
            custom_shifts = catalog.custom_definitions().len(),
            reminders_enabled = settings.enabled,
            %time_zone,
            "shift book opened"
        );

        Self {
            persistence,
            rule: WorkHourRule::default(),
            catalog,
            schedule,
            reminders: ReminderScheduler::new(alarms, clock, time_zone, settings),
        }
    }

    pub fn calendar(&self) -> &HolidayCalendar {
        self.rule.calendar()
    }

    pub fn rule(&self) -> &WorkHourRule {
        &self.rule
    }

    pub fn catalog(&self) -> &ShiftCatalog {
        &self.catalog
    }

    pub fn schedule(&self) -> &ScheduleStore {
        &self.schedule
    }

    pub fn reminders(&self) -> &ReminderScheduler {
        &self.reminders
    }

    pub fn assign(&mut self, date: NaiveDate, shift_id: ShiftId) -> AssignOutcome {
        if !self.catalog.contains(&shift_id) {
            tracing::warn!(%date, shift = %shift_id, "assigning a shift missing from the catalog");
        }
        self.schedule
            .assign(date, Some(shift_id), &mut self.reminders, &self.catalog)
    }

    pub fn clear(&mut self, date: NaiveDate) -> AssignOutcome {
        self.schedule
            .clear(date, &mut self.reminders, &self.catalog)
    }

    pub fn expected_hours(&self, date: NaiveDate) -> u32 {
        match self.schedule.get(date) {
            Some(shift_id) => self
                .rule
                .expected_hours_for_assignment(date, &shift_id, &self.catalog),
            None => self.rule.expected_hours(date),
        }
    }

    pub fn is_special_holiday_rule(&self, date: NaiveDate) -> bool {
        self.schedule.is_special_holiday_rule(date, &self.rule)
    }

    pub fn add_shift(&mut self, label: String, hours: u32, color: String) -> ShiftId {
        let id = self.catalog.add(label, hours, color);
        self.persist_catalog();
        id
    }

    pub fn add_leave_shift(&mut self, label: String, hours: u32, color: String) -> ShiftId {
        let id = self.catalog.add_leave(label, hours, color);
        self.persist_catalog();
        id
    }

    pub fn add_shift_with_category(
        &mut self,
        label: String,
        hours: u32,
        color: String,
        category: ShiftCategory,
    ) -> ShiftId {
        match category {
            ShiftCategory::Work => self.add_shift(label, hours, color),
            ShiftCategory::Leave => self.add_leave_shift(label, hours, color),
        }
    }

    /// Removes a custom shift. Its assignments stay in the schedule, count
    /// zero hours and lose their reminders.
    pub fn remove_shift(&mut self, shift_id: &ShiftId) -> bool {
        if !self.catalog.contains(shift_id) || !shift_id.is_custom() {
            return false;
        }
        for (date, assigned) in self.schedule.assignments() {
            if assigned == shift_id {
                self.reminders.cancel_all(*date, assigned);
            }
        }
        let removed = self.catalog.remove(shift_id);
        if removed {
            self.persist_catalog();
        }
        removed
    }

    pub fn configure_builtin(&mut self, kind: BuiltinShift, hours: u32, label: String) {
        self.catalog.configure_builtin(kind, hours, label);
        self.persist_catalog();
    }

    /// Moves a custom shift's start time and re-arms its future reminders.
    pub fn set_shift_start_time(&mut self, shift_id: &ShiftId, start_time: NaiveTime) -> bool {
        if !self.catalog.set_start_time(shift_id, start_time) {
            return false;
        }
        self.persist_catalog();

        if self.reminders.is_enabled() {
            for (date, assigned) in self.schedule.assignments() {
                if assigned == shift_id {
                    self.reminders.cancel_all(*date, assigned);
                    self.reminders.schedule_all(*date, assigned, &self.catalog);
                }
            }
        }
        true
    }

    pub fn monthly_summary(&self, year: i32, month: u32) -> EngineResult<MonthlySummary> {
        OvertimeCalculator::new(self.schedule.assignments(), &self.catalog)
            .monthly_summary(year, month)
    }

    pub fn yearly_summary(&self, year: i32) -> EngineResult<YearlySummary> {
        OvertimeCalculator::new(self.schedule.assignments(), &self.catalog).yearly_summary(year)
    }

    pub fn monthly_report(&self, year: i32, month: u32) -> EngineResult<MonthlyReport> {
        let summary = self.monthly_summary(year, month)?;
        let holidays: Vec<Holiday> = self.calendar().holidays_in_month(year, month);
        let special_rule_days = days_of_month(year, month)
            .into_iter()
            .filter(|day| self.is_special_holiday_rule(*day))
            .collect();
        Ok(MonthlyReport {
            summary,
            holidays,
            special_rule_days,
        })
    }

    pub fn set_reminders_enabled(&mut self, enabled: bool) -> ScheduleReport {
        let report = self
            .reminders
            .set_enabled(enabled, self.schedule.assignments(), &self.catalog);
        self.persist_settings();
        report
    }

    pub fn set_lead_days(&mut self, lead_days: Vec<u32>) -> ScheduleReport {
        let report =
            self.reminders
                .set_lead_days(lead_days, self.schedule.assignments(), &self.catalog);
        self.persist_settings();
        report
    }

    /// Re-arms every reminder from the current schedule; call once after start.
    pub fn reschedule_all(&mut self) -> ScheduleReport {
        self.reminders
            .reschedule_all(self.schedule.assignments(), &self.catalog)
    }

    pub fn reminder_state(&self, key: &ReminderKey) -> ReminderState {
        self.reminders.state_of(key)
    }

    pub fn export(&self) -> EngineResult<String> {
        self.schedule.export()
    }

    pub fn import(&mut self, document: &str) -> EngineResult<ImportOutcome> {
        self.schedule
            .import(document, &mut self.reminders, &self.catalog)
    }

    fn persist_catalog(&self) {
        if let Err(err) = self.catalog.save(self.persistence.as_ref()) {
            tracing::warn!(error = %err, "failed to write shift catalog");
        }
    }

    fn persist_settings(&self) {
        if let Err(err) = save_reminder_settings(self.persistence.as_ref(), self.reminders.settings()) {
            tracing::warn!(error = %err, "failed to write reminder settings");
        }
    }
}
