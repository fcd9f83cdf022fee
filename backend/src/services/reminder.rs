//! Reminder scheduling.
//!
//! Turns an assignment into one trigger per configured lead time and keeps
//! those triggers in step with the schedule. Each trigger is addressed by a
//! deterministic [`ReminderKey`], so re-scheduling the same triple replaces
//! rather than duplicates. Cancellation only covers the lead times configured
//! at the time of the call.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::models::reminder::{
    ReminderKey, ReminderNotification, ReminderRequest, ReminderSettings, ReminderState,
};
use crate::models::shift::ShiftId;
use crate::repositories::shift_catalog::ShiftCatalog;
use crate::services::alarm::AlarmService;
use crate::utils::time::{local_to_utc, Clock};

/// Result of a scheduling pass; failures never propagate further.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleReport {
    pub armed: usize,
    pub skipped_past: usize,
    pub failed: usize,
}

impl ScheduleReport {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    fn merge(&mut self, other: ScheduleReport) {
        self.armed += other.armed;
        self.skipped_past += other.skipped_past;
        self.failed += other.failed;
    }
}

/// Ledger size at which settled entries are first pruned.
const LEDGER_PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy)]
struct LedgerEntry {
    state: ReminderState,
    trigger_at: DateTime<Utc>,
}

pub struct ReminderScheduler {
    alarms: Arc<dyn AlarmService>,
    clock: Arc<dyn Clock>,
    time_zone: Tz,
    settings: ReminderSettings,
    ledger: HashMap<ReminderKey, LedgerEntry>,
    prune_at: usize,
}

impl ReminderScheduler {
    pub fn new(
        alarms: Arc<dyn AlarmService>,
        clock: Arc<dyn Clock>,
        time_zone: Tz,
        settings: ReminderSettings,
    ) -> Self {
        Self {
            alarms,
            clock,
            time_zone,
            settings,
            ledger: HashMap::new(),
            prune_at: LEDGER_PRUNE_THRESHOLD,
        }
    }

    pub fn settings(&self) -> &ReminderSettings {
        &self.settings
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    pub fn lead_days(&self) -> Vec<u32> {
        self.settings.normalized_lead_days()
    }

    /// Future triggers for an assignment, one per lead time. Triggers that
    /// already lie in the past are left out.
    pub fn requests_for(
        &self,
        date: NaiveDate,
        shift_id: &ShiftId,
        catalog: &ShiftCatalog,
    ) -> Vec<ReminderRequest> {
        let Some(start_time) = catalog.start_time_of(shift_id) else {
            return Vec::new();
        };
        let now = self.clock.now();
        self.lead_days()
            .into_iter()
            .filter_map(|lead_days| {
                let trigger_at = self.trigger_instant(date, start_time, lead_days)?;
                (trigger_at >= now).then_some(ReminderRequest {
                    date,
                    shift_id: *shift_id,
                    lead_days,
                    trigger_at,
                })
            })
            .collect()
    }

    /// Arms every lead time for `(date, shift_id)`. Does not look at the
    /// enabled flag; callers decide whether reminders are wanted.
    pub fn schedule_all(
        &mut self,
        date: NaiveDate,
        shift_id: &ShiftId,
        catalog: &ShiftCatalog,
    ) -> ScheduleReport {
        let mut report = ScheduleReport::default();
        let Some(start_time) = catalog.start_time_of(shift_id) else {
            tracing::warn!(%date, shift = %shift_id, "no reminder for unknown shift");
            report.failed = self.lead_days().len();
            return report;
        };

        let now = self.clock.now();
        let label = catalog.label_of(shift_id);
        for lead_days in self.lead_days() {
            let key = ReminderKey::new(date, shift_id, lead_days);
            let Some(trigger_at) = self.trigger_instant(date, start_time, lead_days) else {
                report.failed += 1;
                continue;
            };
            if trigger_at < now {
                tracing::debug!(%key, %trigger_at, "skipping reminder in the past");
                report.skipped_past += 1;
                continue;
            }

            let notification = ReminderNotification {
                shift_label: label.clone(),
                lead_days,
                shift_date: date,
            };
            match self.alarms.arm(&key, trigger_at, &notification) {
                Ok(()) => {
                    self.record(
                        key,
                        LedgerEntry {
                            state: ReminderState::Scheduled,
                            trigger_at,
                        },
                    );
                    report.armed += 1;
                }
                Err(err) => {
                    tracing::warn!(%key, error = %err, "failed to arm reminder");
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Disarms the triggers of every currently configured lead time.
    pub fn cancel_all(&mut self, date: NaiveDate, shift_id: &ShiftId) {
        for lead_days in self.lead_days() {
            let key = ReminderKey::new(date, shift_id, lead_days);
            self.alarms.disarm(&key);
            if let Some(entry) = self.ledger.get_mut(&key) {
                entry.state = ReminderState::Cancelled;
            }
        }
    }

    /// Re-derives every trigger from the current assignments. Entry point for
    /// process restart; does nothing while reminders are disabled.
    pub fn reschedule_all(
        &mut self,
        assignments: &BTreeMap<NaiveDate, ShiftId>,
        catalog: &ShiftCatalog,
    ) -> ScheduleReport {
        let mut report = ScheduleReport::default();
        self.prune_settled();
        if !self.is_enabled() {
            return report;
        }
        let span = tracing::debug_span!("reschedule_all", assignments = assignments.len());
        let _enter = span.enter();

        for (date, shift_id) in assignments {
            report.merge(self.schedule_all(*date, shift_id, catalog));
        }
        tracing::info!(
            armed = report.armed,
            skipped_past = report.skipped_past,
            failed = report.failed,
            "reminders rescheduled"
        );
        report
    }

    fn cancel_every(&mut self, assignments: &BTreeMap<NaiveDate, ShiftId>) {
        for (date, shift_id) in assignments {
            self.cancel_all(*date, shift_id);
        }
    }

    /// Toggles reminders globally, arming or disarming every assignment in one pass.
    pub fn set_enabled(
        &mut self,
        enabled: bool,
        assignments: &BTreeMap<NaiveDate, ShiftId>,
        catalog: &ShiftCatalog,
    ) -> ScheduleReport {
        self.settings.enabled = enabled;
        if enabled {
            self.reschedule_all(assignments, catalog)
        } else {
            self.cancel_every(assignments);
            ScheduleReport::default()
        }
    }

    /// Cancels under the old lead times, then schedules under the new ones.
    pub fn set_lead_days(
        &mut self,
        lead_days: Vec<u32>,
        assignments: &BTreeMap<NaiveDate, ShiftId>,
        catalog: &ShiftCatalog,
    ) -> ScheduleReport {
        self.cancel_every(assignments);
        self.settings.lead_days = lead_days;
        self.reschedule_all(assignments, catalog)
    }

    /// Number of keys the ledger currently tracks.
    pub fn tracked(&self) -> usize {
        self.ledger.len()
    }

    fn record(&mut self, key: ReminderKey, entry: LedgerEntry) {
        if self.ledger.len() >= self.prune_at {
            self.prune_settled();
        }
        self.ledger.insert(key, entry);
    }

    /// Drops cancelled entries and scheduled ones whose trigger has passed.
    /// Both then report as unscheduled.
    fn prune_settled(&mut self) {
        let now = self.clock.now();
        let before = self.ledger.len();
        self.ledger
            .retain(|_, entry| entry.state == ReminderState::Scheduled && entry.trigger_at > now);
        self.prune_at = LEDGER_PRUNE_THRESHOLD.max(self.ledger.len() * 2);
        if before != self.ledger.len() {
            tracing::debug!(pruned = before - self.ledger.len(), "reminder ledger pruned");
        }
    }

    /// Lifecycle state of a trigger. A scheduled trigger whose instant has
    /// passed is reported as fired.
    pub fn state_of(&self, key: &ReminderKey) -> ReminderState {
        match self.ledger.get(key) {
            None => ReminderState::Unscheduled,
            Some(entry)
                if entry.state == ReminderState::Scheduled
                    && entry.trigger_at <= self.clock.now() =>
            {
                ReminderState::Fired
            }
            Some(entry) => entry.state,
        }
    }

    /// Shift start on `date` minus `lead_days` calendar days, in local time.
    fn trigger_instant(
        &self,
        date: NaiveDate,
        start_time: chrono::NaiveTime,
        lead_days: u32,
    ) -> Option<DateTime<Utc>> {
        let trigger_date = date.checked_sub_signed(Duration::days(i64::from(lead_days)))?;
        local_to_utc(&self.time_zone, trigger_date, start_time)
    }
}
