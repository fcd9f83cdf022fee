//! Date to shift assignments.
//!
//! The store is the single source of truth for the schedule. Every mutation
//! is written through as one whole document; reminder side effects are
//! ordered around that write.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::error::{EngineError, EngineResult, StorageError};
use crate::models::shift::ShiftId;
use crate::repositories::kv::KeyValueStore;
use crate::repositories::shift_catalog::ShiftCatalog;
use crate::services::reminder::{ReminderScheduler, ScheduleReport};
use crate::services::work_hours::{WorkHourRule, FULL_DAY_HOURS};

pub const SCHEDULE_DOCUMENT: &str = "shift_schedule";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// What a single assign or clear did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignOutcome {
    pub previous: Option<ShiftId>,
    /// False when the write-through failed; the in-memory change is kept.
    pub persisted: bool,
    /// Present when reminders were scheduled for the new assignment.
    pub reminders: Option<ScheduleReport>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub imported: usize,
    pub skipped: usize,
    pub persisted: bool,
    pub reminders: Option<ScheduleReport>,
}

pub struct ScheduleStore {
    assignments: BTreeMap<NaiveDate, ShiftId>,
    persistence: Arc<dyn KeyValueStore>,
    document_key: String,
}

impl ScheduleStore {
    /// Loads the schedule stored under `document_key`. Unreadable documents
    /// start empty; bad entries are dropped one by one.
    pub fn load(persistence: Arc<dyn KeyValueStore>, document_key: impl Into<String>) -> Self {
        let document_key = document_key.into();
        let assignments = match persistence.load(&document_key) {
            Ok(Some(document)) => match parse_document(&document) {
                Ok((assignments, skipped)) => {
                    if skipped > 0 {
                        tracing::warn!(skipped, "dropped malformed schedule entries");
                    }
                    assignments
                }
                Err(err) => {
                    tracing::warn!(error = %err, "malformed schedule document, starting empty");
                    BTreeMap::new()
                }
            },
            Ok(None) => BTreeMap::new(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read schedule, starting empty");
                BTreeMap::new()
            }
        };
        tracing::debug!(key = %document_key, assignments = assignments.len(), "schedule loaded");

        Self {
            assignments,
            persistence,
            document_key,
        }
    }

    pub fn document_key(&self) -> &str {
        &self.document_key
    }

    pub fn get(&self, date: NaiveDate) -> Option<ShiftId> {
        self.assignments.get(&date).copied()
    }

    /// Owned snapshot of every assignment.
    pub fn all_assignments(&self) -> BTreeMap<NaiveDate, ShiftId> {
        self.assignments.clone()
    }

    pub fn assignments(&self) -> &BTreeMap<NaiveDate, ShiftId> {
        &self.assignments
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Sets or, with `None`, removes the assignment for `date`.
    ///
    /// Cancels reminders of the previous assignment, updates the map, writes
    /// it through, then schedules reminders for the new shift when enabled.
    /// Neither a failed write nor a failed reminder rolls anything back.
    pub fn assign(
        &mut self,
        date: NaiveDate,
        shift_id: Option<ShiftId>,
        reminders: &mut ReminderScheduler,
        catalog: &ShiftCatalog,
    ) -> AssignOutcome {
        let previous = self.get(date);
        if let Some(previous) = previous {
            reminders.cancel_all(date, &previous);
        }

        match shift_id {
            Some(shift_id) => self.assignments.insert(date, shift_id),
            None => self.assignments.remove(&date),
        };

        let persisted = self.persist_logged();

        let reminders = match shift_id {
            Some(shift_id) if reminders.is_enabled() => {
                let report = reminders.schedule_all(date, &shift_id, catalog);
                if !report.is_success() {
                    tracing::warn!(%date, shift = %shift_id, failed = report.failed, "assignment kept without all reminders");
                }
                Some(report)
            }
            _ => None,
        };

        tracing::debug!(%date, ?previous, new = ?shift_id, "assignment updated");
        AssignOutcome {
            previous,
            persisted,
            reminders,
        }
    }

    pub fn clear(
        &mut self,
        date: NaiveDate,
        reminders: &mut ReminderScheduler,
        catalog: &ShiftCatalog,
    ) -> AssignOutcome {
        self.assign(date, None, reminders, catalog)
    }

    /// An assigned day whose expected hours are reduced but not zero.
    /// Informational only; monthly totals ignore it.
    pub fn is_special_holiday_rule(&self, date: NaiveDate, rule: &WorkHourRule) -> bool {
        if !self.assignments.contains_key(&date) {
            return false;
        }
        let expected = rule.expected_hours(date);
        expected > 0 && expected < FULL_DAY_HOURS
    }

    /// The schedule document, usable as an export file.
    pub fn export(&self) -> EngineResult<String> {
        to_document(&self.assignments).map_err(|source| {
            EngineError::Storage(StorageError::Serialize {
                key: self.document_key.clone(),
                source,
            })
        })
    }

    /// Replaces the whole schedule with `document`.
    ///
    /// A document that is not a JSON object is rejected and leaves the
    /// schedule untouched; bad entries inside a valid document are skipped.
    pub fn import(
        &mut self,
        document: &str,
        reminders: &mut ReminderScheduler,
        catalog: &ShiftCatalog,
    ) -> EngineResult<ImportOutcome> {
        let (assignments, skipped) = parse_document(document).map_err(EngineError::InvalidImport)?;

        for (date, shift_id) in &self.assignments {
            reminders.cancel_all(*date, shift_id);
        }
        self.assignments = assignments;
        let persisted = self.persist_logged();

        let reminders = reminders
            .is_enabled()
            .then(|| reminders.reschedule_all(&self.assignments, catalog));

        tracing::info!(imported = self.assignments.len(), skipped, "schedule imported");
        Ok(ImportOutcome {
            imported: self.assignments.len(),
            skipped,
            persisted,
            reminders,
        })
    }

    pub fn persist(&self) -> Result<(), StorageError> {
        let document = to_document(&self.assignments).map_err(|source| StorageError::Serialize {
            key: self.document_key.clone(),
            source,
        })?;
        self.persistence.save(&self.document_key, &document)
    }

    fn persist_logged(&self) -> bool {
        match self.persist() {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "failed to write schedule");
                false
            }
        }
    }
}

/// Parses `{ "YYYY-MM-DD": "SHIFT_ID" }`, returning the entries that parsed
/// and how many were skipped.
pub fn parse_document(
    document: &str,
) -> Result<(BTreeMap<NaiveDate, ShiftId>, usize), serde_json::Error> {
    let raw: Map<String, Value> = serde_json::from_str(document)?;
    let mut assignments = BTreeMap::new();
    let mut skipped = 0;

    for (date, value) in raw {
        let parsed = NaiveDate::parse_from_str(&date, DATE_FORMAT)
            .ok()
            .zip(value.as_str().and_then(|id| id.parse::<ShiftId>().ok()));
        match parsed {
            Some((date, shift_id)) => {
                assignments.insert(date, shift_id);
            }
            None => {
                tracing::warn!(%date, %value, "skipping malformed schedule entry");
                skipped += 1;
            }
        }
    }
    Ok((assignments, skipped))
}

pub fn to_document(assignments: &BTreeMap<NaiveDate, ShiftId>) -> Result<String, serde_json::Error> {
    let raw: BTreeMap<String, String> = assignments
        .iter()
        .map(|(date, shift_id)| (date.format(DATE_FORMAT).to_string(), shift_id.to_string()))
        .collect();
    serde_json::to_string(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::reminder::{ReminderKey, ReminderSettings};
    use crate::repositories::kv::{InMemoryStore, MockKeyValueStore};
    use crate::services::alarm::RecordingAlarmService;
    use crate::utils::time::FixedClock;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn scheduler(alarms: Arc<RecordingAlarmService>, enabled: bool) -> ReminderScheduler {
        ReminderScheduler::new(
            alarms,
            Arc::new(FixedClock(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())),
            chrono_tz::Europe::Istanbul,
            ReminderSettings {
                enabled,
                lead_days: vec![1],
            },
        )
    }

    #[test]
    fn load_skips_bad_entries_and_keeps_the_rest() {
        let document = r#"{
            "2025-03-01": "MORNING",
            "2025-13-01": "NIGHT",
            "2025-03-02": "EVENING",
            "2025-03-03": 7,
            "2025-03-04": "FULL"
        }"#;
        let store = ScheduleStore::load(
            Arc::new(InMemoryStore::with_document(SCHEDULE_DOCUMENT, document)),
            SCHEDULE_DOCUMENT,
        );

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(date(2025, 3, 1)), Some(ShiftId::MORNING));
        assert_eq!(store.get(date(2025, 3, 4)), Some(ShiftId::FULL));
    }

    #[test]
    fn load_of_non_object_document_starts_empty() {
        let store = ScheduleStore::load(
            Arc::new(InMemoryStore::with_document(SCHEDULE_DOCUMENT, "[1, 2]")),
            SCHEDULE_DOCUMENT,
        );
        assert!(store.is_empty());
    }

    #[test]
    fn every_mutation_writes_the_whole_map() {
        let persistence = Arc::new(InMemoryStore::new());
        let mut store = ScheduleStore::load(persistence.clone(), SCHEDULE_DOCUMENT);
        let mut reminders = scheduler(Arc::new(RecordingAlarmService::new()), false);
        let catalog = ShiftCatalog::default();

        store.assign(date(2025, 3, 1), Some(ShiftId::MORNING), &mut reminders, &catalog);
        store.assign(date(2025, 3, 2), Some(ShiftId::NIGHT), &mut reminders, &catalog);
        assert_eq!(
            persistence.get(SCHEDULE_DOCUMENT).as_deref(),
            Some(r#"{"2025-03-01":"MORNING","2025-03-02":"NIGHT"}"#)
        );

        store.clear(date(2025, 3, 1), &mut reminders, &catalog);
        assert_eq!(
            persistence.get(SCHEDULE_DOCUMENT).as_deref(),
            Some(r#"{"2025-03-02":"NIGHT"}"#)
        );
    }

    #[test]
    fn last_write_wins_and_reports_previous() {
        let mut store = ScheduleStore::load(Arc::new(InMemoryStore::new()), SCHEDULE_DOCUMENT);
        let mut reminders = scheduler(Arc::new(RecordingAlarmService::new()), false);
        let catalog = ShiftCatalog::default();

        store.assign(date(2025, 3, 1), Some(ShiftId::MORNING), &mut reminders, &catalog);
        let outcome = store.assign(date(2025, 3, 1), Some(ShiftId::FULL), &mut reminders, &catalog);

        assert_eq!(outcome.previous, Some(ShiftId::MORNING));
        assert_eq!(store.get(date(2025, 3, 1)), Some(ShiftId::FULL));
        assert!(outcome.reminders.is_none());
    }

    #[test]
    fn overwrite_moves_reminders_to_the_new_shift() {
        let alarms = Arc::new(RecordingAlarmService::new());
        let mut reminders = scheduler(alarms.clone(), true);
        let mut store = ScheduleStore::load(Arc::new(InMemoryStore::new()), SCHEDULE_DOCUMENT);
        let catalog = ShiftCatalog::default();

        store.assign(date(2025, 3, 10), Some(ShiftId::MORNING), &mut reminders, &catalog);
        store.assign(date(2025, 3, 10), Some(ShiftId::NIGHT), &mut reminders, &catalog);

        assert!(!alarms.is_armed(&ReminderKey::new(date(2025, 3, 10), &ShiftId::MORNING, 1)));
        assert!(alarms.is_armed(&ReminderKey::new(date(2025, 3, 10), &ShiftId::NIGHT, 1)));
    }

    #[test]
    fn failed_write_keeps_the_assignment() {
        let mut persistence = MockKeyValueStore::new();
        persistence.expect_load().returning(|_| Ok(None));
        persistence
            .expect_save()
            .returning(|key, _| Err(StorageError::InvalidKey(key.to_string())));
        let mut store = ScheduleStore::load(Arc::new(persistence), SCHEDULE_DOCUMENT);
        let mut reminders = scheduler(Arc::new(RecordingAlarmService::new()), false);

        let outcome = store.assign(
            date(2025, 3, 1),
            Some(ShiftId::MORNING),
            &mut reminders,
            &ShiftCatalog::default(),
        );

        assert!(!outcome.persisted);
        assert_eq!(store.get(date(2025, 3, 1)), Some(ShiftId::MORNING));
    }

    #[test]
    fn special_holiday_rule_needs_an_assignment_and_reduced_hours() {
        let mut store = ScheduleStore::load(Arc::new(InMemoryStore::new()), SCHEDULE_DOCUMENT);
        let mut reminders = scheduler(Arc::new(RecordingAlarmService::new()), false);
        let catalog = ShiftCatalog::default();
        let rule = WorkHourRule::default();

        // 2025-10-28 is a Tuesday.
        assert!(!store.is_special_holiday_rule(date(2025, 10, 28), &rule));
        store.assign(date(2025, 10, 28), Some(ShiftId::MORNING), &mut reminders, &catalog);
        store.assign(date(2025, 10, 29), Some(ShiftId::MORNING), &mut reminders, &catalog);
        store.assign(date(2025, 10, 30), Some(ShiftId::MORNING), &mut reminders, &catalog);

        assert!(store.is_special_holiday_rule(date(2025, 10, 28), &rule));
        assert!(!store.is_special_holiday_rule(date(2025, 10, 29), &rule));
        assert!(!store.is_special_holiday_rule(date(2025, 10, 30), &rule));
    }

    #[test]
    fn import_rejects_non_object_documents_without_touching_state() {
        let mut store = ScheduleStore::load(Arc::new(InMemoryStore::new()), SCHEDULE_DOCUMENT);
        let mut reminders = scheduler(Arc::new(RecordingAlarmService::new()), false);
        let catalog = ShiftCatalog::default();
        store.assign(date(2025, 3, 1), Some(ShiftId::MORNING), &mut reminders, &catalog);

        let result = store.import("\"not a schedule\"", &mut reminders, &catalog);

        assert!(matches!(result, Err(EngineError::InvalidImport(_))));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn import_replaces_the_whole_schedule() {
        let mut store = ScheduleStore::load(Arc::new(InMemoryStore::new()), SCHEDULE_DOCUMENT);
        let mut reminders = scheduler(Arc::new(RecordingAlarmService::new()), false);
        let catalog = ShiftCatalog::default();
        store.assign(date(2025, 3, 1), Some(ShiftId::MORNING), &mut reminders, &catalog);

        let outcome = store
            .import(r#"{"2025-04-01":"NIGHT","bad":"FULL"}"#, &mut reminders, &catalog)
            .unwrap();

        assert_eq!(outcome.imported, 1);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(store.get(date(2025, 3, 1)), None);
        assert_eq!(store.get(date(2025, 4, 1)), Some(ShiftId::NIGHT));
    }
}
