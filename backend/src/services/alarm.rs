//! Alarm and notification collaborators.
//!
//! The engine only arms and disarms alarms by key; delivery happens out of
//! band and goes straight to a [`NotificationPresenter`], never back into the
//! engine.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::error::AlarmError;
use crate::models::reminder::{ReminderKey, ReminderNotification};

/// Timer capability consumed by the reminder scheduler.
///
/// Arming an already-armed key replaces the previous alarm.
#[cfg_attr(test, mockall::automock)]
pub trait AlarmService: Send + Sync {
    fn arm(
        &self,
        key: &ReminderKey,
        at: DateTime<Utc>,
        notification: &ReminderNotification,
    ) -> Result<(), AlarmError>;

    /// Disarming an unknown key is a no-op.
    fn disarm(&self, key: &ReminderKey);
}

/// Renders a reminder to the user when its alarm fires.
pub trait NotificationPresenter: Send + Sync {
    fn present(&self, notification: &ReminderNotification);
}

/// Presenter that writes reminders to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPresenter;

impl NotificationPresenter for LogPresenter {
    fn present(&self, notification: &ReminderNotification) {
        tracing::info!(
            shift = %notification.shift_label,
            shift_date = %notification.shift_date,
            lead_days = notification.lead_days,
            "shift reminder"
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmedAlarm {
    pub at: DateTime<Utc>,
    pub notification: ReminderNotification,
}

/// In-memory alarm service that records what is armed.
#[derive(Debug, Default)]
pub struct RecordingAlarmService {
    armed: Mutex<BTreeMap<ReminderKey, ArmedAlarm>>,
    failure: Mutex<Option<AlarmError>>,
}

impl RecordingAlarmService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `arm` call fail with `error`.
    pub fn fail_with(&self, error: AlarmError) {
        *lock(&self.failure) = Some(error);
    }

    pub fn armed(&self) -> BTreeMap<ReminderKey, ArmedAlarm> {
        lock(&self.armed).clone()
    }

    pub fn is_armed(&self, key: &ReminderKey) -> bool {
        lock(&self.armed).contains_key(key)
    }

    pub fn armed_count(&self) -> usize {
        lock(&self.armed).len()
    }
}

impl AlarmService for RecordingAlarmService {
    fn arm(
        &self,
        key: &ReminderKey,
        at: DateTime<Utc>,
        notification: &ReminderNotification,
    ) -> Result<(), AlarmError> {
        if let Some(error) = lock(&self.failure).clone() {
            return Err(error);
        }
        lock(&self.armed).insert(
            key.clone(),
            ArmedAlarm {
                at,
                notification: notification.clone(),
            },
        );
        Ok(())
    }

    fn disarm(&self, key: &ReminderKey) {
        lock(&self.armed).remove(key);
    }
}

struct AlarmTask {
    generation: u64,
    handle: JoinHandle<()>,
}

type TaskTable = Arc<Mutex<HashMap<ReminderKey, AlarmTask>>>;

/// Alarm service backed by one sleeping tokio task per key.
pub struct TokioAlarmService {
    runtime: Handle,
    presenter: Arc<dyn NotificationPresenter>,
    tasks: TaskTable,
    next_generation: AtomicU64,
}

impl TokioAlarmService {
    /// Must be called from within a tokio runtime.
    pub fn new(presenter: Arc<dyn NotificationPresenter>) -> Result<Self, AlarmError> {
        let runtime =
            Handle::try_current().map_err(|err| AlarmError::Unavailable(err.to_string()))?;
        Ok(Self {
            runtime,
            presenter,
            tasks: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
        })
    }

    pub fn pending(&self) -> usize {
        lock(&self.tasks)
            .values()
            .filter(|task| !task.handle.is_finished())
            .count()
    }
}

impl AlarmService for TokioAlarmService {
    fn arm(
        &self,
        key: &ReminderKey,
        at: DateTime<Utc>,
        notification: &ReminderNotification,
    ) -> Result<(), AlarmError> {
        let delay = (at - Utc::now()).to_std().unwrap_or_default();
        let presenter = Arc::clone(&self.presenter);
        let tasks = Arc::clone(&self.tasks);
        let notification = notification.clone();
        let task_key = key.clone();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);

        let mut table = lock(&self.tasks);
        let handle = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            presenter.present(&notification);
            let mut table = lock(&tasks);
            // A re-armed key belongs to a newer task.
            if table
                .get(&task_key)
                .is_some_and(|task| task.generation == generation)
            {
                table.remove(&task_key);
            }
        });
        if let Some(previous) = table.insert(key.clone(), AlarmTask { generation, handle }) {
            previous.handle.abort();
        }
        tracing::debug!(%key, %at, "alarm armed");
        Ok(())
    }

    fn disarm(&self, key: &ReminderKey) {
        if let Some(task) = lock(&self.tasks).remove(key) {
            task.handle.abort();
            tracing::debug!(%key, "alarm disarmed");
        }
    }
}

impl Drop for TokioAlarmService {
    fn drop(&mut self) {
        for (_, task) in lock(&self.tasks).drain() {
            task.handle.abort();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
