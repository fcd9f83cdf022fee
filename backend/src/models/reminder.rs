use crate::models::shift::ShiftId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deterministic alarm id for one (date, shift, lead time) triple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReminderKey(String);

impl ReminderKey {
    pub fn new(date: NaiveDate, shift_id: &ShiftId, lead_days: u32) -> Self {
        Self(format!("{}|{}|{}", date.format("%Y-%m-%d"), shift_id, lead_days))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReminderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single trigger computed for an assignment; rebuilt on every scheduling pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderRequest {
    pub date: NaiveDate,
    pub shift_id: ShiftId,
    pub lead_days: u32,
    pub trigger_at: DateTime<Utc>,
}

impl ReminderRequest {
    pub fn key(&self) -> ReminderKey {
        ReminderKey::new(self.date, &self.shift_id, self.lead_days)
    }
}

/// Payload handed to the notification presenter when an alarm fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderNotification {
    pub shift_label: String,
    pub lead_days: u32,
    pub shift_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSettings {
    pub enabled: bool,
    pub lead_days: Vec<u32>,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            lead_days: vec![1],
        }
    }
}

impl ReminderSettings {
    /// Sorted, de-duplicated lead times; an empty list falls back to one day.
    pub fn normalized_lead_days(&self) -> Vec<u32> {
        let mut lead_days = self.lead_days.clone();
        lead_days.sort_unstable();
        lead_days.dedup();
        if lead_days.is_empty() {
            lead_days.push(1);
        }
        lead_days
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderState {
    Unscheduled,
    Scheduled,
    Fired,
    Cancelled,
}
