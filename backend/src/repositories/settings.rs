//! Persisted reminder preferences.

use crate::error::StorageError;
use crate::models::reminder::ReminderSettings;
use crate::repositories::kv::KeyValueStore;

pub const SETTINGS_DOCUMENT: &str = "reminder_settings";

/// Missing or unreadable settings fall back to the defaults.
pub fn load_reminder_settings(store: &dyn KeyValueStore) -> ReminderSettings {
    let raw = match store.load(SETTINGS_DOCUMENT) {
        Ok(Some(raw)) => raw,
        Ok(None) => return ReminderSettings::default(),
        Err(err) => {
            tracing::warn!(error = %err, "failed to read reminder settings, using defaults");
            return ReminderSettings::default();
        }
    };
    serde_json::from_str(&raw).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "malformed reminder settings, using defaults");
        ReminderSettings::default()
    })
}

pub fn save_reminder_settings(
    store: &dyn KeyValueStore,
    settings: &ReminderSettings,
) -> Result<(), StorageError> {
    let document = serde_json::to_string(settings).map_err(|source| StorageError::Serialize {
        key: SETTINGS_DOCUMENT.to_string(),
        source,
    })?;
    store.save(SETTINGS_DOCUMENT, &document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::kv::{InMemoryStore, MockKeyValueStore};

    #[test]
    fn missing_settings_default_to_disabled_one_day() {
        let settings = load_reminder_settings(&InMemoryStore::new());
        assert!(!settings.enabled);
        assert_eq!(settings.lead_days, vec![1]);
    }

    #[test]
    fn settings_survive_a_round_trip() {
        let store = InMemoryStore::new();
        let settings = ReminderSettings {
            enabled: true,
            lead_days: vec![0, 2],
        };
        save_reminder_settings(&store, &settings).unwrap();
        assert_eq!(load_reminder_settings(&store), settings);
    }

    #[test]
    fn malformed_settings_fall_back_to_defaults() {
        let store = InMemoryStore::with_document(SETTINGS_DOCUMENT, "[true]");
        assert_eq!(load_reminder_settings(&store), ReminderSettings::default());
    }

    #[test]
    fn read_failure_falls_back_to_defaults() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_load()
            .returning(|key| Err(StorageError::InvalidKey(key.to_string())));
        assert_eq!(load_reminder_settings(&store), ReminderSettings::default());
    }
}
