//! Shift catalog.
//!
//! Holds the three built-in shift types plus any number of user-defined ones.
//! Input validation (hour ranges, non-numeric input) happens before values
//! reach the catalog; nothing here clamps.

use std::collections::HashSet;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StorageError;
use crate::models::shift::{BuiltinShift, ShiftCategory, ShiftDefinition, ShiftId};
use crate::repositories::kv::KeyValueStore;

pub const CATALOG_DOCUMENT: &str = "shift_catalog";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BuiltinSettings {
    hours: u32,
    label: String,
}

#[derive(Serialize)]
struct CatalogDocument<'a> {
    custom: &'a [ShiftDefinition],
    morning: BuiltinSettings,
    night: BuiltinSettings,
    full: BuiltinSettings,
}

/// Loosely typed read side, so one bad entry cannot sink the whole document.
#[derive(Default, Deserialize)]
#[serde(default)]
struct RawCatalogDocument {
    custom: Vec<Value>,
    morning: Option<Value>,
    night: Option<Value>,
    full: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftCatalog {
    builtins: [ShiftDefinition; 3],
    custom: Vec<ShiftDefinition>,
}

impl Default for ShiftCatalog {
    fn default() -> Self {
        Self {
            builtins: BuiltinShift::ALL.map(ShiftDefinition::builtin),
            custom: Vec::new(),
        }
    }
}

impl ShiftCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the catalog document; missing or unreadable documents yield the defaults.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.load(CATALOG_DOCUMENT) {
            Ok(Some(document)) => Self::from_document(&document),
            Ok(None) => Self::default(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read shift catalog, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        let document = self.to_document().map_err(|source| StorageError::Serialize {
            key: CATALOG_DOCUMENT.to_string(),
            source,
        })?;
        store.save(CATALOG_DOCUMENT, &document)
    }

    pub fn from_document(document: &str) -> Self {
        let raw: RawCatalogDocument = match serde_json::from_str(document) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(error = %err, "malformed shift catalog document, using defaults");
                return Self::default();
            }
        };

        let mut catalog = Self::default();
        for (kind, settings) in [
            (BuiltinShift::Morning, raw.morning),
            (BuiltinShift::Night, raw.night),
            (BuiltinShift::Full, raw.full),
        ] {
            let Some(value) = settings else { continue };
            match serde_json::from_value::<BuiltinSettings>(value) {
                Ok(settings) => catalog.configure_builtin(kind, settings.hours, settings.label),
                Err(err) => {
                    tracing::warn!(shift = kind.as_str(), error = %err, "skipping built-in shift settings")
                }
            }
        }

        let mut seen = HashSet::new();
        for value in raw.custom {
            match serde_json::from_value::<ShiftDefinition>(value) {
                Ok(def) if !def.id.is_custom() => {
                    tracing::warn!(id = %def.id, "skipping custom entry with a built-in id");
                }
                Ok(def) if !seen.insert(def.id) => {
                    tracing::warn!(id = %def.id, "skipping duplicate custom shift");
                }
                Ok(mut def) => {
                    def.is_custom = true;
                    catalog.custom.push(def);
                }
                Err(err) => tracing::warn!(error = %err, "skipping malformed custom shift"),
            }
        }

        catalog
    }

    pub fn to_document(&self) -> Result<String, serde_json::Error> {
        let settings = |kind: BuiltinShift| {
            let def = self.builtin(kind);
            BuiltinSettings {
                hours: def.hours,
                label: def.label.clone(),
            }
        };
        serde_json::to_string(&CatalogDocument {
            custom: &self.custom,
            morning: settings(BuiltinShift::Morning),
            night: settings(BuiltinShift::Night),
            full: settings(BuiltinShift::Full),
        })
    }

    /// Built-ins first in fixed order, then custom shifts in insertion order.
    pub fn all_definitions(&self) -> impl Iterator<Item = &ShiftDefinition> + '_ {
        self.builtins.iter().chain(self.custom.iter())
    }

    pub fn custom_definitions(&self) -> &[ShiftDefinition] {
        &self.custom
    }

    pub fn get(&self, id: &ShiftId) -> Option<&ShiftDefinition> {
        match id {
            ShiftId::Builtin(kind) => Some(self.builtin(*kind)),
            ShiftId::Custom(_) => self.custom.iter().find(|def| def.id == *id),
        }
    }

    pub fn contains(&self, id: &ShiftId) -> bool {
        self.get(id).is_some()
    }

    /// Hours of the shift; an unknown (removed) custom shift counts as zero.
    pub fn hours_of(&self, id: &ShiftId) -> u32 {
        self.get(id).map(|def| def.hours).unwrap_or(0)
    }

    /// Label of the shift, falling back to the raw id for unknown shifts.
    pub fn label_of(&self, id: &ShiftId) -> String {
        self.get(id)
            .map(|def| def.label.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn start_time_of(&self, id: &ShiftId) -> Option<NaiveTime> {
        self.get(id).map(|def| def.start_time)
    }

    pub fn is_leave(&self, id: &ShiftId) -> bool {
        self.get(id).is_some_and(ShiftDefinition::is_leave)
    }

    pub fn add(&mut self, label: String, hours: u32, color: String) -> ShiftId {
        self.push_custom(ShiftDefinition::custom(label, hours, color, ShiftCategory::Work))
    }

    pub fn add_leave(&mut self, label: String, hours: u32, color: String) -> ShiftId {
        self.push_custom(ShiftDefinition::custom(label, hours, color, ShiftCategory::Leave))
    }

    /// Removes a custom shift. Built-ins cannot be removed; returns whether
    /// anything was deleted.
    pub fn remove(&mut self, id: &ShiftId) -> bool {
        if !id.is_custom() {
            return false;
        }
        let before = self.custom.len();
        self.custom.retain(|def| def.id != *id);
        self.custom.len() != before
    }

    /// Changes hours and label of a built-in in place. The color stays fixed.
    pub fn configure_builtin(&mut self, kind: BuiltinShift, hours: u32, label: String) {
        let def = self.builtin_mut(kind);
        def.hours = hours;
        def.label = label;
    }

    /// Start times of built-ins are fixed; returns whether a custom shift was updated.
    pub fn set_start_time(&mut self, id: &ShiftId, start_time: NaiveTime) -> bool {
        match self.custom.iter_mut().find(|def| def.id == *id) {
            Some(def) => {
                def.start_time = start_time;
                true
            }
            None => false,
        }
    }

    fn push_custom(&mut self, def: ShiftDefinition) -> ShiftId {
        let id = def.id;
        self.custom.push(def);
        id
    }

    fn builtin(&self, kind: BuiltinShift) -> &ShiftDefinition {
        &self.builtins[builtin_index(kind)]
    }

    fn builtin_mut(&mut self, kind: BuiltinShift) -> &mut ShiftDefinition {
        &mut self.builtins[builtin_index(kind)]
    }
}

fn builtin_index(kind: BuiltinShift) -> usize {
    match kind {
        BuiltinShift::Morning => 0,
        BuiltinShift::Night => 1,
        BuiltinShift::Full => 2,
    }
}
