use crate::error::ShiftIdParseError;
use crate::types::CustomShiftId;
use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The three shift types that always exist in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuiltinShift {
    Morning,
    Night,
    Full,
}

impl BuiltinShift {
    /// Catalog order.
    pub const ALL: [BuiltinShift; 3] = [
        BuiltinShift::Morning,
        BuiltinShift::Night,
        BuiltinShift::Full,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuiltinShift::Morning => "MORNING",
            BuiltinShift::Night => "NIGHT",
            BuiltinShift::Full => "FULL",
        }
    }

    pub fn default_hours(&self) -> u32 {
        match self {
            BuiltinShift::Morning => 8,
            BuiltinShift::Night => 16,
            BuiltinShift::Full => 24,
        }
    }

    pub fn default_label(&self) -> &'static str {
        match self {
            BuiltinShift::Morning => "Morning",
            BuiltinShift::Night => "Night",
            BuiltinShift::Full => "Full day",
        }
    }

    pub fn start_time(&self) -> NaiveTime {
        let hour = match self {
            BuiltinShift::Morning | BuiltinShift::Full => 8,
            BuiltinShift::Night => 16,
        };
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN)
    }

    /// Built-in colors are fixed and not configurable.
    pub fn color(&self) -> &'static str {
        match self {
            BuiltinShift::Morning => "#4CAF50",
            BuiltinShift::Night => "#3F51B5",
            BuiltinShift::Full => "#F44336",
        }
    }
}

impl FromStr for BuiltinShift {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MORNING" => Ok(BuiltinShift::Morning),
            "NIGHT" => Ok(BuiltinShift::Night),
            "FULL" => Ok(BuiltinShift::Full),
            _ => Err(()),
        }
    }
}

/// Identifier of a shift definition, unique across built-in and custom types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShiftId {
    Builtin(BuiltinShift),
    Custom(CustomShiftId),
}

impl ShiftId {
    pub const MORNING: ShiftId = ShiftId::Builtin(BuiltinShift::Morning);
    pub const NIGHT: ShiftId = ShiftId::Builtin(BuiltinShift::Night);
    pub const FULL: ShiftId = ShiftId::Builtin(BuiltinShift::Full);

    pub fn is_custom(&self) -> bool {
        matches!(self, ShiftId::Custom(_))
    }

    pub fn builtin(&self) -> Option<BuiltinShift> {
        match self {
            ShiftId::Builtin(kind) => Some(*kind),
            ShiftId::Custom(_) => None,
        }
    }
}

impl From<BuiltinShift> for ShiftId {
    fn from(kind: BuiltinShift) -> Self {
        ShiftId::Builtin(kind)
    }
}

impl From<CustomShiftId> for ShiftId {
    fn from(id: CustomShiftId) -> Self {
        ShiftId::Custom(id)
    }
}

impl fmt::Display for ShiftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftId::Builtin(kind) => f.write_str(kind.as_str()),
            ShiftId::Custom(id) => write!(f, "{}", id),
        }
    }
}

impl FromStr for ShiftId {
    type Err = ShiftIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(kind) = trimmed.parse::<BuiltinShift>() {
            return Ok(ShiftId::Builtin(kind));
        }
        trimmed
            .parse::<CustomShiftId>()
            .map(ShiftId::Custom)
            .map_err(|_| ShiftIdParseError(s.to_string()))
    }
}

impl Serialize for ShiftId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ShiftId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Whether a shift counts as work or as a leave/absence day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftCategory {
    #[default]
    Work,
    Leave,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftDefinition {
    pub id: ShiftId,
    pub label: String,
    pub hours: u32,
    pub color: String,
    pub is_custom: bool,
    #[serde(default = "default_start_time")]
    pub start_time: NaiveTime,
    #[serde(default)]
    pub category: ShiftCategory,
}

pub fn default_start_time() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN)
}

impl ShiftDefinition {
    pub fn builtin(kind: BuiltinShift) -> Self {
        Self {
            id: ShiftId::Builtin(kind),
            label: kind.default_label().to_string(),
            hours: kind.default_hours(),
            color: kind.color().to_string(),
            is_custom: false,
            start_time: kind.start_time(),
            category: ShiftCategory::Work,
        }
    }

    pub fn custom(label: String, hours: u32, color: String, category: ShiftCategory) -> Self {
        Self {
            id: ShiftId::Custom(CustomShiftId::new()),
            label,
            hours,
            color,
            is_custom: true,
            start_time: default_start_time(),
            category,
        }
    }

    pub fn is_leave(&self) -> bool {
        self.category == ShiftCategory::Leave
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_defaults_match_catalog_contract() {
        let morning = ShiftDefinition::builtin(BuiltinShift::Morning);
        assert_eq!(morning.hours, 8);
        assert_eq!(morning.start_time, NaiveTime::from_hms_opt(8, 0, 0).unwrap());

        let night = ShiftDefinition::builtin(BuiltinShift::Night);
        assert_eq!(night.hours, 16);
        assert_eq!(night.start_time, NaiveTime::from_hms_opt(16, 0, 0).unwrap());

        let full = ShiftDefinition::builtin(BuiltinShift::Full);
        assert_eq!(full.hours, 24);
        assert!(!full.is_custom);
    }

    #[test]
    fn shift_id_parses_builtin_names_case_insensitively() {
        assert_eq!("MORNING".parse::<ShiftId>().unwrap(), ShiftId::MORNING);
        assert_eq!("night".parse::<ShiftId>().unwrap(), ShiftId::NIGHT);
        assert_eq!(" Full ".parse::<ShiftId>().unwrap(), ShiftId::FULL);
    }

    #[test]
    fn shift_id_parses_custom_uuid() {
        let id = CustomShiftId::new();
        let parsed: ShiftId = id.to_string().parse().unwrap();
        assert_eq!(parsed, ShiftId::Custom(id));
        assert!(parsed.is_custom());
    }

    #[test]
    fn shift_id_rejects_unknown_tokens() {
        let err = "EVENING".parse::<ShiftId>().unwrap_err();
        assert_eq!(err, ShiftIdParseError("EVENING".into()));
    }

    #[test]
    fn shift_id_serializes_as_string() {
        let v = serde_json::to_value(ShiftId::NIGHT).unwrap();
        assert_eq!(v, serde_json::json!("NIGHT"));
        let back: ShiftId = serde_json::from_value(v).unwrap();
        assert_eq!(back, ShiftId::NIGHT);
    }

    #[test]
    fn definition_without_category_defaults_to_work() {
        let id = CustomShiftId::new();
        let json = serde_json::json!({
            "id": id.to_string(),
            "label": "Evening",
            "hours": 6,
            "color": "#000000",
            "is_custom": true
        });
        let def: ShiftDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(def.category, ShiftCategory::Work);
        assert_eq!(def.start_time, default_start_time());
    }
}
