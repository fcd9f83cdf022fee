use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Mandatory working hours on an eve (half-day) holiday.
pub const HALF_DAY_HOURS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidayKind {
    Official,
    Religious,
    HalfDay,
    PartialDay,
}

impl HolidayKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HolidayKind::Official => "official",
            HolidayKind::Religious => "religious",
            HolidayKind::HalfDay => "half_day",
            HolidayKind::PartialDay => "partial_day",
        }
    }

    /// Official and religious holidays are whole days off.
    pub fn is_full_holiday(&self) -> bool {
        matches!(self, HolidayKind::Official | HolidayKind::Religious)
    }

    /// `None` for partial days, whose hours are decided by the work hour rule.
    pub fn mandatory_hours(&self) -> Option<u32> {
        match self {
            HolidayKind::Official | HolidayKind::Religious => Some(0),
            HolidayKind::HalfDay => Some(HALF_DAY_HOURS),
            HolidayKind::PartialDay => None,
        }
    }
}

impl FromStr for HolidayKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "official" => Ok(HolidayKind::Official),
            "religious" => Ok(HolidayKind::Religious),
            "half_day" => Ok(HolidayKind::HalfDay),
            "partial_day" => Ok(HolidayKind::PartialDay),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
    pub kind: HolidayKind,
    pub mandatory_hours: Option<u32>,
}

impl Holiday {
    pub fn new(date: NaiveDate, name: impl Into<String>, kind: HolidayKind) -> Self {
        Self {
            date,
            name: name.into(),
            kind,
            mandatory_hours: kind.mandatory_hours(),
        }
    }
}
