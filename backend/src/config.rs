use anyhow::anyhow;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::repositories::schedule::SCHEDULE_DOCUMENT;

pub const DEFAULT_DATA_DIR: &str = "./shiftbook-data";
pub const DEFAULT_TIME_ZONE: &str = "Europe/Istanbul";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data_dir: PathBuf,
    pub time_zone: Tz,
    /// Document key the schedule is stored under.
    pub schedule_store: String,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let data_dir = env::var("SHIFTBOOK_DATA_DIR")
            .unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string())
            .into();

        let time_zone_name =
            env::var("APP_TIMEZONE").unwrap_or_else(|_| DEFAULT_TIME_ZONE.to_string());
        let time_zone: Tz = time_zone_name
            .parse()
            .map_err(|_| anyhow!("Invalid APP_TIMEZONE value: {}", time_zone_name))?;

        let schedule_store = env::var("SHIFTBOOK_SCHEDULE_STORE")
            .ok()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| SCHEDULE_DOCUMENT.to_string());

        Ok(Config {
            data_dir,
            time_zone,
            schedule_store,
        })
    }
}
