pub mod kv;
pub mod schedule;
pub mod settings;
pub mod shift_catalog;

pub use kv::{InMemoryStore, JsonFileStore, KeyValueStore};
pub use schedule::{AssignOutcome, ImportOutcome, ScheduleStore};
pub use shift_catalog::ShiftCatalog;
