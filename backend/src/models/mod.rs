//! Data models shared by the services and the persisted documents.

pub mod holiday;
pub mod reminder;
pub mod shift;
pub mod summary;
