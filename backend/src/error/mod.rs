use thiserror::Error;

/// Failure of the key-value persistence port.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("i/o failure on document `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize document `{key}`: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid document key `{0}`")]
    InvalidKey(String),
}

/// Failure reported by the alarm collaborator.
///
/// Never propagated past the reminder scheduler; it is logged and folded into
/// a success/failure result instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlarmError {
    #[error("alarm permission denied")]
    PermissionDenied,
    #[error("alarm service unavailable: {0}")]
    Unavailable(String),
    #[error("alarm rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown shift id `{0}`")]
pub struct ShiftIdParseError(pub String);

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Alarm(#[from] AlarmError),
    #[error("invalid import document: {0}")]
    InvalidImport(#[source] serde_json::Error),
    #[error("invalid year/month: {year}/{month}")]
    InvalidMonth { year: i32, month: u32 },
}

pub type EngineResult<T> = Result<T, EngineError>;
