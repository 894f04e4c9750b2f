use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    MissingItem(String),
    InvalidItem(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::MissingItem(key) => write!(f, "Unknown configuration item: {}", key),
            ConfigError::InvalidItem(e) => write!(f, "Malformed configuration item: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

/// Errors raised while turning a raw bus payload into a session entity.
#[derive(Debug)]
pub enum NormalizeError {
    Json(serde_json::Error),
    Timestamp(String),
    /// The record carried no resolvable honeypot reference. This is an
    /// upstream contract violation and must be surfaced loudly.
    MissingHoneypot(String),
    MissingField(&'static str),
}

impl fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeError::Json(e) => write!(f, "Malformed session payload: {}", e),
            NormalizeError::Timestamp(e) => write!(f, "Bad timestamp: {}", e),
            NormalizeError::MissingHoneypot(id) => {
                write!(f, "Record {} carries no honeypot reference", id)
            }
            NormalizeError::MissingField(field) => {
                write!(f, "Record is missing required field '{}'", field)
            }
        }
    }
}

impl std::error::Error for NormalizeError {}

impl From<serde_json::Error> for NormalizeError {
    fn from(err: serde_json::Error) -> Self {
        NormalizeError::Json(err)
    }
}

#[derive(Debug)]
pub enum StorageError {
    ConnectionFailed(sea_orm::DbErr),
    ReadFailed(sea_orm::DbErr),
    WriteFailed(sea_orm::DbErr),
    /// A foreign key (honeypot, client or session id) did not resolve.
    MissingRecord(String),
    /// A stored row could not be mapped back onto a domain entity.
    Corrupt(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ConnectionFailed(e) => write!(f, "Storage connection failed: {}", e),
            StorageError::ReadFailed(e) => write!(f, "Storage read failed: {}", e),
            StorageError::WriteFailed(e) => write!(f, "Storage write failed: {}", e),
            StorageError::MissingRecord(id) => write!(f, "No such record: {}", id),
            StorageError::Corrupt(e) => write!(f, "Corrupt stored record: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

/// Top-level error for one ingestion pass.
#[derive(Debug)]
pub enum EngineError {
    Normalize(NormalizeError),
    Storage(StorageError),
    Config(ConfigError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Normalize(e) => write!(f, "Normalization error: {}", e),
            EngineError::Storage(e) => write!(f, "Storage error: {}", e),
            EngineError::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<NormalizeError> for EngineError {
    fn from(err: NormalizeError) -> Self {
        EngineError::Normalize(err)
    }
}

impl From<StorageError> for EngineError {
    fn from(err: StorageError) -> Self {
        EngineError::Storage(err)
    }
}

impl From<ConfigError> for EngineError {
    fn from(err: ConfigError) -> Self {
        EngineError::Config(err)
    }
}
