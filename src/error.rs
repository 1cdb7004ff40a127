use thiserror::Error;

/// Crate-wide error type.
///
/// Nothing here is fatal: host and network failures are reported to the
/// caller and retried on the next user action or scheduler tick.
#[derive(Debug, Error)]
pub enum WallpaperError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("host error: {0}")]
    Host(String),

    #[error("unknown wallpaper source: {0}")]
    InvalidSource(String),

    #[error("auto-switch interval must be positive, got {0}s")]
    InvalidInterval(u64),
}

pub type Result<T> = std::result::Result<T, WallpaperError>;
