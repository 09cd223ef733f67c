use thiserror::Error;

/// Errors raised by the ambient layers (configuration, I/O, snapshots).
///
/// Simulation failures such as unreachable targets are not errors; they
/// surface as `None` or as fallback agent states.
#[derive(Error, Debug)]
pub enum SkulkError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SkulkError>;
