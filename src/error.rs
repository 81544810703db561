use std::io;
use std::path::PathBuf;

/// Errors from loading engine settings or macro tables. Key processing itself
/// never fails.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("macro with empty trigger (expansion {0:?})")]
    EmptyTrigger(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
