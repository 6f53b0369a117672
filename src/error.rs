use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error("failed to load config: {0}")]
    Config(#[from] config::ConfigError),

    #[error("failed to parse colorscheme '{}': {source}", path.display())]
    SchemeFile {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid color \"{token}\": {reason}")]
    InvalidColor { token: String, reason: String },

    #[error("palette contains no colors")]
    EmptyPalette,

    #[error("colorscheme '{0}' not found")]
    UnknownScheme(String),

    #[error("invalid value for {key}: '{value}'")]
    InvalidSetting { key: &'static str, value: String },
}
