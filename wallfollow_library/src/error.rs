//! Error types for the wall follower library

use thiserror::Error;
use wallfollow_core::CoreError;

#[derive(Error, Debug)]
pub enum WallFollowError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Runtime error: {0}")]
    Core(#[from] CoreError),
}

impl From<toml::de::Error> for WallFollowError {
    fn from(e: toml::de::Error) -> Self {
        WallFollowError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WallFollowError>;
