use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CountError {
    #[error("Failed to decode image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Debug directory is not empty: {}", .0.display())]
    DebugDirNotEmpty(PathBuf),
}

pub type Result<T> = std::result::Result<T, CountError>;
