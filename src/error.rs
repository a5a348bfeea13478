use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("scan root does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
