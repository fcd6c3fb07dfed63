use crate::config_manager::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoteGraphError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing ground-truth label for agent: {0}")]
    MissingLabel(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, VoteGraphError>;
