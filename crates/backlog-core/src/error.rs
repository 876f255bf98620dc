use thiserror::Error;

#[derive(Debug, Error)]
pub enum BacklogError {
    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("invalid priority '{0}': expected critical, high, medium or low")]
    InvalidPriority(String),

    #[error("invalid level '{0}': expected high, medium or low")]
    InvalidLevel(String),

    #[error("issue tracker request failed: {0}")]
    Tracker(String),

    #[error("spec tool not found: install 'specify' or put it on PATH")]
    SpecToolNotFound,

    #[error("failed to spawn spec tool: {0}")]
    SpecToolSpawn(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BacklogError>;
