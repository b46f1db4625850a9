use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackError {
    #[error("Detector task failed: {0}")]
    JoinError(#[from] tokio::task::JoinError),

    #[error("Other error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TrackError>;
