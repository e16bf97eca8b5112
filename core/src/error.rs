use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("Invalid simulation result: {reason}")]
    InvalidResult { reason: String },

    #[error("No simulation result loaded")]
    NoResultLoaded,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlaybackError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidResult { reason: reason.into() }
    }
}

pub type PlaybackResult<T> = Result<T, PlaybackError>;
