use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid store path: {0:?}")]
    InvalidPath(String),

    #[error("Value at {0} is not an integer")]
    NotANumber(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store connection closed")]
    Disconnected,
}

impl StoreError {
    /// Only a lost connection can succeed on a second try; the rest are bad requests.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Disconnected)
    }
}
