use thiserror::Error;

/// Failures raised by the gateway, the aggregators and the local stores.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No local token when an authenticated call is attempted.
    #[error("no authentication token found")]
    Unauthenticated,

    #[error("network error occurred: {0}")]
    NetworkFailure(String),

    #[error("{message}")]
    RemoteRejected { status: u16, message: String },

    #[error("no semester records reported")]
    EmptyInput,

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("local storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether the message is meant to be shown to the user verbatim.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            ClientError::Unauthenticated | ClientError::RemoteRejected { .. }
        )
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::NetworkFailure(err.to_string())
    }
}
