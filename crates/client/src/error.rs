use chef_signer::SigningError;

/// Failure to get a request to the server and a response back.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("invalid header {name}: {message}")]
    InvalidHeader { name: String, message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("failed to sign request: {0}")]
    Signing(#[from] SigningError),
    #[error("failed to reach Chef server: {0}")]
    Transport(#[from] TransportError),
    #[error("Chef server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("response body is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid target data: {0}")]
    InvalidTargetData(String),
}

impl ApiError {
    /// HTTP status for errors the server itself reported.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
