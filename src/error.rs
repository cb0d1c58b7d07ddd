use thiserror::Error;

/// Failure taxonomy at the backend boundary. A failed request surfaces one of
/// these and leaves whatever was previously displayed untouched; there is no
/// retry or partial-result recovery at this layer.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Network/transport failure before a response arrived.
    #[error("cannot reach backend: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx HTTP status from the backend.
    #[error("backend API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// 2xx response whose envelope carries `success: false`.
    #[error("backend reported failure: {0}")]
    Rejected(String),

    /// Successful envelope with no result payload.
    #[error("backend response contained no result data")]
    MissingData,

    /// Response body that does not decode as the documented shape.
    #[error("undecodable backend response: {0}")]
    Decode(#[source] serde_json::Error),
}
