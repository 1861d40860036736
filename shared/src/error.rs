use thiserror::Error;

/// Prefix shown in front of every transport failure.
pub const TRANSPORT_ERROR_PREFIX: &str = "处理图像时出错 | Error processing image";

/// Why a removal request could not be completed or understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Server error: {status} - {body}")]
    Status { status: u16, body: String },
    #[error("Failed to parse response: {0}")]
    Decode(String),
    #[error("Response carried neither a result nor an error")]
    EmptyReply,
}

impl TransportError {
    /// Prefers the plain text of a failure, falling back to its debug form.
    pub fn network<D>(text: Option<String>, debug: D) -> Self
    where
        D: FnOnce() -> String,
    {
        match text {
            Some(text) if !text.trim().is_empty() => Self::Network(text),
            _ => Self::Network(debug()),
        }
    }
}

/// The message a failed submission leaves on the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    /// The service answered and reported the failure itself.
    #[error("{0}")]
    Service(String),
    #[error("{TRANSPORT_ERROR_PREFIX}: {0}")]
    Transport(#[from] TransportError),
}

impl OperationError {
    pub fn service<S: Into<String>>(msg: S) -> Self {
        Self::Service(msg.into())
    }
}
