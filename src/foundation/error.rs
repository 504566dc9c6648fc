use std::fmt;

/// Crate-wide result alias.
pub type BoothResult<T> = Result<T, BoothError>;

/// Classification reported by the external persistence endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceErrorKind {
    /// The endpoint rejected the payload (HTTP 422).
    Validation,
    /// The user session or CSRF token is no longer valid (HTTP 401/403/419).
    Session,
    /// Any other non-success status.
    Server,
    /// The request never produced a status.
    Network,
}

impl fmt::Display for PersistenceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Validation => "validation",
            Self::Session => "session",
            Self::Server => "server",
            Self::Network => "network",
        };
        f.write_str(s)
    }
}

/// Error taxonomy for the photobooth pipeline.
///
/// Frame and overlay failures are recovered inside the composite engine; configuration,
/// encoding and busy errors propagate to the caller.
#[derive(thiserror::Error, Debug)]
pub enum BoothError {
    #[error("configuration error: unknown layout '{0}'")]
    UnknownLayout(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("capture device error: {0}")]
    CaptureDevice(String),

    #[error("slot index {index} out of range (frame count {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("frame load error: {0}")]
    FrameLoad(String),

    #[error("overlay render error: {0}")]
    OverlayRender(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("persistence error ({kind}): {message}")]
    Persistence {
        kind: PersistenceErrorKind,
        message: String,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("a composite is already in progress")]
    Busy,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BoothError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn capture_device(msg: impl Into<String>) -> Self {
        Self::CaptureDevice(msg.into())
    }

    pub fn frame_load(msg: impl Into<String>) -> Self {
        Self::FrameLoad(msg.into())
    }

    pub fn overlay(msg: impl Into<String>) -> Self {
        Self::OverlayRender(msg.into())
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    pub fn persistence(kind: PersistenceErrorKind, msg: impl Into<String>) -> Self {
        Self::Persistence {
            kind,
            message: msg.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// `true` for errors that require restarting from layout selection.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::UnknownLayout(_) | Self::Configuration(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
