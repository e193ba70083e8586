//! Error types for spotshuffle.
//!
//! Library code returns these typed errors. The CLI layer converts them into
//! user-facing messages and decides when to point the user at `spotshuffle auth`.

use thiserror::Error;

/// Failure of a single call made through [`crate::spotify::client::SpotifyClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network failures and timeouts. The reqwest error is kept as text.
    #[error("request failed: {0}")]
    Transport(String),

    /// Non-success HTTP status, with the message Spotify reported when the
    /// body could be parsed.
    #[error("{status} - {message}")]
    Status { status: u16, message: String },

    /// A success response whose body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The session provider could not produce a session.
    #[error("session unavailable: {0}")]
    Session(String),
}

impl ApiError {
    /// Message used when the error body is missing or unparseable.
    pub const UNKNOWN_MESSAGE: &'static str = "Unknown error";

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for a 401 that survived the one-shot replay.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<SessionStoreError> for ApiError {
    fn from(err: SessionStoreError) -> Self {
        ApiError::Session(err.to_string())
    }
}

/// Album operations, each wrapping the underlying [`ApiError`] with the
/// operation that failed.
#[derive(Debug, Error)]
pub enum AlbumError {
    #[error("failed to fetch saved albums: {0}")]
    SavedAlbums(#[source] ApiError),

    #[error("failed to fetch album details for {id}: {source}")]
    Details {
        id: String,
        #[source]
        source: ApiError,
    },

    #[error("failed to get random albums: {0}")]
    Random(#[source] Box<AlbumError>),
}

impl AlbumError {
    /// The innermost API error, if any.
    pub fn api_error(&self) -> &ApiError {
        match self {
            AlbumError::SavedAlbums(e) => e,
            AlbumError::Details { source, .. } => source,
            AlbumError::Random(inner) => inner.api_error(),
        }
    }
}

/// Reading or writing the persisted session file.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file is malformed: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}
