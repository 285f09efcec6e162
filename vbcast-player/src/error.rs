//! Error types for vbcast-player
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use thiserror::Error;

/// Main error type for vbcast-player
#[derive(Error, Debug)]
pub enum Error {
    /// Player control task is gone (shut down or panicked)
    #[error("Player task is not running")]
    PlayerStopped,

    /// Broadcast script could not be read or parsed
    #[error("Script error: {0}")]
    Script(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using vbcast-player Error
pub type Result<T> = std::result::Result<T, Error>;

/// Why listening to a voice broadcast failed
///
/// Carried by `PlayingState::Error`; comparable so that repeated identical
/// failures do not produce duplicate state notifications.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListeningError {
    /// The chunk content could not be retrieved
    #[error("Unable to download audio chunk: {0}")]
    Download(String),

    /// The decoding/output engine reported a failure
    #[error("Unable to play audio chunk (what={what}, extra={extra})")]
    UnableToPlay { what: i32, extra: i32 },
}

/// Failure reported by a media backend or one of its units
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    /// Engine specific error codes
    #[error("Media engine error (what={what}, extra={extra})")]
    Engine { what: i32, extra: i32 },

    /// Operation not allowed in the unit's current state
    #[error("Invalid media unit state: {0}")]
    InvalidState(String),
}

/// Generic engine code used when a unit fails outside of engine codes
pub const MEDIA_ERROR_UNKNOWN: i32 = 1;

impl From<MediaError> for ListeningError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::Engine { what, extra } => ListeningError::UnableToPlay { what, extra },
            MediaError::InvalidState(_) => ListeningError::UnableToPlay {
                what: MEDIA_ERROR_UNKNOWN,
                extra: 0,
            },
        }
    }
}
