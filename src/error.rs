//! Error types
//!
//! The muxer surface itself never fails; these errors come from the codec
//! helpers (SPS, ADTS, AudioSpecificConfig parsing) and are absorbed by the
//! tracks that call them.

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Media bitstream error
    Media(MediaError),
}

/// Errors raised while parsing codec bitstreams
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    /// Ran out of bits while reading a bitstream
    Truncated,
    /// NAL unit is empty or carries a forbidden bit
    InvalidNalu,
    /// Sequence parameter set could not be parsed
    InvalidSps,
    /// ADTS header missing sync word or too short
    InvalidAdtsHeader,
    /// AudioSpecificConfig could not be parsed
    InvalidAacConfig,
}

impl std::fmt::Display for MediaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaError::Truncated => write!(f, "Bitstream truncated"),
            MediaError::InvalidNalu => write!(f, "Invalid NAL unit"),
            MediaError::InvalidSps => write!(f, "Invalid sequence parameter set"),
            MediaError::InvalidAdtsHeader => write!(f, "Invalid ADTS header"),
            MediaError::InvalidAacConfig => write!(f, "Invalid AudioSpecificConfig"),
        }
    }
}

impl std::error::Error for MediaError {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Media(e) => write!(f, "Media error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Media(e) => Some(e),
        }
    }
}

impl From<MediaError> for Error {
    fn from(e: MediaError) -> Self {
        Error::Media(e)
    }
}
