/*!
 * Error types for the ytdualsub application.
 *
 * This module contains custom error types for the transcript service client
 * and for the per-video batch pipeline, using the thiserror crate for
 * ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to the transcript service
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the service itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the service
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Main application error type.
///
/// Every variant except [`AppError::InputFileUnreadable`] and
/// [`AppError::Interrupted`] is recoverable at the per-video boundary.
#[derive(Error, Debug)]
pub enum AppError {
    /// The input string is not a recognized video URL
    #[error("Invalid video URL: {0}")]
    InvalidUrl(String),

    /// Neither a source-language track nor a translatable fallback exists
    #[error("No transcript available for video {video_id}: {reason}")]
    NoTranscriptAvailable {
        /// Video identifier
        video_id: String,
        /// Why the lookup failed
        reason: String,
    },

    /// The display title could not be resolved
    #[error("Title lookup failed: {0}")]
    TitleLookupFailed(String),

    /// The rendered report could not be written
    #[error("Failed to write {path}: {message}")]
    FileWriteFailed {
        /// Target file path
        path: String,
        /// Underlying I/O message
        message: String,
    },

    /// The URL list could not be read
    #[error("Cannot read input file {path}: {message}")]
    InputFileUnreadable {
        /// Input file path
        path: String,
        /// Underlying I/O message
        message: String,
    },

    /// The batch was interrupted by the user
    #[error("Interrupted by user")]
    Interrupted,

    /// Error from the transcript service
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    /// Whether this error must abort the whole batch
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InputFileUnreadable { .. } | Self::Interrupted)
    }
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
