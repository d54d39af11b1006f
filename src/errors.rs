/*!
 * Error types for the subtidy application.
 *
 * Each pipeline stage has its own error type so the controller can decide
 * which failures are recoverable for a single track. Built on thiserror.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when talking to a translation backend
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),
}

impl ProviderError {
    /// Whether retrying the same request later may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            Self::RequestFailed(_) | Self::ParseError(_) => false,
        }
    }
}

/// Errors that can occur while parsing or cleaning a subtitle track
#[derive(Error, Debug, PartialEq)]
pub enum SubtitleError {
    /// A timing line could not be parsed; the whole track is rejected
    #[error("Malformed track at line {line}: {reason} ({content:?})")]
    MalformedTrack {
        /// 1-based line number in the source document
        line: usize,
        /// Offending line content
        content: String,
        /// What was wrong with it
        reason: String,
    },

    /// A timestamp string is not in `[HH:]MM:SS,mmm` form
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Errors raised by the external subtitle converter
#[derive(Error, Debug)]
pub enum ConversionError {
    /// The input file is not a container the normalizer understands
    #[error("Unsupported subtitle format: {0}")]
    UnsupportedFormat(PathBuf),

    /// The converter process could not be started
    #[error("Failed to run converter: {0}")]
    Spawn(#[from] std::io::Error),

    /// The converter ran but exited unsuccessfully
    #[error("Converter exited with {status}: {stderr}")]
    Failed {
        /// Exit status as reported by the OS
        status: String,
        /// Filtered stderr output
        stderr: String,
    },

    /// The converter did not finish in time
    #[error("Converter timed out after {0} seconds")]
    Timeout(u64),
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The backend returned a different number of segments than were submitted
    #[error("Batch {batch} returned {received} segments for {expected} blocks")]
    SegmentCountMismatch {
        /// 1-based batch number
        batch: usize,
        /// Blocks submitted in the batch
        expected: usize,
        /// Segments returned by the backend
        received: usize,
    },

    /// Translation was requested without a usable target language
    #[error("Invalid translation request: {0}")]
    InvalidRequest(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from the format converter
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

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
