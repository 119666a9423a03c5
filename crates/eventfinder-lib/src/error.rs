use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the eventfinder library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A required environment variable was absent or blank.
    #[error("missing required configuration {var}")]
    MissingConfig { var: &'static str },

    /// A configuration value was present but could not be parsed.
    #[error("invalid configuration {var}={value:?}: {reason}")]
    InvalidConfig {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// Raised when a `lat,lng` pair could not be parsed or is out of range.
    #[error("invalid coordinates {input:?}; expected LAT,LNG within [-90,90] and [-180,180]")]
    InvalidCoordinates { input: String },

    /// Raised when a date preset name is not recognised.
    #[error("unknown date preset {name:?}; expected one of today, tomorrow, week, custom")]
    UnknownDatePreset { name: String },

    /// Raised when a custom date range is incomplete or reversed.
    #[error("invalid date range: {message}")]
    InvalidDateRange { message: String },

    /// A hosted service answered with a non-success status.
    #[error("{service} request failed with status {status}")]
    RemoteStatus {
        service: &'static str,
        status: reqwest::StatusCode,
    },

    /// A hosted service answered with a payload we could not interpret.
    #[error("unexpected {service} response: {message}")]
    UnexpectedResponse {
        service: &'static str,
        message: String,
    },

    /// A service URL could not be assembled.
    #[error("invalid URL {url:?}: {message}")]
    InvalidUrl { url: String, message: String },

    /// The CMS story did not contain an `eventList` block.
    #[error("story {slug} does not contain an eventList block")]
    MissingEventList { slug: String },

    /// No suitable project directories could be resolved for this platform.
    #[error("failed to resolve project directories for durable storage")]
    ProjectDirsUnavailable,

    /// Raised when the durable storage file could not be replaced.
    #[error("failed to persist {path}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Wrapper for JSON (de)serialisation errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for failures of a hosted service call (network, status or payload).
    ///
    /// Coordinators fall back to neutral results on any failure but log these
    /// at `warn`; anything else points at a local defect and is logged at
    /// `error`.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::RemoteStatus { .. } | Error::UnexpectedResponse { .. }
        )
    }
}
