//! Crate-wide error type.

use thiserror::Error;

/// Errors that can occur while fetching or assembling Census data.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error while reading or writing cached archives.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The downloaded archive could not be opened.
    #[error("invalid zip archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Shapefile or dBASE parsing failure.
    #[error("shapefile error: {0}")]
    Shapefile(String),

    /// The archive does not contain an expected member.
    #[error("archive is missing a {0} member")]
    MissingMember(&'static str),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An argument combination the Census Bureau does not serve.
    #[error("{dataset} is not available for {year}")]
    Unavailable { dataset: &'static str, year: u16 },

    /// A caller-supplied argument is invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The state identifier could not be resolved to a FIPS code.
    #[error("unknown state '{0}'; use a name, postal code, or two-digit FIPS code")]
    UnknownState(String),

    /// No county matched the supplied name.
    #[error("no county matches '{input}' in state {state}")]
    UnknownCounty { input: String, state: String },

    /// Several counties matched the supplied name.
    #[error("'{input}' matches {matches}; refine your selection")]
    AmbiguousCounty { input: String, matches: String },

    /// The referenced attribute column does not exist.
    #[error("column '{0}' not found")]
    UnknownColumn(String),

    /// Tables with mismatched columns cannot be concatenated.
    #[error("cannot concatenate tables with differing columns")]
    ColumnMismatch,

    /// No per-user cache directory is available on this platform.
    #[error("no cache directory available on this platform")]
    NoCacheDir,

    /// The Census geocoder rejected the request.
    #[error("geocoder request failed: {0}")]
    Geocoder(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
