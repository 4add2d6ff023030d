//! PH24 API client error types
//!
//! Remote outcomes (non-2xx, malformed bodies, transport failures) are never
//! errors here; they are carried by [`crate::ApiResponse`]. These variants
//! cover the cases where a client cannot be built or an input cannot be
//! expressed on the wire.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API key contains characters that are not allowed in an HTTP header")]
    InvalidApiKey,

    #[error("API URL is not valid: {0}")]
    InvalidUrl(String),

    #[error("HTTP client could not be constructed: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Unknown server action: {0}")]
    UnknownAction(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;
