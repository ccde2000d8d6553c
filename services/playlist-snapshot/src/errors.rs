//!
//! src/errors.rs  Andrew Belles  Oct 19th, 2026
//!
//! Defines the error enum for the snapshot exporter. The first four
//! variants name the step of the run that failed
//!
//!

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("config error: {0}")]
    Config(String),
    #[error("spotify auth error: {0}")]
    Auth(String),
    #[error("playlist fetch error: {0}")]
    Fetch(String),
    #[error("revision lookup error: {0}")]
    Lookup(String),
    #[error("publish error: {0}")]
    Publish(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error)
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self { SyncError::Http(e.to_string()) }
}

impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self { SyncError::Parse(e.to_string()) }
}

/// Turns a non 2xx response into the error variant of the calling step,
/// keeping the status and whatever body the server sent back
pub async fn ensure_success(
    response: reqwest::Response,
    wrap: fn(String) -> SyncError
) -> Result<reqwest::Response, SyncError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(wrap(format!("{status}: {}", body.trim())))
}
