//! Cached bridge username.
//!
//! Pairing needs a physical button press, so the username it yields is kept
//! on disk and reused across restarts.

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::HueError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Bridge base URL the username was issued by.
    pub bridge: String,
    pub username: String,
}

/// Read cached credentials. A missing file is not an error.
///
/// # Errors
///
/// Returns [`HueError::Credentials`] when the file exists but cannot be
/// read, or [`HueError::CredentialsFormat`] when it is not valid JSON.
pub async fn load(path: &Path) -> Result<Option<Credentials>, HueError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(HueError::CredentialsFormat),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(HueError::Credentials(err)),
    }
}

/// Write credentials, replacing any previous file.
///
/// # Errors
///
/// Returns [`HueError::Credentials`] when the file cannot be written.
pub async fn save(path: &Path, credentials: &Credentials) -> Result<(), HueError> {
    let bytes = serde_json::to_vec_pretty(credentials).map_err(HueError::CredentialsFormat)?;
    tokio::fs::write(path, bytes)
        .await
        .map_err(HueError::Credentials)
}
