//! Credentials file loading.
//!
//! One opaque init-data string per line. Lines are trimmed and blank lines
//! skipped. The file is read once at startup; a missing file is fatal.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::types::{Credential, MajorError};

/// Load account credentials from `path`.
pub fn load_credentials(path: &str) -> Result<Vec<Credential>> {
    if !Path::new(path).exists() {
        return Err(MajorError::Credentials(format!("file not found: {path}")).into());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read credentials from {path}"))?;

    let credentials = parse_credentials(&contents);
    if credentials.is_empty() {
        warn!(path, "Credentials file has no accounts");
    } else {
        info!(path, accounts = credentials.len(), "Credentials loaded");
    }

    Ok(credentials)
}

/// Split file contents into credentials, ignoring blank lines.
pub fn parse_credentials(contents: &str) -> Vec<Credential> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Credential::new)
        .collect()
}
