//! Persisted API key (`{ "api_key": "..." }`) and the key resolution order.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, io::ErrorKind, path::Path};

use crate::error::OwmError;

/// Default location of the credential file, relative to the working directory.
pub const DEFAULT_CREDENTIALS_FILE: &str = "credentials.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub api_key: Option<String>,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { api_key: Some(api_key.into()) }
    }

    /// Load credentials from `path`. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("Failed to read credentials file: {}", path.display())
                });
            }
        };

        let creds: Credentials = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse credentials file: {}", path.display()))?;

        Ok(Some(creds))
    }

    /// Save credentials to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create credentials directory: {}", parent.display())
            })?;
        }

        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize credentials")?;

        fs::write(path, json)
            .with_context(|| format!("Failed to write credentials file: {}", path.display()))?;

        Ok(())
    }

    fn key(&self) -> Option<&str> {
        non_blank(self.api_key.as_deref())
    }
}

/// Pick the API key to use: an explicit key wins over a persisted one.
pub fn resolve_api_key(
    explicit: Option<&str>,
    persisted: Option<&Credentials>,
) -> Result<String, OwmError> {
    non_blank(explicit)
        .or_else(|| persisted.and_then(Credentials::key))
        .map(str::to_owned)
        .ok_or(OwmError::MissingCredential)
}

fn non_blank(key: Option<&str>) -> Option<&str> {
    key.map(str::trim).filter(|k| !k.is_empty())
}
