//! Error taxonomy for weather lookups.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OwmError {
    /// The provider answered with a non-success status.
    #[error("{code} error - {message}")]
    Upstream { code: String, message: String },

    #[error("Failed to reach OpenWeatherMap: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("OpenWeatherMap returned a malformed body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    /// The snapshot does not carry the requested field.
    #[error("No data for `{field}` in the weather snapshot")]
    NoData { field: &'static str },

    #[error(
        "No API key is saved... kindly provide an API key.\n\
         Hint: pass `--key <KEY>` (add `-s` to remember it)."
    )]
    MissingCredential,

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

impl OwmError {
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }

    /// Connection failures and undecodable bodies both count as transport problems.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::MalformedBody(_))
    }
}
