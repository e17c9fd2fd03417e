//! Model listing error type.

use thiserror::Error;

/// Errors that can occur while listing a provider's models.
#[derive(Debug, Error)]
pub enum ModelListError {
    #[error("No base URL configured for provider {0}")]
    MissingBaseUrl(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to fetch models: {status} - {detail}")]
    Status { status: u16, detail: String },
}
