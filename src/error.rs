use thiserror::Error;

/// Errors that can occur while crawling, extracting or storing recipes
#[derive(Error, Debug)]
pub enum HarvestError {
    /// URL is not a recipe page of the configured site
    #[error("Invalid recipe URL (expected prefix {prefix}): {url}")]
    InvalidSourceError { url: String, prefix: String },

    /// Failed to fetch a URL
    #[error("Failed to fetch URL: {0}")]
    FetchError(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP status {status} for {url}")]
    StatusError { url: String, status: u16 },

    /// Page was fetched but carries none of the recipe sections
    #[error("No recipe found on page: {0}")]
    NoRecipeFound(String),

    /// Failed to write a recipe to the database
    #[error("Database error: {0}")]
    PersistenceError(#[from] rusqlite::Error),

    /// Failed to read or write a file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to read or write JSON
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error parsing HTTP headers
    #[error("Header parse error: {0}")]
    HeaderError(#[from] reqwest::header::InvalidHeaderValue),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}
