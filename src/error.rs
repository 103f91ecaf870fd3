//! Error handling

/// Errors raised while seeding resources.
#[derive(Debug)]
pub enum SeederError {
    /// Filesystem operations failed
    Io(std::io::Error),
    /// The HTTP client failed to build, send or read a request
    Http(reqwest::Error),
    /// When DB operations fail
    Database(sea_orm::DbErr),
    /// The catalog could not be loaded or failed validation
    Catalog(String),
    /// The search provider returned something we can't use
    Search(String),
    /// Invalid startup configuration
    Config(String),
    /// A URL could not be built or parsed
    InvalidUrl(url::ParseError),
}

impl std::fmt::Display for SeederError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Http(err) => write!(f, "HTTP error: {err}"),
            Self::Database(err) => write!(f, "Database error: {err}"),
            Self::Catalog(message) => write!(f, "Catalog error: {message}"),
            Self::Search(message) => write!(f, "Search failed: {message}"),
            Self::Config(message) => write!(f, "Invalid configuration: {message}"),
            Self::InvalidUrl(err) => write!(f, "Invalid URL: {err}"),
        }
    }
}

impl std::error::Error for SeederError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Http(err) => Some(err),
            Self::Database(err) => Some(err),
            Self::InvalidUrl(err) => Some(err),
            Self::Catalog(_) | Self::Search(_) | Self::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for SeederError {
    fn from(err: std::io::Error) -> Self {
        SeederError::Io(err)
    }
}

impl From<reqwest::Error> for SeederError {
    fn from(err: reqwest::Error) -> Self {
        SeederError::Http(err)
    }
}

impl From<sea_orm::DbErr> for SeederError {
    fn from(err: sea_orm::DbErr) -> Self {
        SeederError::Database(err)
    }
}

impl From<serde_json::Error> for SeederError {
    fn from(err: serde_json::Error) -> Self {
        SeederError::Catalog(err.to_string())
    }
}

impl From<url::ParseError> for SeederError {
    fn from(err: url::ParseError) -> Self {
        SeederError::InvalidUrl(err)
    }
}
