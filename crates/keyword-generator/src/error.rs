//! Error types for keyword parsing and value generation.

/// Error type for keyword and builder operations.
#[derive(Debug, thiserror::Error)]
pub enum KeywordError {
    /// The keyword string is malformed or contains unrecognized content
    #[error("Invalid keyword format: {0}")]
    InvalidFormat(String),

    /// A builder or generator was called with unusable arguments
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The start timestamp could not be parsed
    #[error("'{value}' is not a valid start datetime: {source}")]
    InvalidStart {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

impl KeywordError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        Self::InvalidFormat(message.into())
    }

    pub(crate) fn argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Returns true for errors caused by malformed keyword text.
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, Self::InvalidFormat(_))
    }

    /// Returns true for errors caused by unusable argument values.
    ///
    /// An unparseable `{start=...}` timestamp counts as an invalid argument.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_) | Self::InvalidStart { .. })
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, KeywordError>;
