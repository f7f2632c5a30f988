use colmap_api::SourceError;

/// Errors produced while building or driving a `Scanner`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScanError {
    #[error("no row source supplied")]
    NilSource,

    #[error("source metadata unavailable")]
    SourceMetadata(#[source] SourceError),

    #[error("data type not valid for column")]
    InvalidDataType(#[source] SourceError),

    /// Error reported by the source itself while iterating. Displayed as-is.
    #[error(transparent)]
    Source(SourceError),
}

impl ScanError {
    /// Underlying source error, if this error wraps one.
    pub fn source_error(&self) -> Option<&SourceError> {
        match self {
            ScanError::NilSource => None,
            ScanError::SourceMetadata(e) | ScanError::InvalidDataType(e) | ScanError::Source(e) => {
                Some(e)
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("config parse: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("matcher #{index}: {reason}")]
    InvalidMatcher { index: usize, reason: String },
}
