use std::fmt;

/// Category of a row source error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Column names or type descriptors could not be produced.
    Metadata,
    /// I/O or network failure while reading rows.
    Io,
    /// Malformed input (bad line, bad encoding).
    Format,
    /// A driver value could not be coerced into the destination cell.
    Conversion,
    /// Invalid state or generic failure.
    Logic,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Metadata => f.write_str("metadata"),
            ErrorKind::Io => f.write_str("io"),
            ErrorKind::Format => f.write_str("format"),
            ErrorKind::Conversion => f.write_str("conversion"),
            ErrorKind::Logic => f.write_str("logic"),
        }
    }
}

/// Error reported by a row source, returned by all `RowSource` methods.
///
/// `Clone + PartialEq` so that a scanner can keep it as sticky state and
/// callers can compare against the exact error a source produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: ErrorKind,
    message: String,
}

impl SourceError {
    pub fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self { kind, message: msg.into() }
    }

    pub fn metadata(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Metadata, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, msg)
    }

    pub fn format(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Format, msg)
    }

    pub fn conversion(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conversion, msg)
    }

    pub fn logic(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Logic, msg)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Add context to the error, preserving the original ErrorKind.
    ///
    /// Produces: `"context: original message"`.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{ctx}: {}", self.message),
        }
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::error::Error for SourceError {}

// ---------------------------------------------------------------------------
// From impls: standard error types → SourceError with correct ErrorKind
// ---------------------------------------------------------------------------

impl From<std::io::Error> for SourceError {
    fn from(e: std::io::Error) -> Self {
        Self::io(e.to_string())
    }
}

impl From<std::str::Utf8Error> for SourceError {
    fn from(e: std::str::Utf8Error) -> Self {
        Self::format(e.to_string())
    }
}

impl From<std::string::FromUtf8Error> for SourceError {
    fn from(e: std::string::FromUtf8Error) -> Self {
        Self::format(e.to_string())
    }
}

impl From<std::num::ParseIntError> for SourceError {
    fn from(e: std::num::ParseIntError) -> Self {
        Self::conversion(e.to_string())
    }
}

impl From<std::num::ParseFloatError> for SourceError {
    fn from(e: std::num::ParseFloatError) -> Self {
        Self::conversion(e.to_string())
    }
}

impl From<chrono::ParseError> for SourceError {
    fn from(e: chrono::ParseError) -> Self {
        Self::conversion(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_keeps_kind() {
        let err = SourceError::io("connection reset").with_context("row 3");
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.message(), "row 3: connection reset");
        assert_eq!(err.to_string(), "[io] row 3: connection reset");
    }

    #[test]
    fn parse_errors_are_conversions() {
        let err: SourceError = "abc".parse::<i64>().unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Conversion);
    }
}
