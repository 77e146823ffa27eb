/// Error types for mtfind.
///
/// The matching engine itself never fails: degenerate inputs (no corpus, an
/// empty pattern, a repeated search) are silent no-ops. Everything that does
/// touch the outside world goes through [`SearchError`]:
///
/// - loading a corpus from disk ([`crate::corpus::Corpus::load`])
/// - decoding file contents as UTF-8
/// - reading and merging YAML configuration ([`crate::config::SearchConfig`])
///
/// Callers match on the variants to decide how to report a failure:
/// ```rust,ignore
/// match Corpus::load(path, EncodingMode::FailFast) {
///     Ok(corpus) => // search it,
///     Err(SearchError::FileNotFound(path)) => // report missing file,
///     Err(e) => // report other errors
/// }
/// ```
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for fallible mtfind operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors that can occur while preparing a search
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid UTF-8 in file {path}: {source}")]
    EncodingError {
        path: PathBuf,
        source: std::str::Utf8Error,
    },
}

impl SearchError {
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn invalid_pattern(pattern: impl Into<String>) -> Self {
        Self::InvalidPattern(pattern.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn encoding_error(path: impl Into<PathBuf>, source: std::str::Utf8Error) -> Self {
        Self::EncodingError {
            path: path.into(),
            source,
        }
    }

    /// Maps an I/O error raised while opening `path` onto the matching variant
    pub fn from_io(err: std::io::Error, path: &Path) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::file_not_found(path),
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(path),
            _ => Self::IoError(err),
        }
    }
}

impl From<config::ConfigError> for SearchError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

impl From<serde_yaml::Error> for SearchError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_creation() {
        let path = Path::new("test.txt");
        let err = SearchError::file_not_found(path);
        assert!(matches!(err, SearchError::FileNotFound(_)));

        let err = SearchError::permission_denied(path);
        assert!(matches!(err, SearchError::PermissionDenied(_)));

        let err = SearchError::invalid_pattern("");
        assert!(matches!(err, SearchError::InvalidPattern(_)));

        let err = SearchError::config_error("bad threshold");
        assert!(matches!(err, SearchError::ConfigError(_)));
    }

    #[test]
    fn test_error_messages() {
        let err = SearchError::invalid_pattern("pattern is empty");
        assert_eq!(err.to_string(), "Invalid pattern: pattern is empty");

        let err = SearchError::config_error("Missing required field".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing required field"
        );

        let err = SearchError::file_not_found("test.txt");
        assert_eq!(err.to_string(), "File not found: test.txt");
    }

    #[test]
    fn test_from_io_maps_kinds() {
        let path = Path::new("input.txt");

        let err = SearchError::from_io(io::Error::from(io::ErrorKind::NotFound), path);
        assert!(matches!(err, SearchError::FileNotFound(p) if p == path));

        let err = SearchError::from_io(io::Error::from(io::ErrorKind::PermissionDenied), path);
        assert!(matches!(err, SearchError::PermissionDenied(_)));

        let err = SearchError::from_io(io::Error::from(io::ErrorKind::UnexpectedEof), path);
        assert!(matches!(err, SearchError::IoError(_)));
    }

    #[test]
    fn test_encoding_error_message() {
        let source = std::str::from_utf8(&[0xff, 0xfe]).unwrap_err();
        let err = SearchError::encoding_error("bad.txt", source);
        assert!(err.to_string().starts_with("Invalid UTF-8 in file bad.txt"));
    }
}
