//! Error types for unonenote library.

use std::io;
use thiserror::Error;

/// Result type alias for unonenote operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during OneNote conversion.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error reported by the XML reader.
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The source document is malformed or not a OneNote document tree.
    #[error("Malformed document: {0}")]
    DocumentFormat(String),

    /// A writer was handed an unusable destination or payload.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The document source does not know the requested object.
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// An embedded resource payload could not be decoded.
    #[error("Resource decoding error: {0}")]
    ResourceDecode(String),

    /// Error during rendering of reports.
    #[error("Rendering error: {0}")]
    Render(String),
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::ResourceDecode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::DocumentFormat("no root element".to_string());
        assert_eq!(err.to_string(), "Malformed document: no root element");

        let err = Error::InvalidArgument("empty file name".to_string());
        assert_eq!(err.to_string(), "Invalid argument: empty file name");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
