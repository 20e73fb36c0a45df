use rdf_core::{ErrorCode, ParseError as CoreParseError};
use std::error::Error;
use std::fmt;
use std::io;

/// Error returned while parsing an RDF document through the façade.
///
/// Wraps either an [`io::Error`] from the underlying reader or the
/// [`rdf_core::ParseError`] raised by whichever concrete decoder handled
/// the format. [`RdfParseError::code`] classifies the failure the same way
/// regardless of which decoder produced it.
#[derive(Debug)]
pub enum RdfParseError {
    /// I/O error during parsing (file not found...).
    Io(io::Error),
    /// An error in the syntax of the parsed document, or an unsupported
    /// format request.
    Syntax(CoreParseError),
}

impl RdfParseError {
    pub(crate) fn unsupported_format(format: &'static str) -> Self {
        Self::Syntax(CoreParseError::new(
            ErrorCode::UnsupportedFormat,
            format,
            "this workspace has no decoder for this format",
        ))
    }

    /// The stable error classification, regardless of which decoder raised it.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Io(_) => Some(ErrorCode::IoError),
            Self::Syntax(e) => Some(e.code()),
        }
    }
}

impl fmt::Display for RdfParseError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => e.fmt(f),
            Self::Syntax(e) => e.fmt(f),
        }
    }
}

impl Error for RdfParseError {
    #[inline]
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Syntax(e) => Some(e),
        }
    }
}

impl From<CoreParseError> for RdfParseError {
    #[inline]
    fn from(error: CoreParseError) -> Self {
        Self::Syntax(error)
    }
}

impl From<io::Error> for RdfParseError {
    #[inline]
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}

impl From<RdfParseError> for io::Error {
    #[inline]
    fn from(error: RdfParseError) -> Self {
        match error {
            RdfParseError::Io(error) => error,
            RdfParseError::Syntax(error) => io::Error::new(io::ErrorKind::InvalidData, error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_classifies_as_unsupported() {
        let err = RdfParseError::unsupported_format("rdfxml");
        assert_eq!(err.code(), Some(ErrorCode::UnsupportedFormat));
    }

    #[test]
    fn io_error_classifies_as_io() {
        let err: RdfParseError = io::Error::new(io::ErrorKind::Other, "boom").into();
        assert_eq!(err.code(), Some(ErrorCode::IoError));
        assert!(matches!(err, RdfParseError::Io(_)));
    }

    #[test]
    fn converts_back_to_io_error() {
        let err = RdfParseError::unsupported_format("rdfxml");
        let io_err: io::Error = err.into();
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidData);
    }
}
