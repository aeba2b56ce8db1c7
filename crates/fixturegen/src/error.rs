//! Errors for a generation run.
//!
//! [`GenerateError`] unifies engine, source and filesystem failures. Each
//! variant maps to an [`OutputErrorCode`], which is also the CLI exit code.

use std::io;

use thiserror::Error;

use fixturegen_core::error::{FixtureError, OutputErrorCode};
use fixturegen_core::output::{ErrorInfo, ErrorResponse, Location};
use fixturegen_rust::RustHostError;

/// Errors from [`Generator`](crate::Generator).
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Classification, lookup, structural or option errors.
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    /// Sources could not be read or parsed.
    #[error(transparent)]
    Source(#[from] RustHostError),

    /// The manifest named explicitly could not be read.
    #[error("failed to read manifest {path}: {source}")]
    Manifest {
        path: String,
        #[source]
        source: io::Error,
    },

    /// An output file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl GenerateError {
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }

    /// JSON error response for this error.
    pub fn to_response(&self) -> ErrorResponse {
        match self {
            GenerateError::Fixture(err) => ErrorResponse::from_error(err),
            GenerateError::Source(RustHostError::Parse {
                path, line, col, ..
            }) => ErrorResponse::from_info(ErrorInfo {
                code: self.error_code().code(),
                message: self.to_string(),
                details: None,
                location: Some(Location::new(path.clone(), *line, *col)),
            }),
            _ => ErrorResponse::new(self.error_code(), self.to_string()),
        }
    }
}

impl From<&GenerateError> for OutputErrorCode {
    fn from(err: &GenerateError) -> Self {
        match err {
            GenerateError::Fixture(err) => OutputErrorCode::from(err),
            GenerateError::Source(RustHostError::SourceNotFound { .. }) => {
                OutputErrorCode::InvalidArguments
            }
            GenerateError::Source(_) => OutputErrorCode::InputError,
            GenerateError::Manifest { .. } => OutputErrorCode::InvalidArguments,
            GenerateError::Write { .. } => OutputErrorCode::WriteError,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_by_variant() {
        let invalid = GenerateError::from(FixtureError::invalid_option(
            "fixtures.seed",
            "abc",
            "expected an unsigned integer",
        ));
        assert_eq!(invalid.error_code().code(), 2);

        let missing = GenerateError::from(RustHostError::SourceNotFound {
            path: "nope".to_string(),
        });
        assert_eq!(missing.error_code().code(), 2);

        let parse = GenerateError::from(RustHostError::Parse {
            path: "lib.rs".to_string(),
            line: 1,
            col: 5,
            message: "expected identifier".to_string(),
        });
        assert_eq!(parse.error_code().code(), 3);

        let write = GenerateError::Write {
            path: "out/mod.rs".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(write.error_code().code(), 4);

        let internal = GenerateError::from(FixtureError::internal("boom"));
        assert_eq!(internal.error_code().code(), 10);
    }

    #[test]
    fn parse_error_response_carries_location() {
        let err = GenerateError::from(RustHostError::Parse {
            path: "model.rs".to_string(),
            line: 3,
            col: 12,
            message: "expected `:`".to_string(),
        });
        let response = err.to_response();
        assert_eq!(response.status, "error");
        assert_eq!(response.error.code, 3);
        assert_eq!(response.error.location, Some(Location::new("model.rs", 3, 12)));
    }
}
