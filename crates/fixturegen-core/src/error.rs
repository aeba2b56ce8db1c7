//! Error types and error code constants for fixturegen.
//!
//! `FixtureError` is the single error type produced by the core engine. Every
//! failure aborts the run: the driver never emits a partial result.
//!
//! ## Error Code Mapping
//!
//! Exit codes used by the CLI and JSON error responses:
//! - `2`: Invalid arguments (bad option values)
//! - `3`: Input errors (structural violations, unsupported types, lookups)
//! - `4`: Write errors (the emitter failed to commit a unit)
//! - `10`: Internal errors (bugs, unexpected state)

use std::fmt;

use thiserror::Error;

use crate::types::Location;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad option value).
    InvalidArguments = 2,
    /// Input errors (marked declarations violate the rules, unknown types).
    InputError = 3,
    /// Output could not be written.
    WriteError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Adapter Violations
// ============================================================================

/// Why an adapter-marked function was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterViolation {
    /// The function declares one or more parameters.
    HasParameters,
    /// The function has no return type.
    NoReturnType,
    /// The function is declared inside an `impl` block.
    Associated,
}

impl fmt::Display for AdapterViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterViolation::HasParameters => f.write_str("should not contain parameters"),
            AdapterViolation::NoReturnType => f.write_str("should return something"),
            AdapterViolation::Associated => f.write_str("should be a free function"),
        }
    }
}

// ============================================================================
// Core Error Type
// ============================================================================

/// Errors produced while scanning, classifying and emitting fixtures.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// A fixture marker was placed on something other than a named-field struct.
    #[error("#[fixture] can be used only on a struct with named fields: {name} ({location})")]
    NotARecord { name: String, location: Location },

    /// An adapter-marked function has parameters or no return type.
    #[error("{function} {violation} ({location})")]
    InvalidAdapter {
        function: String,
        violation: AdapterViolation,
        location: Location,
    },

    /// No classification rule matched the field type.
    #[error(
        "{type_name} is not a known type and no related #[fixture_adapter] was found (field `{field}` of {fixture})"
    )]
    UnsupportedType {
        type_name: String,
        field: String,
        fixture: String,
    },

    /// A container type outside the supported collection kinds.
    #[error(
        "{type_name} is not a supported collection and no related #[fixture_adapter] was found (field `{field}` of {fixture})"
    )]
    UnsupportedCollection {
        type_name: String,
        field: String,
        fixture: String,
    },

    /// A selected sealed case is neither a singleton nor a fixture.
    #[error(
        "sealed variant {sealed}::{case} used by field `{field}` should wrap a #[fixture] struct or carry no data"
    )]
    SealedCaseNotFixture {
        sealed: String,
        case: String,
        field: String,
    },

    /// An enum or sealed type with no entries to choose from.
    #[error("{type_name} has no variants to choose from (field `{field}`)")]
    EmptyVariants { type_name: String, field: String },

    /// An adapter-supplied parameter whose adapter is not registered.
    #[error("no #[fixture_adapter] registered for {type_name} (field `{field}`)")]
    MissingAdapter { type_name: String, field: String },

    /// Two source units map to the same output unit.
    #[error("source units {first} and {second} both map to output unit {unit}")]
    UnitNameCollision {
        unit: String,
        first: String,
        second: String,
    },

    /// Two fixtures in one unit produce the same generated item name.
    #[error("{first} and {second} both generate {name} in unit {unit}")]
    FactoryNameCollision {
        name: String,
        unit: String,
        first: String,
        second: String,
    },

    /// A configuration option has an unusable value.
    #[error("invalid option {key}={value}: {reason}")]
    InvalidOption {
        key: String,
        value: String,
        reason: String,
    },

    /// The emitter failed to commit an output unit.
    #[error("failed to emit {unit}: {message}")]
    Emit { unit: String, message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    Internal { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&FixtureError> for OutputErrorCode {
    fn from(err: &FixtureError) -> Self {
        match err {
            FixtureError::InvalidOption { .. } => OutputErrorCode::InvalidArguments,
            FixtureError::NotARecord { .. }
            | FixtureError::InvalidAdapter { .. }
            | FixtureError::UnsupportedType { .. }
            | FixtureError::UnsupportedCollection { .. }
            | FixtureError::SealedCaseNotFixture { .. }
            | FixtureError::EmptyVariants { .. }
            | FixtureError::MissingAdapter { .. }
            | FixtureError::UnitNameCollision { .. }
            | FixtureError::FactoryNameCollision { .. } => OutputErrorCode::InputError,
            FixtureError::Emit { .. } => OutputErrorCode::WriteError,
            FixtureError::Internal { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<FixtureError> for OutputErrorCode {
    fn from(err: FixtureError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl FixtureError {
    /// Create an invalid option error.
    pub fn invalid_option(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        FixtureError::InvalidOption {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an emit error.
    pub fn emit(unit: impl Into<String>, message: impl Into<String>) -> Self {
        FixtureError::Emit {
            unit: unit.into(),
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        FixtureError::Internal {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }

    /// Location of the offending declaration, when the error has one.
    pub fn location(&self) -> Option<&Location> {
        match self {
            FixtureError::NotARecord { location, .. }
            | FixtureError::InvalidAdapter { location, .. } => Some(location),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod error_code_mapping {
        use super::*;

        #[test]
        fn structural_errors_map_to_input_error() {
            let err = FixtureError::NotARecord {
                name: "crate::Mode".to_string(),
                location: Location::new("src/lib.rs", 3, 1),
            };
            assert_eq!(OutputErrorCode::from(&err), OutputErrorCode::InputError);
            assert_eq!(err.error_code().code(), 3);
        }

        #[test]
        fn invalid_option_maps_to_invalid_arguments() {
            let err = FixtureError::invalid_option("fixtures.seed", "abc", "not a number");
            assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
            assert_eq!(err.error_code().code(), 2);
        }

        #[test]
        fn emit_maps_to_write_error() {
            let err = FixtureError::emit("model_fixture", "disk full");
            assert_eq!(err.error_code().code(), 4);
        }

        #[test]
        fn internal_maps_to_internal_error() {
            let err = FixtureError::internal("unexpected state");
            assert_eq!(err.error_code(), OutputErrorCode::InternalError);
            assert_eq!(err.error_code().code(), 10);
        }
    }

    mod error_display {
        use super::*;

        #[test]
        fn unsupported_type_names_type_field_and_fixture() {
            let err = FixtureError::UnsupportedType {
                type_name: "crate::net::Socket".to_string(),
                field: "socket".to_string(),
                fixture: "crate::Server".to_string(),
            };
            let message = err.to_string();
            assert!(message.starts_with("crate::net::Socket is not a known type"));
            assert!(message.contains("`socket`"));
            assert!(message.contains("crate::Server"));
        }

        #[test]
        fn invalid_adapter_display() {
            let err = FixtureError::InvalidAdapter {
                function: "crate::adapters::money".to_string(),
                violation: AdapterViolation::HasParameters,
                location: Location::new("src/adapters.rs", 7, 1),
            };
            assert_eq!(
                err.to_string(),
                "crate::adapters::money should not contain parameters (src/adapters.rs:7:1)"
            );
            assert!(err.location().is_some());
        }
    }
}
