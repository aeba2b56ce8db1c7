//! JSON output types and serialization for CLI responses.
//!
//! ## Design Principles
//!
//! 1. **Status first:** Every response has `status` as first field
//! 2. **Deterministic:** Same input -> same output (field order, array ordering)
//! 3. **Absent vs empty:** absent field means "not applicable"
//! 4. **Versioned:** Schema version in response enables forward compatibility

use std::io::{self, Write};

use serde::Serialize;
use serde_json::json;

use crate::config::FixtureOptions;
use crate::error::{FixtureError, OutputErrorCode};
use crate::registry::{AdapterRegistry, FixtureRegistry};

pub use crate::types::Location;

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Generate Response
// ============================================================================

/// One generated output unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitInfo {
    /// Output unit name (`model_fixture`).
    pub name: String,
    /// Source unit the fixtures came from.
    pub source: String,
    /// Output file path.
    pub path: String,
    /// Factory names in discovery order.
    pub factories: Vec<String>,
}

/// Response for `generate`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    /// Nothing was written.
    pub dry_run: bool,
    /// Generation was disabled by `fixtures.run`.
    pub skipped: bool,
    /// Resolved options with their sources.
    pub options: FixtureOptions,
    pub units: Vec<UnitInfo>,
    /// Files written, in order. Empty for dry runs.
    pub files_written: Vec<String>,
}

impl GenerateResponse {
    pub fn new(
        options: FixtureOptions,
        dry_run: bool,
        skipped: bool,
        units: Vec<UnitInfo>,
        files_written: Vec<String>,
    ) -> Self {
        GenerateResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            dry_run,
            skipped,
            options,
            units,
            files_written,
        }
    }
}

// ============================================================================
// List Response
// ============================================================================

/// A registered adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdapterInfo {
    /// Qualified function path.
    pub function: String,
    /// Rendered return type.
    pub target: String,
    pub location: Location,
}

/// A classified field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterInfo {
    pub name: String,
    /// Descriptor tag (`primitive`, `fixture`, ...).
    pub tag: String,
    #[serde(rename = "type")]
    pub ty: String,
}

/// A fixture and its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureInfo {
    pub name: String,
    pub factory: String,
    pub location: Location,
    pub parameters: Vec<ParameterInfo>,
}

/// Response for `list`.
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    pub adapters: Vec<AdapterInfo>,
    pub fixtures: Vec<FixtureInfo>,
}

impl ListResponse {
    /// Build from populated registries. Factory names are computed by `factory`.
    pub fn from_registries<F>(
        adapters: &AdapterRegistry,
        fixtures: &FixtureRegistry,
        factory: F,
    ) -> Self
    where
        F: Fn(&crate::registry::FixtureDescriptor) -> String,
    {
        let adapters = adapters
            .iter()
            .map(|a| AdapterInfo {
                function: format!("{}::{}", a.producer_scope, a.function_name),
                target: a.target.render(),
                location: a.location.clone(),
            })
            .collect();
        let fixtures = fixtures
            .units()
            .iter()
            .flat_map(|unit| unit.fixtures.iter())
            .map(|f| FixtureInfo {
                name: f.qualified_name.clone(),
                factory: factory(f),
                location: f.location.clone(),
                parameters: f
                    .parameters
                    .iter()
                    .map(|p| ParameterInfo {
                        name: p.name().to_string(),
                        tag: p.tag().to_string(),
                        ty: p.ty().render(),
                    })
                    .collect(),
            })
            .collect();
        ListResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            adapters,
            fixtures,
        }
    }
}

// ============================================================================
// Error Response
// ============================================================================

/// Error details for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    /// Numeric error code (also the exit code).
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Where the error occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl ErrorInfo {
    /// Create from a FixtureError.
    pub fn from_error(err: &FixtureError) -> Self {
        let details = match err {
            FixtureError::UnsupportedType {
                type_name,
                field,
                fixture,
            }
            | FixtureError::UnsupportedCollection {
                type_name,
                field,
                fixture,
            } => Some(json!({ "type": type_name, "field": field, "fixture": fixture })),
            FixtureError::SealedCaseNotFixture {
                sealed,
                case,
                field,
            } => Some(json!({ "type": sealed, "case": case, "field": field })),
            FixtureError::UnitNameCollision {
                unit,
                first,
                second,
            } => Some(json!({ "unit": unit, "sources": [first, second] })),
            FixtureError::FactoryNameCollision {
                name,
                unit,
                first,
                second,
            } => Some(json!({ "name": name, "unit": unit, "fixtures": [first, second] })),
            FixtureError::InvalidOption { key, value, .. } => {
                Some(json!({ "key": key, "value": value }))
            }
            _ => None,
        };
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
            details,
            location: err.location().cloned(),
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn from_error(err: &FixtureError) -> Self {
        ErrorResponse::from_info(ErrorInfo::from_error(err))
    }

    /// Create an error response with just code and message.
    pub fn new(code: OutputErrorCode, message: impl Into<String>) -> Self {
        ErrorResponse::from_info(ErrorInfo {
            code: code.code(),
            message: message.into(),
            details: None,
            location: None,
        })
    }

    pub fn from_info(error: ErrorInfo) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error,
        }
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================
