//! fixturegen: fixture factories for Rust structs.
//!
//! Mark a struct with [`fixture`] and fixturegen writes a factory for it:
//! an argument struct whose `Default` holds a generated value for every
//! field, plus `create_*()` and `create_*_with(args)` functions. Types the
//! generator cannot construct on its own are supplied by a zero-argument
//! function marked with [`fixture_adapter`].
//!
//! ## Modules
//!
//! - `error` - [`GenerateError`] and its exit codes
//! - `generator` - [`Generator`], the builder behind the CLI and `build.rs` use
//!
//! ## From `build.rs`
//!
//! ```no_run
//! fixturegen::Generator::new()
//!     .source_dir("src")
//!     .out_dir("src/fixtures")
//!     .option("fixtures.randomize", "true")
//!     .generate()
//!     .expect("fixture generation failed");
//! ```

pub mod error;
pub mod generator;

pub use error::GenerateError;
pub use generator::{GenerateReport, Generator};

// Marker attributes
pub use fixturegen_macros::{fixture, fixture_adapter};

// Re-export core types for convenience
pub use fixturegen_core::config::{ConfigSource, ConfigValue, FixtureOptions};
pub use fixturegen_core::error::{FixtureError, OutputErrorCode};
pub use fixturegen_core::output::{ErrorResponse, GenerateResponse, ListResponse, SCHEMA_VERSION};
