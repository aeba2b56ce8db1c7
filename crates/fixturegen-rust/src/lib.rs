//! Rust source support for fixturegen.
//!
//! - [`files`]: source file discovery under a source root
//! - [`resolve`]: `use`-aware resolution of type paths
//! - [`index`]: [`RustHost`], a declaration index over parsed sources
//! - [`render`]: Rust source text for output units
//!
//! ```
//! use fixturegen_core::config::FixtureOptions;
//! use fixturegen_core::driver::Driver;
//! use fixturegen_rust::{RenderingEmitter, RustHost};
//!
//! let host = RustHost::from_sources(vec![(
//!     "model.rs".to_string(),
//!     "#[fixture] pub struct Person { pub name: String, pub age: u32 }".to_string(),
//! )])
//! .unwrap();
//!
//! let mut emitter = RenderingEmitter::new();
//! Driver::new(&host, FixtureOptions::default())
//!     .run(&mut emitter)
//!     .unwrap();
//! assert!(emitter.units[0].source.contains("pub fn create_person()"));
//! ```

use std::io;

use thiserror::Error;

pub mod files;
pub mod index;
pub mod render;
pub mod resolve;

pub use index::RustHost;
pub use render::{render_mod_file, render_unit, RenderedUnit, RenderingEmitter};

// ============================================================================
// Error Types
// ============================================================================

/// Errors reading or parsing Rust sources.
#[derive(Debug, Error)]
pub enum RustHostError {
    /// The source root does not exist.
    #[error("source directory not found: {path}")]
    SourceNotFound { path: String },

    /// A source file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A source file is not valid Rust.
    #[error("failed to parse {path}:{line}:{col}: {message}")]
    Parse {
        path: String,
        line: u32,
        col: u32,
        message: String,
    },
}

/// Result type for Rust host operations.
pub type HostResult<T> = Result<T, RustHostError>;
