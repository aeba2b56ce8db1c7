//! Common types shared by the host, classifier and output modules.
//!
//! [`ResolvedType`] is the read-only handle a [`DeclarationHost`] hands to the
//! engine for every field and adapter return type. [`Location`] points back at
//! the declaration so errors can be located.
//!
//! [`DeclarationHost`]: crate::host::DeclarationHost

use std::fmt;

use serde::{Deserialize, Serialize};

/// Path used for slice element containers (`[T]`).
pub const SLICE_PATH: &str = "[]";

// ============================================================================
// Location Type
// ============================================================================

/// Location of a declaration in a source file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Location {
    /// File path (relative to the source root).
    pub file: String,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed).
    pub col: u32,
}

impl Location {
    /// Create a new location.
    pub fn new(file: impl Into<String>, line: u32, col: u32) -> Self {
        Location {
            file: file.into(),
            line,
            col,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

// ============================================================================
// Resolved Type
// ============================================================================

/// A type as resolved by the host.
///
/// - `path`: qualified path without generic arguments (`crate::model::Address`,
///   `std::collections::HashMap`, `i32`)
/// - `args`: generic type arguments, in order
/// - `nullable`: the declared type was `Option<path<args>>`
///
/// Types the host cannot express as a path (tuples, references, fixed-size
/// arrays) carry their source text as `path` and no arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedType {
    /// Qualified path of the type constructor.
    pub path: String,
    /// Generic type arguments.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub args: Vec<ResolvedType>,
    /// Whether the declared type was wrapped in `Option`.
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub nullable: bool,
}

impl ResolvedType {
    /// Create a non-generic, non-nullable type.
    pub fn named(path: impl Into<String>) -> Self {
        ResolvedType {
            path: path.into(),
            args: Vec::new(),
            nullable: false,
        }
    }

    /// Create a generic type with arguments.
    pub fn with_args(path: impl Into<String>, args: Vec<ResolvedType>) -> Self {
        ResolvedType {
            path: path.into(),
            args,
            nullable: false,
        }
    }

    /// Create a slice type `[element]`.
    pub fn slice(element: ResolvedType) -> Self {
        Self::with_args(SLICE_PATH, vec![element])
    }

    /// Mark this type as wrapped in `Option`.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Last path segment (`HashMap` for `std::collections::HashMap`).
    pub fn simple_name(&self) -> &str {
        self.path.rsplit("::").next().unwrap_or(&self.path)
    }

    /// Whether this is a slice type `[T]`.
    pub fn is_slice(&self) -> bool {
        self.path == SLICE_PATH
    }

    /// Rust type text, with `Option<...>` restored for nullable types.
    pub fn render(&self) -> String {
        let inner = self.render_non_null();
        if self.nullable {
            format!("Option<{}>", inner)
        } else {
            inner
        }
    }

    /// Rust type text ignoring the `nullable` flag.
    ///
    /// This is the key used for adapter lookups: an adapter for `Money` also
    /// supplies `Option<Money>` parameters.
    pub fn render_non_null(&self) -> String {
        if self.is_slice() {
            let element = self
                .args
                .first()
                .map(ResolvedType::render)
                .unwrap_or_else(|| "_".to_string());
            return format!("[{}]", element);
        }
        if self.args.is_empty() {
            return self.path.clone();
        }
        let args: Vec<String> = self.args.iter().map(ResolvedType::render).collect();
        format!("{}<{}>", self.path, args.join(", "))
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

// ============================================================================
// Tests
// ============================================================================
