//! Names of generated units, factories and argument structs.
//!
//! The classifier and the builder both go through [`Naming`], so a reference
//! to a nested fixture always names the factory that is generated for it.
//!
//! - Output unit: `<base>_fixture` where `<base>` is the source file stem, or
//!   the parent directory name for `mod.rs`.
//! - Factory: `create_<enclosing modules>_<name>` in snake case.
//! - Argument struct: `Create<Enclosing modules><Name>Args` in Pascal case.
//! - Factory path: `<module root>::<unit>::<factory>`.

use serde::Serialize;

use crate::host::{SourceUnit, TypeDeclaration};

/// Module that output units are mounted under unless configured otherwise.
pub const DEFAULT_MODULE_ROOT: &str = "crate::fixtures";

/// Suffix appended to a unit base name to form the output unit name.
pub const OUTPUT_UNIT_SUFFIX: &str = "_fixture";

// ============================================================================
// Case Conversion
// ============================================================================

/// Convert an identifier to snake case.
///
/// Acronyms stay together: `HTTPServer` becomes `http_server`.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = if i > 0 { chars.get(i - 1) } else { None };
            let next = chars.get(i + 1);
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert a snake-case identifier to Pascal case.
pub fn to_pascal_case(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

// ============================================================================
// Unit Names
// ============================================================================

/// Base name of a source unit from its path.
pub fn unit_base_name(path: &str) -> String {
    let mut segments = path.rsplit(|c| c == '/' || c == '\\');
    let file = segments.next().unwrap_or(path);
    let stem = file.strip_suffix(".rs").unwrap_or(file);
    if stem == "mod" {
        if let Some(parent) = segments.next() {
            return parent.to_string();
        }
    }
    stem.to_string()
}

/// Output unit name for a unit base name.
pub fn output_unit_name(base_name: &str) -> String {
    format!("{}{}", base_name, OUTPUT_UNIT_SUFFIX)
}

// ============================================================================
// Factory References
// ============================================================================

/// Reference to a generated factory function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactoryRef {
    /// Module holding the factory (`crate::fixtures::model_fixture`).
    pub module: String,
    /// Factory function name (`create_address`).
    pub function: String,
}

impl FactoryRef {
    /// Fully qualified function path.
    pub fn path(&self) -> String {
        format!("{}::{}", self.module, self.function)
    }

    /// Call expression with no arguments.
    pub fn call(&self) -> String {
        format!("{}()", self.path())
    }
}

/// Naming policy for generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Naming {
    module_root: String,
}

impl Default for Naming {
    fn default() -> Self {
        Naming::new(DEFAULT_MODULE_ROOT)
    }
}

impl Naming {
    pub fn new(module_root: impl Into<String>) -> Self {
        Naming {
            module_root: module_root.into(),
        }
    }

    pub fn module_root(&self) -> &str {
        &self.module_root
    }

    /// `create_<enclosing>_<name>`.
    pub fn factory_name(&self, enclosing: &[String], simple_name: &str) -> String {
        let mut parts = vec!["create".to_string()];
        parts.extend(enclosing.iter().map(|m| to_snake_case(m)));
        parts.push(to_snake_case(simple_name));
        parts.join("_")
    }

    /// Factory variant that takes an argument struct.
    pub fn factory_with_name(&self, enclosing: &[String], simple_name: &str) -> String {
        format!("{}_with", self.factory_name(enclosing, simple_name))
    }

    /// `Create<Enclosing><Name>Args`.
    pub fn args_struct_name(&self, enclosing: &[String], simple_name: &str) -> String {
        let prefix: String = enclosing.iter().map(|m| to_pascal_case(m)).collect();
        format!("Create{}{}Args", prefix, simple_name)
    }

    /// Module path of the output unit generated for `unit`.
    pub fn unit_module(&self, unit: &SourceUnit) -> String {
        format!("{}::{}", self.module_root, output_unit_name(&unit.base_name))
    }

    /// Reference to the factory generated for `decl`, declared in `unit`.
    pub fn factory_for(&self, unit: &SourceUnit, decl: &TypeDeclaration) -> FactoryRef {
        FactoryRef {
            module: self.unit_module(unit),
            function: self.factory_name(&decl.enclosing, &decl.simple_name),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
