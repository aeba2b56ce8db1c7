//! Declaration host trait and declaration metadata types.
//!
//! The engine never parses source code itself. A [`DeclarationHost`] supplies
//! read-only metadata about the declarations in a set of source units:
//! which types and functions carry a marker, how a field type resolves to a
//! declaration, a record's constructor parameters and a sealed type's cases.
//!
//! # Ordering
//!
//! Hosts must report units, marked types and marked functions in discovery
//! order (unit order first, then source order within a unit). The driver
//! preserves that order in the generated output, which keeps runs
//! byte-identical.
//!
//! # In-memory host
//!
//! [`MemoryHost`] builds declarations directly, for tests and for callers that
//! obtain declarations some other way:
//!
//! ```
//! use fixturegen_core::host::{DeclarationHost, Marker, MemoryHost};
//! use fixturegen_core::types::ResolvedType;
//!
//! let mut host = MemoryHost::new();
//! let unit = host.add_unit("src/model.rs", "crate::model");
//! host.add_fixture(
//!     unit,
//!     "Person",
//!     vec![
//!         ("name", ResolvedType::named("String")),
//!         ("age", ResolvedType::named("i32")),
//!     ],
//! );
//!
//! let fixtures = host.marked_types(Marker::Fixture);
//! assert_eq!(fixtures.len(), 1);
//! assert_eq!(fixtures[0].qualified_name, "crate::model::Person");
//! assert_eq!(host.constructor_parameters(fixtures[0]).len(), 2);
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::naming::unit_base_name;
use crate::types::{Location, ResolvedType};

// ============================================================================
// Markers
// ============================================================================

/// Attribute markers recognized on declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    /// `#[fixture]` on a struct: generate a factory for it.
    Fixture,
    /// `#[fixture_adapter]` on a function: it supplies values of its return type.
    FixtureAdapter,
}

impl Marker {
    /// Attribute name as written in source (without any path prefix).
    pub fn attribute_name(&self) -> &'static str {
        match self {
            Marker::Fixture => "fixture",
            Marker::FixtureAdapter => "fixture_adapter",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#[{}]", self.attribute_name())
    }
}

// ============================================================================
// Source Units
// ============================================================================

/// Identifier of a source unit within one host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit_{}", self.0)
    }
}

/// One source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceUnit {
    pub id: UnitId,
    /// Path relative to the source root, with `/` separators.
    pub path: String,
    /// File stem, or the parent directory name for `mod.rs`.
    pub base_name: String,
    /// Module path of the file (`crate::model`).
    pub module_path: String,
}

// ============================================================================
// Declarations
// ============================================================================

/// Structural kind of a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    /// Struct with named fields.
    Record,
    TupleStruct,
    UnitStruct,
    /// Enum whose variants are all unit variants.
    Enum,
    /// Enum with at least one variant carrying data.
    Sealed,
    Union,
}

impl DeclarationKind {
    /// Whether a fixture marker is allowed on this kind.
    pub fn is_record(&self) -> bool {
        matches!(self, DeclarationKind::Record)
    }
}

/// A type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDeclaration {
    pub unit: UnitId,
    /// Full path (`crate::model::inner::Address`).
    pub qualified_name: String,
    pub simple_name: String,
    /// Inline modules between the unit's module and the declaration.
    pub enclosing: Vec<String>,
    pub kind: DeclarationKind,
    pub markers: Vec<Marker>,
    pub location: Location,
}

impl TypeDeclaration {
    /// The declaration as a resolved type, for use in generated code.
    pub fn as_type(&self) -> ResolvedType {
        ResolvedType::named(self.qualified_name.clone())
    }
}

/// A free function declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDeclaration {
    pub unit: UnitId,
    /// Module path containing the function.
    pub scope: String,
    pub name: String,
    pub parameter_count: usize,
    /// `None` when the function returns `()`.
    pub return_type: Option<ResolvedType>,
    pub markers: Vec<Marker>,
    pub location: Location,
    /// Declared inside an `impl` block rather than at module level.
    pub associated: bool,
}

impl FunctionDeclaration {
    /// `scope::name`.
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.scope, self.name)
    }
}

/// One named field of a record, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorParameter {
    pub name: String,
    pub ty: ResolvedType,
}

impl ConstructorParameter {
    pub fn new(name: impl Into<String>, ty: ResolvedType) -> Self {
        ConstructorParameter {
            name: name.into(),
            ty,
        }
    }
}

/// Shape of a sealed type's case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseShape {
    /// Unit variant; a singleton value.
    Unit,
    /// Single-field tuple variant wrapping the given type.
    Wrapping(ResolvedType),
    /// Any other variant shape.
    Fields,
}

/// One case (variant) of an enum or sealed type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseDeclaration {
    pub name: String,
    pub shape: CaseShape,
}

impl CaseDeclaration {
    pub fn unit(name: impl Into<String>) -> Self {
        CaseDeclaration {
            name: name.into(),
            shape: CaseShape::Unit,
        }
    }

    pub fn wrapping(name: impl Into<String>, ty: ResolvedType) -> Self {
        CaseDeclaration {
            name: name.into(),
            shape: CaseShape::Wrapping(ty),
        }
    }

    pub fn fields(name: impl Into<String>) -> Self {
        CaseDeclaration {
            name: name.into(),
            shape: CaseShape::Fields,
        }
    }
}

// ============================================================================
// Host Trait
// ============================================================================

/// Read-only declaration metadata consumed by the engine.
pub trait DeclarationHost {
    /// All source units, in discovery order.
    fn units(&self) -> &[SourceUnit];

    /// Look up a unit by id.
    fn unit(&self, id: UnitId) -> Option<&SourceUnit> {
        self.units().iter().find(|unit| unit.id == id)
    }

    /// Functions carrying `marker`, in discovery order.
    fn marked_functions(&self, marker: Marker) -> Vec<&FunctionDeclaration>;

    /// Type declarations carrying `marker`, in discovery order.
    fn marked_types(&self, marker: Marker) -> Vec<&TypeDeclaration>;

    /// The declaration a resolved type refers to, if it is declared in the
    /// scanned sources.
    fn resolve_type(&self, ty: &ResolvedType) -> Option<&TypeDeclaration>;

    /// Named fields of a record, in declaration order.
    fn constructor_parameters(&self, decl: &TypeDeclaration) -> &[ConstructorParameter];

    /// Variants of an enum or sealed type, in declaration order.
    fn nested_cases(&self, decl: &TypeDeclaration) -> &[CaseDeclaration];

    /// Whether `decl` carries `marker`.
    fn has_marker(&self, decl: &TypeDeclaration, marker: Marker) -> bool {
        decl.markers.contains(&marker)
    }
}

// ============================================================================
// In-Memory Host
// ============================================================================

/// A [`DeclarationHost`] populated programmatically.
///
/// Type names passed to the `add_*` methods may contain inline modules
/// (`"inner::Address"`); the leading segments become the declaration's
/// enclosing chain.
#[derive(Debug, Default)]
pub struct MemoryHost {
    units: Vec<SourceUnit>,
    types: Vec<TypeDeclaration>,
    functions: Vec<FunctionDeclaration>,
    parameters: HashMap<String, Vec<ConstructorParameter>>,
    cases: HashMap<String, Vec<CaseDeclaration>>,
    next_line: HashMap<UnitId, u32>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source unit and return its id.
    pub fn add_unit(&mut self, path: &str, module_path: &str) -> UnitId {
        let id = UnitId(self.units.len() as u32);
        self.units.push(SourceUnit {
            id,
            path: path.to_string(),
            base_name: unit_base_name(path),
            module_path: module_path.to_string(),
        });
        id
    }

    /// Add a type declaration as-is.
    pub fn add_type(&mut self, decl: TypeDeclaration) -> String {
        let name = decl.qualified_name.clone();
        self.types.push(decl);
        name
    }

    /// Add a function declaration as-is.
    pub fn add_function(&mut self, decl: FunctionDeclaration) {
        self.functions.push(decl);
    }

    /// Add a fixture-marked record. Returns its qualified name.
    pub fn add_fixture(
        &mut self,
        unit: UnitId,
        name: &str,
        fields: Vec<(&str, ResolvedType)>,
    ) -> String {
        self.add_struct(unit, name, fields, vec![Marker::Fixture])
    }

    /// Add an unmarked record. Returns its qualified name.
    pub fn add_record(
        &mut self,
        unit: UnitId,
        name: &str,
        fields: Vec<(&str, ResolvedType)>,
    ) -> String {
        self.add_struct(unit, name, fields, Vec::new())
    }

    /// Add an enum whose variants are all unit variants.
    pub fn add_enum(&mut self, unit: UnitId, name: &str, entries: &[&str]) -> String {
        let cases = entries.iter().map(|e| CaseDeclaration::unit(*e)).collect();
        self.add_variants(unit, name, DeclarationKind::Enum, cases, Vec::new())
    }

    /// Add a sealed type with the given cases.
    pub fn add_sealed(&mut self, unit: UnitId, name: &str, cases: Vec<CaseDeclaration>) -> String {
        self.add_variants(unit, name, DeclarationKind::Sealed, cases, Vec::new())
    }

    /// Add a declaration of any kind with explicit markers and no fields.
    pub fn add_declaration(
        &mut self,
        unit: UnitId,
        name: &str,
        kind: DeclarationKind,
        markers: Vec<Marker>,
    ) -> String {
        let decl = self.declaration(unit, name, kind, markers);
        self.add_type(decl)
    }

    /// Add an adapter-marked function with no parameters.
    pub fn add_adapter(&mut self, unit: UnitId, name: &str, return_type: ResolvedType) {
        self.add_marked_function(unit, name, 0, Some(return_type));
    }

    /// Add an adapter-marked function with an arbitrary signature.
    pub fn add_marked_function(
        &mut self,
        unit: UnitId,
        name: &str,
        parameter_count: usize,
        return_type: Option<ResolvedType>,
    ) {
        let scope = self.module_path(unit);
        let location = self.next_location(unit);
        self.functions.push(FunctionDeclaration {
            unit,
            scope,
            name: name.to_string(),
            parameter_count,
            return_type,
            markers: vec![Marker::FixtureAdapter],
            location,
            associated: false,
        });
    }

    fn add_struct(
        &mut self,
        unit: UnitId,
        name: &str,
        fields: Vec<(&str, ResolvedType)>,
        markers: Vec<Marker>,
    ) -> String {
        let decl = self.declaration(unit, name, DeclarationKind::Record, markers);
        let params = fields
            .into_iter()
            .map(|(field, ty)| ConstructorParameter::new(field, ty))
            .collect();
        self.parameters.insert(decl.qualified_name.clone(), params);
        self.add_type(decl)
    }

    fn add_variants(
        &mut self,
        unit: UnitId,
        name: &str,
        kind: DeclarationKind,
        cases: Vec<CaseDeclaration>,
        markers: Vec<Marker>,
    ) -> String {
        let decl = self.declaration(unit, name, kind, markers);
        self.cases.insert(decl.qualified_name.clone(), cases);
        self.add_type(decl)
    }

    fn declaration(
        &mut self,
        unit: UnitId,
        name: &str,
        kind: DeclarationKind,
        markers: Vec<Marker>,
    ) -> TypeDeclaration {
        let mut segments: Vec<String> = name.split("::").map(str::to_string).collect();
        let simple_name = segments.pop().unwrap_or_default();
        let module_path = self.module_path(unit);
        let location = self.next_location(unit);
        TypeDeclaration {
            unit,
            qualified_name: format!("{}::{}", module_path, name),
            simple_name,
            enclosing: segments,
            kind,
            markers,
            location,
        }
    }

    fn module_path(&self, unit: UnitId) -> String {
        self.unit(unit)
            .map(|u| u.module_path.clone())
            .unwrap_or_else(|| "crate".to_string())
    }

    fn next_location(&mut self, unit: UnitId) -> Location {
        let file = self
            .unit(unit)
            .map(|u| u.path.clone())
            .unwrap_or_default();
        let line = self.next_line.entry(unit).or_insert(0);
        *line += 1;
        Location::new(file, *line, 1)
    }
}

impl DeclarationHost for MemoryHost {
    fn units(&self) -> &[SourceUnit] {
        &self.units
    }

    fn marked_functions(&self, marker: Marker) -> Vec<&FunctionDeclaration> {
        let mut found: Vec<&FunctionDeclaration> = self
            .functions
            .iter()
            .filter(|f| f.markers.contains(&marker))
            .collect();
        found.sort_by_key(|f| f.unit);
        found
    }

    fn marked_types(&self, marker: Marker) -> Vec<&TypeDeclaration> {
        let mut found: Vec<&TypeDeclaration> = self
            .types
            .iter()
            .filter(|t| t.markers.contains(&marker))
            .collect();
        found.sort_by_key(|t| t.unit);
        found
    }

    fn resolve_type(&self, ty: &ResolvedType) -> Option<&TypeDeclaration> {
        if let Some(decl) = self.types.iter().find(|t| t.qualified_name == ty.path) {
            return Some(decl);
        }
        if ty.path.contains("::") {
            return None;
        }
        let mut candidates = self.types.iter().filter(|t| t.simple_name == ty.path);
        match (candidates.next(), candidates.next()) {
            (Some(decl), None) => Some(decl),
            _ => None,
        }
    }

    fn constructor_parameters(&self, decl: &TypeDeclaration) -> &[ConstructorParameter] {
        self.parameters
            .get(&decl.qualified_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn nested_cases(&self, decl: &TypeDeclaration) -> &[CaseDeclaration] {
        self.cases
            .get(&decl.qualified_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod memory_host_tests {
        use super::*;

        #[test]
        fn nested_names_record_enclosing_modules() {
            let mut host = MemoryHost::new();
            let unit = host.add_unit("src/model.rs", "crate::model");
            host.add_fixture(unit, "inner::Address", vec![]);

            let decl = &host.marked_types(Marker::Fixture)[0];
            assert_eq!(decl.qualified_name, "crate::model::inner::Address");
            assert_eq!(decl.simple_name, "Address");
            assert_eq!(decl.enclosing, vec!["inner".to_string()]);
        }

        #[test]
        fn marked_types_follow_unit_order() {
            let mut host = MemoryHost::new();
            let first = host.add_unit("src/a.rs", "crate::a");
            let second = host.add_unit("src/b.rs", "crate::b");
            host.add_fixture(second, "B", vec![]);
            host.add_fixture(first, "A", vec![]);

            let names: Vec<&str> = host
                .marked_types(Marker::Fixture)
                .iter()
                .map(|t| t.simple_name.as_str())
                .collect();
            assert_eq!(names, vec!["A", "B"]);
        }

        #[test]
        fn resolve_by_qualified_then_unique_simple_name() {
            let mut host = MemoryHost::new();
            let unit = host.add_unit("src/lib.rs", "crate");
            host.add_enum(unit, "Color", &["Red", "Green"]);

            assert!(host
                .resolve_type(&ResolvedType::named("crate::Color"))
                .is_some());
            assert!(host.resolve_type(&ResolvedType::named("Color")).is_some());
            assert!(host
                .resolve_type(&ResolvedType::named("other::Color"))
                .is_none());
        }

        #[test]
        fn ambiguous_simple_name_does_not_resolve() {
            let mut host = MemoryHost::new();
            let a = host.add_unit("src/a.rs", "crate::a");
            let b = host.add_unit("src/b.rs", "crate::b");
            host.add_enum(a, "Kind", &["X"]);
            host.add_enum(b, "Kind", &["Y"]);

            assert!(host.resolve_type(&ResolvedType::named("Kind")).is_none());
        }

        #[test]
        fn unit_base_name_uses_parent_for_mod_rs() {
            let mut host = MemoryHost::new();
            let id = host.add_unit("src/billing/mod.rs", "crate::billing");
            assert_eq!(host.unit(id).map(|u| u.base_name.as_str()), Some("billing"));
        }
    }

    mod marker_tests {
        use super::*;

        #[test]
        fn marker_display_uses_attribute_syntax() {
            assert_eq!(Marker::Fixture.to_string(), "#[fixture]");
            assert_eq!(Marker::FixtureAdapter.to_string(), "#[fixture_adapter]");
        }
    }
}
