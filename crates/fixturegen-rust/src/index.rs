//! Declaration index over parsed Rust sources.
//!
//! [`RustHost`] parses every file with `syn` and implements
//! [`DeclarationHost`] over the result. Indexing runs in two passes: the first
//! records every module's scope (declared names and `use` imports) so that the
//! second can resolve field and return types written anywhere in the sources.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use syn::{Attribute, Fields, ImplItem, Item, ReturnType, Type};
use tracing::debug;

use fixturegen_core::host::{
    CaseDeclaration, ConstructorParameter, DeclarationHost, DeclarationKind, FunctionDeclaration,
    Marker, SourceUnit, TypeDeclaration, UnitId,
};
use fixturegen_core::naming::unit_base_name;
use fixturegen_core::types::{Location, ResolvedType};

use crate::files::{collect_rust_files, collect_rust_files_excluding, module_path_for, SourceFile};
use crate::resolve::ScopeTable;
use crate::{HostResult, RustHostError};

/// Crate name accepted as a marker attribute prefix (`#[fixturegen::fixture]`).
const MARKER_CRATE: &str = "fixturegen";

// ============================================================================
// RustHost
// ============================================================================

/// A [`DeclarationHost`] backed by Rust source files.
#[derive(Debug, Default)]
pub struct RustHost {
    units: Vec<SourceUnit>,
    types: Vec<TypeDeclaration>,
    functions: Vec<FunctionDeclaration>,
    by_name: HashMap<String, usize>,
    parameters: HashMap<String, Vec<ConstructorParameter>>,
    cases: HashMap<String, Vec<CaseDeclaration>>,
}

impl RustHost {
    /// Parse every `.rs` file under `src_root`.
    pub fn load(src_root: &Path) -> HostResult<Self> {
        Self::from_files(collect_rust_files(src_root)?)
    }

    /// Like [`RustHost::load`], skipping files under `exclude` (typically the
    /// directory generated units are written to).
    pub fn load_excluding(src_root: &Path, exclude: &[PathBuf]) -> HostResult<Self> {
        Self::from_files(collect_rust_files_excluding(src_root, exclude)?)
    }

    /// Build from `(relative path, content)` pairs, in the given order.
    pub fn from_sources(sources: Vec<(String, String)>) -> HostResult<Self> {
        let files = sources
            .into_iter()
            .map(|(rel_path, content)| SourceFile { rel_path, content })
            .collect();
        Self::from_files(files)
    }

    fn from_files(files: Vec<SourceFile>) -> HostResult<Self> {
        let mut parsed = Vec::with_capacity(files.len());
        for file in files {
            let syntax = syn::parse_file(&file.content).map_err(|err| {
                let start = err.span().start();
                RustHostError::Parse {
                    path: file.rel_path.clone(),
                    line: start.line as u32,
                    col: start.column as u32 + 1,
                    message: err.to_string(),
                }
            })?;
            parsed.push((file.rel_path, syntax));
        }

        let mut scopes = ScopeTable::new();
        for (rel_path, syntax) in &parsed {
            let module = module_path_for(rel_path);
            declare_file_module(&mut scopes, &module);
            index_scope(&mut scopes, &module, &syntax.items);
        }

        let mut host = RustHost::default();
        for (index, (rel_path, syntax)) in parsed.iter().enumerate() {
            let unit = SourceUnit {
                id: UnitId(index as u32),
                path: rel_path.clone(),
                base_name: unit_base_name(rel_path),
                module_path: module_path_for(rel_path),
            };
            let mut collector = Collector {
                host: &mut host,
                scopes: &scopes,
                unit: unit.id,
                file: rel_path,
            };
            collector.collect(&unit.module_path, &[], &syntax.items);
            host.units.push(unit);
        }

        debug!(
            "indexed {} units, {} types, {} functions",
            host.units.len(),
            host.types.len(),
            host.functions.len()
        );
        Ok(host)
    }

    /// All indexed type declarations, in discovery order.
    pub fn types(&self) -> &[TypeDeclaration] {
        &self.types
    }
}

impl DeclarationHost for RustHost {
    fn units(&self) -> &[SourceUnit] {
        &self.units
    }

    fn marked_functions(&self, marker: Marker) -> Vec<&FunctionDeclaration> {
        self.functions
            .iter()
            .filter(|f| f.markers.contains(&marker))
            .collect()
    }

    fn marked_types(&self, marker: Marker) -> Vec<&TypeDeclaration> {
        self.types
            .iter()
            .filter(|t| t.markers.contains(&marker))
            .collect()
    }

    fn resolve_type(&self, ty: &ResolvedType) -> Option<&TypeDeclaration> {
        self.by_name.get(&ty.path).map(|&index| &self.types[index])
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
// Pass 1: scopes
// ============================================================================

/// Register a file-backed module with its parent so paths through it resolve
/// even when the parent file is not part of the scan.
fn declare_file_module(scopes: &mut ScopeTable, module: &str) {
    if let Some((parent, name)) = module.rsplit_once("::") {
        scopes.declare_module(parent, name);
    }
}

fn index_scope(scopes: &mut ScopeTable, module: &str, items: &[Item]) {
    for item in items {
        match item {
            Item::Struct(item) => scopes.declare_type(module, &item.ident.to_string()),
            Item::Enum(item) => scopes.declare_type(module, &item.ident.to_string()),
            Item::Union(item) => scopes.declare_type(module, &item.ident.to_string()),
            Item::Type(item) => scopes.declare_type(module, &item.ident.to_string()),
            Item::Use(item) => scopes.add_use(module, item),
            Item::Mod(item) => {
                let name = item.ident.to_string();
                scopes.declare_module(module, &name);
                if let Some((_, content)) = &item.content {
                    index_scope(scopes, &format!("{}::{}", module, name), content);
                }
            }
            _ => {}
        }
    }
}

// ============================================================================
// Pass 2: declarations
// ============================================================================

struct Collector<'a> {
    host: &'a mut RustHost,
    scopes: &'a ScopeTable,
    unit: UnitId,
    file: &'a str,
}

impl Collector<'_> {
    fn collect(&mut self, module: &str, enclosing: &[String], items: &[Item]) {
        for item in items {
            match item {
                Item::Struct(item) => {
                    let kind = match &item.fields {
                        Fields::Named(_) => DeclarationKind::Record,
                        Fields::Unnamed(_) => DeclarationKind::TupleStruct,
                        Fields::Unit => DeclarationKind::UnitStruct,
                    };
                    let decl = self.declaration(module, enclosing, &item.ident, kind, &item.attrs);
                    if let Fields::Named(named) = &item.fields {
                        let params = named
                            .named
                            .iter()
                            .filter_map(|field| {
                                let name = field.ident.as_ref()?.to_string();
                                Some(ConstructorParameter::new(
                                    name,
                                    self.scopes.resolve_type(module, &field.ty),
                                ))
                            })
                            .collect();
                        self.host
                            .parameters
                            .insert(decl.qualified_name.clone(), params);
                    }
                    self.push_type(decl);
                }
                Item::Enum(item) => {
                    let all_unit = item
                        .variants
                        .iter()
                        .all(|v| matches!(v.fields, Fields::Unit));
                    let kind = if all_unit {
                        DeclarationKind::Enum
                    } else {
                        DeclarationKind::Sealed
                    };
                    let decl = self.declaration(module, enclosing, &item.ident, kind, &item.attrs);
                    let cases = item
                        .variants
                        .iter()
                        .map(|variant| {
                            let name = variant.ident.to_string();
                            match &variant.fields {
                                Fields::Unit => CaseDeclaration::unit(name),
                                Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
                                    let ty = &fields.unnamed[0].ty;
                                    CaseDeclaration::wrapping(
                                        name,
                                        self.scopes.resolve_type(module, ty),
                                    )
                                }
                                _ => CaseDeclaration::fields(name),
                            }
                        })
                        .collect();
                    self.host.cases.insert(decl.qualified_name.clone(), cases);
                    self.push_type(decl);
                }
                Item::Union(item) => {
                    let decl = self.declaration(
                        module,
                        enclosing,
                        &item.ident,
                        DeclarationKind::Union,
                        &item.attrs,
                    );
                    self.push_type(decl);
                }
                Item::Fn(item) => {
                    let return_type = self.return_type(module, &item.sig.output);
                    self.host.functions.push(FunctionDeclaration {
                        unit: self.unit,
                        scope: module.to_string(),
                        name: item.sig.ident.to_string(),
                        parameter_count: item.sig.inputs.len(),
                        return_type,
                        markers: markers(&item.attrs),
                        location: self.location(&item.sig.ident),
                        associated: false,
                    });
                }
                Item::Impl(item) => {
                    let self_ty = self.scopes.resolve_type(module, &item.self_ty).render();
                    for impl_item in &item.items {
                        let ImplItem::Fn(function) = impl_item else {
                            continue;
                        };
                        let markers = markers(&function.attrs);
                        if markers.is_empty() {
                            continue;
                        }
                        self.host.functions.push(FunctionDeclaration {
                            unit: self.unit,
                            scope: self_ty.clone(),
                            name: function.sig.ident.to_string(),
                            parameter_count: function.sig.inputs.len(),
                            return_type: self.return_type(module, &function.sig.output),
                            markers,
                            location: self.location(&function.sig.ident),
                            associated: true,
                        });
                    }
                }
                Item::Mod(item) => {
                    if let Some((_, content)) = &item.content {
                        let name = item.ident.to_string();
                        let mut inner = enclosing.to_vec();
                        inner.push(name.clone());
                        self.collect(&format!("{}::{}", module, name), &inner, content);
                    }
                }
                _ => {}
            }
        }
    }

    fn declaration(
        &self,
        module: &str,
        enclosing: &[String],
        ident: &syn::Ident,
        kind: DeclarationKind,
        attrs: &[Attribute],
    ) -> TypeDeclaration {
        let simple_name = ident.to_string();
        TypeDeclaration {
            unit: self.unit,
            qualified_name: format!("{}::{}", module, simple_name),
            simple_name,
            enclosing: enclosing.to_vec(),
            kind,
            markers: markers(attrs),
            location: self.location(ident),
        }
    }

    fn push_type(&mut self, decl: TypeDeclaration) {
        self.host
            .by_name
            .insert(decl.qualified_name.clone(), self.host.types.len());
        self.host.types.push(decl);
    }

    /// `None` for `()` and for a missing return type.
    fn return_type(&self, module: &str, output: &ReturnType) -> Option<ResolvedType> {
        match output {
            ReturnType::Default => None,
            ReturnType::Type(_, ty) if is_unit(ty) => None,
            ReturnType::Type(_, ty) => Some(self.scopes.resolve_type(module, ty)),
        }
    }

    fn location(&self, ident: &syn::Ident) -> Location {
        let start = ident.span().start();
        Location::new(self.file, start.line as u32, start.column as u32 + 1)
    }
}

fn is_unit(ty: &Type) -> bool {
    matches!(ty, Type::Tuple(tuple) if tuple.elems.is_empty())
}

/// Markers among `attrs`, accepting `#[fixture]` and `#[fixturegen::fixture]`.
fn markers(attrs: &[Attribute]) -> Vec<Marker> {
    attrs
        .iter()
        .filter_map(|attr| {
            let segments: Vec<String> = attr
                .path()
                .segments
                .iter()
                .map(|s| s.ident.to_string())
                .collect();
            let name = match segments.as_slice() {
                [name] => name,
                [krate, name] if krate == MARKER_CRATE => name,
                _ => return None,
            };
            [Marker::Fixture, Marker::FixtureAdapter]
                .into_iter()
                .find(|marker| marker.attribute_name() == name.as_str())
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn host(sources: &[(&str, &str)]) -> RustHost {
        RustHost::from_sources(
            sources
                .iter()
                .map(|(path, content)| (path.to_string(), content.to_string()))
                .collect(),
        )
        .unwrap()
    }

    mod declarations {
        use super::*;

        #[test]
        fn record_fields_in_order_with_resolved_types() {
            let host = host(&[(
                "model.rs",
                r#"
                use chrono::NaiveDate;

                #[fixture]
                pub struct Person {
                    pub name: String,
                    pub born: NaiveDate,
                    pub nickname: Option<String>,
                }
                "#,
            )]);

            let fixtures = host.marked_types(Marker::Fixture);
            assert_eq!(fixtures.len(), 1);
            let person = fixtures[0];
            assert_eq!(person.qualified_name, "crate::model::Person");
            assert_eq!(person.kind, DeclarationKind::Record);

            let params = host.constructor_parameters(person);
            let rendered: Vec<(String, String)> = params
                .iter()
                .map(|p| (p.name.clone(), p.ty.render()))
                .collect();
            assert_eq!(
                rendered,
                vec![
                    ("name".to_string(), "String".to_string()),
                    ("born".to_string(), "chrono::NaiveDate".to_string()),
                    ("nickname".to_string(), "Option<String>".to_string()),
                ]
            );
        }

        #[test]
        fn enums_and_sealed_types_are_told_apart() {
            let host = host(&[(
                "lib.rs",
                r#"
                pub enum Status { Draft, Published }
                pub struct Circle { pub radius: f64 }
                pub enum Shape { Empty, Round(Circle), Poly { sides: u8 } }
                "#,
            )]);

            let status = host
                .resolve_type(&ResolvedType::named("crate::Status"))
                .unwrap();
            assert_eq!(status.kind, DeclarationKind::Enum);

            let shape = host
                .resolve_type(&ResolvedType::named("crate::Shape"))
                .unwrap();
            assert_eq!(shape.kind, DeclarationKind::Sealed);
            assert_eq!(
                host.nested_cases(shape),
                &[
                    CaseDeclaration::unit("Empty"),
                    CaseDeclaration::wrapping("Round", ResolvedType::named("crate::Circle")),
                    CaseDeclaration::fields("Poly"),
                ]
            );
        }

        #[test]
        fn inline_modules_become_enclosing_chain() {
            let host = host(&[(
                "model.rs",
                r#"
                pub mod inner {
                    #[fixture]
                    pub struct Address { pub city: String }
                }
                "#,
            )]);

            let address = host.marked_types(Marker::Fixture)[0];
            assert_eq!(address.qualified_name, "crate::model::inner::Address");
            assert_eq!(address.enclosing, vec!["inner".to_string()]);
        }

        #[test]
        fn tuple_and_unit_structs_keep_their_kind() {
            let host = host(&[("lib.rs", "pub struct Id(u64); pub struct Marker;")]);
            let kinds: Vec<DeclarationKind> = host.types().iter().map(|t| t.kind).collect();
            assert_eq!(
                kinds,
                vec![DeclarationKind::TupleStruct, DeclarationKind::UnitStruct]
            );
        }

        #[test]
        fn location_points_at_the_type_name() {
            let host = host(&[(
                "model.rs",
                "#[fixture]\npub struct Person { pub name: String }\n",
            )]);
            let person = host.marked_types(Marker::Fixture)[0];
            assert_eq!(person.location, Location::new("model.rs", 2, 12));
        }
    }

    mod functions {
        use super::*;

        #[test]
        fn adapter_signature_is_recorded() {
            let host = host(&[(
                "adapters.rs",
                r#"
                use crate::money::Money;

                #[fixture_adapter]
                pub fn supply_money() -> Money { Money::zero() }

                #[fixturegen::fixture_adapter]
                pub fn with_args(seed: u64) -> Money { Money::zero() }

                #[fixture_adapter]
                pub fn nothing() -> () {}

                pub fn unmarked() -> u8 { 0 }
                "#,
            )]);

            let adapters = host.marked_functions(Marker::FixtureAdapter);
            let summary: Vec<(String, usize, Option<String>)> = adapters
                .iter()
                .map(|f| {
                    (
                        f.qualified_name(),
                        f.parameter_count,
                        f.return_type.as_ref().map(|t| t.render()),
                    )
                })
                .collect();
            assert_eq!(
                summary,
                vec![
                    (
                        "crate::adapters::supply_money".to_string(),
                        0,
                        Some("crate::money::Money".to_string())
                    ),
                    (
                        "crate::adapters::with_args".to_string(),
                        1,
                        Some("crate::money::Money".to_string())
                    ),
                    ("crate::adapters::nothing".to_string(), 0, None),
                ]
            );
        }

        #[test]
        fn unrelated_attribute_paths_are_not_markers() {
            let host = host(&[(
                "lib.rs",
                "#[other::fixture] pub struct A { pub x: u8 } #[derive(Debug)] pub struct B { pub y: u8 }",
            )]);
            assert!(host.marked_types(Marker::Fixture).is_empty());
        }
    }

    mod cross_file {
        use super::*;

        #[test]
        fn types_resolve_across_files() {
            let host = host(&[
                ("lib.rs", "pub mod model; pub mod shapes;"),
                ("model.rs", "use crate::shapes::Shape;\n#[fixture] pub struct Canvas { pub shape: Shape }"),
                ("shapes.rs", "pub enum Shape { A, B }"),
            ]);

            let canvas = host.marked_types(Marker::Fixture)[0];
            let shape_ty = &host.constructor_parameters(canvas)[0].ty;
            assert_eq!(shape_ty.path, "crate::shapes::Shape");
            assert!(host.resolve_type(shape_ty).is_some());
        }

        #[test]
        fn units_follow_input_order() {
            let host = host(&[("a.rs", ""), ("billing/mod.rs", "")]);
            let units: Vec<(&str, &str)> = host
                .units()
                .iter()
                .map(|u| (u.base_name.as_str(), u.module_path.as_str()))
                .collect();
            assert_eq!(units, vec![("a", "crate::a"), ("billing", "crate::billing")]);
        }

        #[test]
        fn parse_errors_carry_file_and_position() {
            let err = RustHost::from_sources(vec![(
                "broken.rs".to_string(),
                "pub struct {".to_string(),
            )])
            .unwrap_err();
            match err {
                RustHostError::Parse { path, line, .. } => {
                    assert_eq!(path, "broken.rs");
                    assert_eq!(line, 1);
                }
                other => panic!("unexpected error: {}", other),
            }
        }
    }
}
