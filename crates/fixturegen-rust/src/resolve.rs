//! `use`-aware resolution of type paths.
//!
//! Every module (file-backed or inline) gets a [`ModuleScope`] recording the
//! names it declares and the names it imports. [`ScopeTable::resolve_type`]
//! turns a `syn::Type` written inside a module into a [`ResolvedType`] whose
//! path is absolute (`crate::model::Person`) for declarations in the scanned
//! sources, and as written for everything else (`String`,
//! `chrono::NaiveDate`).
//!
//! Resolution order for the first segment of a relative path:
//!
//! 1. `crate`, `self`, `super`
//! 2. names imported with `use` (including renames)
//! 3. types and child modules declared in the module
//! 4. prelude types and primitives
//! 5. glob imports
//! 6. a type name declared exactly once anywhere in the sources
//!
//! Anything else is kept as written.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use quote::ToTokens;
use syn::{GenericArgument, ItemUse, PathArguments, Type, UseTree};

use fixturegen_core::types::ResolvedType;

/// Re-export chains longer than this are left unresolved.
const MAX_DEPTH: usize = 16;

const PRELUDE_TYPES: &[&str] = &[
    "bool", "char", "str", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64",
    "u128", "usize", "f32", "f64", "String", "Vec", "Option", "Box", "Result",
];

const OPTION_PATHS: &[&str] = &["Option", "std::option::Option", "core::option::Option"];

// ============================================================================
// Module Scope
// ============================================================================

/// Names visible in one module.
#[derive(Debug, Clone, Default)]
pub struct ModuleScope {
    /// Absolute module path.
    pub path: String,
    /// Local name -> path segments as written in the `use`.
    imports: BTreeMap<String, Vec<String>>,
    /// Module paths of `use x::*`, as written.
    globs: Vec<Vec<String>>,
    /// Types and child modules declared here.
    items: BTreeSet<String>,
}

impl ModuleScope {
    pub fn new(path: impl Into<String>) -> Self {
        ModuleScope {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Whether the module declares `name` itself.
    pub fn declares(&self, name: &str) -> bool {
        self.items.contains(name)
    }

    /// Path segments a local `use` name refers to.
    pub fn import(&self, name: &str) -> Option<&[String]> {
        self.imports.get(name).map(Vec::as_slice)
    }

    fn add_use_tree(&mut self, prefix: &mut Vec<String>, tree: &UseTree) {
        match tree {
            UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.add_use_tree(prefix, &path.tree);
                prefix.pop();
            }
            UseTree::Name(name) => {
                let ident = name.ident.to_string();
                if ident == "self" {
                    if let Some(last) = prefix.last() {
                        self.imports.insert(last.clone(), prefix.clone());
                    }
                } else {
                    let mut target = prefix.clone();
                    target.push(ident.clone());
                    self.imports.insert(ident, target);
                }
            }
            UseTree::Rename(rename) => {
                let alias = rename.rename.to_string();
                if alias == "_" {
                    return;
                }
                let mut target = prefix.clone();
                if rename.ident != "self" {
                    target.push(rename.ident.to_string());
                }
                self.imports.insert(alias, target);
            }
            UseTree::Glob(_) => self.globs.push(prefix.clone()),
            UseTree::Group(group) => {
                for item in &group.items {
                    self.add_use_tree(prefix, item);
                }
            }
        }
    }
}

// ============================================================================
// Scope Table
// ============================================================================

/// Scopes of every module in the scanned sources.
#[derive(Debug, Default)]
pub struct ScopeTable {
    scopes: HashMap<String, ModuleScope>,
    types_by_simple_name: HashMap<String, Vec<String>>,
}

impl ScopeTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn scope_mut(&mut self, module: &str) -> &mut ModuleScope {
        self.scopes
            .entry(module.to_string())
            .or_insert_with(|| ModuleScope::new(module))
    }

    /// Record a type declared in `module`.
    pub fn declare_type(&mut self, module: &str, name: &str) {
        self.scope_mut(module).items.insert(name.to_string());
        self.types_by_simple_name
            .entry(name.to_string())
            .or_default()
            .push(format!("{}::{}", module, name));
    }

    /// Record a child module of `parent`, inline or file-backed.
    pub fn declare_module(&mut self, parent: &str, name: &str) {
        self.scope_mut(parent).items.insert(name.to_string());
        self.scope_mut(&format!("{}::{}", parent, name));
    }

    /// Record the names a `use` item brings into `module`.
    pub fn add_use(&mut self, module: &str, item: &ItemUse) {
        let mut prefix = Vec::new();
        self.scope_mut(module).add_use_tree(&mut prefix, &item.tree);
    }

    /// Resolve a type written inside `module`.
    ///
    /// `Option<T>` becomes a nullable `T`; slices become [`ResolvedType::slice`].
    /// Shapes with no path (tuples, references, arrays, function pointers)
    /// keep their token text.
    pub fn resolve_type(&self, module: &str, ty: &Type) -> ResolvedType {
        match ty {
            Type::Path(type_path) if type_path.qself.is_none() => {
                let segments: Vec<String> = type_path
                    .path
                    .segments
                    .iter()
                    .map(|s| s.ident.to_string())
                    .collect();
                let path = if type_path.path.leading_colon.is_some() {
                    segments.join("::")
                } else {
                    self.resolve_path(module, &segments)
                };
                let args: Vec<ResolvedType> = type_path
                    .path
                    .segments
                    .last()
                    .map(|last| self.type_arguments(module, &last.arguments))
                    .unwrap_or_default();

                if OPTION_PATHS.contains(&path.as_str()) && args.len() == 1 {
                    if let Some(inner) = args.into_iter().next() {
                        return inner.nullable();
                    }
                    return ResolvedType::named(path);
                }
                ResolvedType::with_args(path, args)
            }
            Type::Slice(slice) => ResolvedType::slice(self.resolve_type(module, &slice.elem)),
            Type::Paren(paren) => self.resolve_type(module, &paren.elem),
            Type::Group(group) => self.resolve_type(module, &group.elem),
            other => ResolvedType::named(other.to_token_stream().to_string()),
        }
    }

    /// Resolve a path written inside `module` to its absolute form.
    pub fn resolve_path(&self, module: &str, segments: &[String]) -> String {
        self.absolute(module, segments, 0).join("::")
    }

    fn type_arguments(&self, module: &str, arguments: &PathArguments) -> Vec<ResolvedType> {
        match arguments {
            PathArguments::AngleBracketed(generics) => generics
                .args
                .iter()
                .filter_map(|arg| match arg {
                    GenericArgument::Type(ty) => Some(self.resolve_type(module, ty)),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn absolute(&self, module: &str, segments: &[String], depth: usize) -> Vec<String> {
        let Some(first) = segments.first() else {
            return Vec::new();
        };
        if depth > MAX_DEPTH {
            return segments.to_vec();
        }
        let rest = &segments[1..];

        match first.as_str() {
            "crate" => return self.walk(segments, depth),
            "self" => {
                let mut abs = split(module);
                abs.extend(rest.iter().cloned());
                return self.walk(&abs, depth);
            }
            "super" => {
                let mut abs = split(module);
                let mut remaining = segments;
                while remaining.first().is_some_and(|s| s == "super") {
                    abs.pop();
                    remaining = &remaining[1..];
                }
                abs.extend(remaining.iter().cloned());
                return self.walk(&abs, depth);
            }
            _ => {}
        }

        let Some(scope) = self.scopes.get(module) else {
            return segments.to_vec();
        };

        if let Some(target) = scope.import(first) {
            let mut abs = self.absolute(module, target, depth + 1);
            abs.extend(rest.iter().cloned());
            if abs.first().is_some_and(|s| s == "crate") && !rest.is_empty() {
                return self.walk(&abs, depth + 1);
            }
            return abs;
        }

        if scope.declares(first) {
            let mut abs = split(module);
            abs.extend(segments.iter().cloned());
            return self.walk(&abs, depth);
        }

        if segments.len() == 1 && PRELUDE_TYPES.contains(&first.as_str()) {
            return segments.to_vec();
        }

        for glob in &scope.globs {
            let base = self.absolute(module, glob, depth + 1);
            let Some(target) = self.scopes.get(&base.join("::")) else {
                continue;
            };
            if target.declares(first) || target.import(first).is_some() {
                let mut abs = base;
                abs.extend(segments.iter().cloned());
                return self.walk(&abs, depth + 1);
            }
        }

        if segments.len() == 1 {
            if let Some(qualified) = self.unique_type(first) {
                return split(qualified);
            }
        }

        segments.to_vec()
    }

    /// Follow an absolute path through re-exports.
    fn walk(&self, abs: &[String], depth: usize) -> Vec<String> {
        let Some(root) = abs.first() else {
            return Vec::new();
        };
        let mut current = vec![root.clone()];
        for (index, segment) in abs.iter().enumerate().skip(1) {
            let module = current.join("::");
            if let Some(scope) = self.scopes.get(&module) {
                if !scope.declares(segment) && depth < MAX_DEPTH {
                    if let Some(target) = scope.import(segment) {
                        let mut resolved = self.absolute(&module, target, depth + 1);
                        resolved.extend(abs[index + 1..].iter().cloned());
                        return resolved;
                    }
                }
            }
            current.push(segment.clone());
        }
        current
    }

    fn unique_type(&self, simple_name: &str) -> Option<&str> {
        match self.types_by_simple_name.get(simple_name).map(Vec::as_slice) {
            Some([only]) => Some(only.as_str()),
            _ => None,
        }
    }
}

fn split(path: &str) -> Vec<String> {
    path.split("::").map(str::to_string).collect()
}

// ============================================================================
// Tests
// ============================================================================
