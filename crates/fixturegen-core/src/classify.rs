//! Type classification.
//!
//! Maps a field's resolved type to a [`ParameterDescriptor`]. Rules are tried
//! in a fixed priority order and the first match wins:
//!
//! 1. a registered adapter produces the type
//! 2. primitive allow-list
//! 3. known-type allow-list
//! 4. the declaration carries `#[fixture]`
//! 5. the declaration is an enum with only unit variants
//! 6. the declaration is an enum with data-carrying variants (sealed)
//! 7. collection allow-list
//!
//! Anything else is an [`FixtureError::UnsupportedType`]. Classification has
//! no side effects.

use crate::error::FixtureError;
use crate::host::{CaseShape, DeclarationHost, DeclarationKind, Marker, TypeDeclaration};
use crate::naming::{FactoryRef, Naming};
use crate::parameter::{
    CollectionKind, KnownTypeKind, ParameterDescriptor, PrimitiveKind, SealedEntry,
};
use crate::registry::AdapterRegistry;
use crate::types::ResolvedType;

/// Classifies field types against a host and a populated adapter registry.
pub struct Classifier<'a, H: DeclarationHost + ?Sized> {
    host: &'a H,
    adapters: &'a AdapterRegistry,
    naming: &'a Naming,
}

impl<'a, H: DeclarationHost + ?Sized> Classifier<'a, H> {
    pub fn new(host: &'a H, adapters: &'a AdapterRegistry, naming: &'a Naming) -> Self {
        Classifier {
            host,
            adapters,
            naming,
        }
    }

    /// Classify field `name` of fixture `owner`, declared with type `ty`.
    pub fn classify(
        &self,
        owner: &str,
        name: &str,
        ty: &ResolvedType,
    ) -> Result<ParameterDescriptor, FixtureError> {
        let name = name.to_string();

        if self.adapters.contains(ty) {
            return Ok(ParameterDescriptor::AdapterSupplied {
                name,
                ty: ty.clone(),
            });
        }

        if let Some(kind) = PrimitiveKind::of(ty) {
            return Ok(ParameterDescriptor::Primitive {
                name,
                ty: ty.clone(),
                kind,
            });
        }

        if let Some(kind) = KnownTypeKind::of(ty) {
            return Ok(ParameterDescriptor::KnownType {
                name,
                ty: ty.clone(),
                kind,
            });
        }

        if let Some(decl) = self.host.resolve_type(ty) {
            // Generated units refer to declarations by qualified path only.
            let resolved = ResolvedType {
                path: decl.qualified_name.clone(),
                args: ty.args.clone(),
                nullable: ty.nullable,
            };
            if self.host.has_marker(decl, Marker::Fixture) {
                return Ok(ParameterDescriptor::Fixture {
                    name,
                    ty: resolved,
                    factory: self.factory_for(decl)?,
                });
            }
            match decl.kind {
                DeclarationKind::Enum => {
                    let entries = self
                        .host
                        .nested_cases(decl)
                        .iter()
                        .map(|case| case.name.clone())
                        .collect();
                    return Ok(ParameterDescriptor::Enum {
                        name,
                        ty: resolved,
                        entries,
                    });
                }
                DeclarationKind::Sealed => {
                    return Ok(ParameterDescriptor::Sealed {
                        name,
                        ty: resolved,
                        entries: self.sealed_entries(decl)?,
                    });
                }
                _ => {}
            }
        }

        if let Some(kind) = CollectionKind::of(ty) {
            return Ok(ParameterDescriptor::Collection {
                name,
                ty: ty.clone(),
                kind,
                element_type_args: ty.args.clone(),
            });
        }

        Err(FixtureError::UnsupportedType {
            type_name: ty.render_non_null(),
            field: name,
            fixture: owner.to_string(),
        })
    }

    fn sealed_entries(&self, decl: &TypeDeclaration) -> Result<Vec<SealedEntry>, FixtureError> {
        let mut entries = Vec::new();
        for case in self.host.nested_cases(decl) {
            let entry = match &case.shape {
                CaseShape::Unit => SealedEntry {
                    name: case.name.clone(),
                    is_singleton: true,
                    is_fixture: false,
                    factory: None,
                },
                CaseShape::Wrapping(inner) => {
                    let fixture = self
                        .host
                        .resolve_type(inner)
                        .filter(|d| self.host.has_marker(d, Marker::Fixture));
                    let factory = match fixture {
                        Some(d) => Some(self.factory_for(d)?),
                        None => None,
                    };
                    SealedEntry {
                        name: case.name.clone(),
                        is_singleton: false,
                        is_fixture: factory.is_some(),
                        factory,
                    }
                }
                CaseShape::Fields => SealedEntry {
                    name: case.name.clone(),
                    is_singleton: false,
                    is_fixture: false,
                    factory: None,
                },
            };
            entries.push(entry);
        }
        Ok(entries)
    }

    fn factory_for(&self, decl: &TypeDeclaration) -> Result<FactoryRef, FixtureError> {
        let unit = self.host.unit(decl.unit).ok_or_else(|| {
            FixtureError::internal(format!(
                "declaration {} refers to unknown {}",
                decl.qualified_name, decl.unit
            ))
        })?;
        Ok(self.naming.factory_for(unit, decl))
    }
}

// ============================================================================
// Tests
// ============================================================================
