//! Parameter mapping: one descriptor per named field, in declaration order.

use crate::classify::Classifier;
use crate::error::FixtureError;
use crate::host::{DeclarationHost, TypeDeclaration};
use crate::naming::Naming;
use crate::parameter::{is_container_like, ParameterDescriptor};
use crate::registry::AdapterRegistry;

/// Maps fixture declarations to their parameter descriptors.
pub struct ParameterMapper<'a, H: DeclarationHost + ?Sized> {
    host: &'a H,
    classifier: Classifier<'a, H>,
}

impl<'a, H: DeclarationHost + ?Sized> ParameterMapper<'a, H> {
    pub fn new(host: &'a H, adapters: &'a AdapterRegistry, naming: &'a Naming) -> Self {
        ParameterMapper {
            host,
            classifier: Classifier::new(host, adapters, naming),
        }
    }

    /// Classify every field of `decl`.
    ///
    /// Container types outside the supported collection kinds are reported as
    /// [`FixtureError::UnsupportedCollection`] rather than as unknown types.
    pub fn map_parameters(
        &self,
        decl: &TypeDeclaration,
    ) -> Result<Vec<ParameterDescriptor>, FixtureError> {
        self.host
            .constructor_parameters(decl)
            .iter()
            .map(|param| {
                self.classifier
                    .classify(&decl.qualified_name, &param.name, &param.ty)
                    .map_err(|err| match err {
                        FixtureError::UnsupportedType {
                            type_name,
                            field,
                            fixture,
                        } if is_container_like(&param.ty) => FixtureError::UnsupportedCollection {
                            type_name,
                            field,
                            fixture,
                        },
                        other => other,
                    })
            })
            .collect()
    }
}

/// Map the fields of `decl` in one call.
pub fn map_parameters<H: DeclarationHost + ?Sized>(
    host: &H,
    decl: &TypeDeclaration,
    adapters: &AdapterRegistry,
    naming: &Naming,
) -> Result<Vec<ParameterDescriptor>, FixtureError> {
    ParameterMapper::new(host, adapters, naming).map_parameters(decl)
}
