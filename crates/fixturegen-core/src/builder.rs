//! Builds output unit specifications from registered fixtures.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::Rng;

use crate::emit::{struct_literal, FunctionSpec, ParameterSpec, UnitSpec};
use crate::error::FixtureError;
use crate::host::SourceUnit;
use crate::naming::{output_unit_name, Naming};
use crate::registry::{AdapterRegistry, FixtureDescriptor, UnitFixtures};
use crate::value::ValueGenerator;

/// Turns fixture descriptors into factories with default values.
pub struct FixtureBuilder<'a, R = StdRng> {
    naming: &'a Naming,
    adapters: &'a AdapterRegistry,
    randomize: bool,
    generator: ValueGenerator<R>,
}

impl<'a, R: Rng> FixtureBuilder<'a, R> {
    pub fn new(
        naming: &'a Naming,
        adapters: &'a AdapterRegistry,
        randomize: bool,
        generator: ValueGenerator<R>,
    ) -> Self {
        FixtureBuilder {
            naming,
            adapters,
            randomize,
            generator,
        }
    }

    /// Build the output unit for the fixtures declared in `unit`.
    ///
    /// Fails when two fixtures would generate an item with the same name.
    pub fn build_unit(
        &mut self,
        unit: &SourceUnit,
        fixtures: &UnitFixtures,
    ) -> Result<UnitSpec, FixtureError> {
        let name = output_unit_name(&unit.base_name);
        let mut owners: HashMap<String, &str> = HashMap::new();
        let mut functions = Vec::with_capacity(fixtures.fixtures.len());
        for fixture in &fixtures.fixtures {
            let function = self.build_function(fixture)?;
            for item in [&function.name, &function.with_name, &function.args_name] {
                if let Some(first) = owners.insert(item.clone(), &fixture.qualified_name) {
                    return Err(FixtureError::FactoryNameCollision {
                        name: item.clone(),
                        unit: name,
                        first: first.to_string(),
                        second: fixture.qualified_name.clone(),
                    });
                }
            }
            functions.push(function);
        }
        Ok(UnitSpec {
            name,
            source_path: unit.path.clone(),
            module_path: self.naming.unit_module(unit),
            functions,
        })
    }

    /// Build the factory for one fixture.
    pub fn build_function(
        &mut self,
        fixture: &FixtureDescriptor,
    ) -> Result<FunctionSpec, FixtureError> {
        let mut parameters = Vec::with_capacity(fixture.parameters.len());
        for param in &fixture.parameters {
            let default = self
                .generator
                .generate(self.randomize, param, self.adapters)?;
            parameters.push(ParameterSpec {
                name: param.name().to_string(),
                ty: param.ty().render(),
                default,
            });
        }
        let return_type = fixture.ty.render();
        let body = struct_literal(&return_type, parameters.iter().map(|p| p.name.as_str()));
        Ok(FunctionSpec {
            name: self
                .naming
                .factory_name(&fixture.enclosing, &fixture.simple_name),
            with_name: self
                .naming
                .factory_with_name(&fixture.enclosing, &fixture.simple_name),
            args_name: self
                .naming
                .args_struct_name(&fixture.enclosing, &fixture.simple_name),
            doc: format!("Fixture for [`{}`].", return_type),
            return_type,
            parameters,
            body,
        })
    }
}
