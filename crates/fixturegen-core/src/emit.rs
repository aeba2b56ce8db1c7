//! Output unit specifications and the emission collaborator.
//!
//! The builder produces one [`UnitSpec`] per source unit with at least one
//! fixture. An [`Emitter`] receives the specs in order once every unit has
//! been built.

use serde::Serialize;

use crate::error::FixtureError;

/// One argument of a factory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterSpec {
    pub name: String,
    /// Rust type text.
    pub ty: String,
    /// Default-value expression.
    pub default: String,
}

/// One factory: an argument struct with defaults and two constructor functions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSpec {
    /// `create_<prefix>_<name>`
    pub name: String,
    /// `create_<prefix>_<name>_with`
    pub with_name: String,
    /// `Create<Prefix><Name>Args`
    pub args_name: String,
    /// One-line doc for the generated items.
    pub doc: String,
    /// Fully qualified fixture type.
    pub return_type: String,
    pub parameters: Vec<ParameterSpec>,
    /// Struct literal forwarding every parameter by name (`Path { a, b }`).
    pub body: String,
}

/// One output unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitSpec {
    /// Output unit name (`model_fixture`).
    pub name: String,
    /// Source unit the fixtures were declared in.
    pub source_path: String,
    /// Module path of the output unit (`crate::fixtures::model_fixture`).
    pub module_path: String,
    pub functions: Vec<FunctionSpec>,
}

/// Receives built output units.
pub trait Emitter {
    fn emit(&mut self, unit: &UnitSpec) -> Result<(), FixtureError>;
}

impl<E: Emitter + ?Sized> Emitter for &mut E {
    fn emit(&mut self, unit: &UnitSpec) -> Result<(), FixtureError> {
        (**self).emit(unit)
    }
}

/// Keeps every emitted unit in memory.
#[derive(Debug, Default)]
pub struct CollectingEmitter {
    pub units: Vec<UnitSpec>,
}

impl CollectingEmitter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Emitter for CollectingEmitter {
    fn emit(&mut self, unit: &UnitSpec) -> Result<(), FixtureError> {
        self.units.push(unit.clone());
        Ok(())
    }
}

/// Struct literal that moves each named binding into `path`.
pub fn struct_literal<'a>(path: &str, fields: impl IntoIterator<Item = &'a str>) -> String {
    let fields: Vec<&str> = fields.into_iter().collect();
    if fields.is_empty() {
        format!("{} {{}}", path)
    } else {
        format!("{} {{ {} }}", path, fields.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn struct_literal_uses_shorthand_fields() {
        assert_eq!(
            struct_literal("crate::Person", ["name", "age"]),
            "crate::Person { name, age }"
        );
        assert_eq!(struct_literal("crate::Empty", []), "crate::Empty {}");
    }

    #[test]
    fn collecting_emitter_through_mut_reference() {
        fn emit_into(mut emitter: impl Emitter, unit: &UnitSpec) {
            emitter.emit(unit).unwrap();
        }

        let unit = UnitSpec {
            name: "lib_fixture".to_string(),
            source_path: "src/lib.rs".to_string(),
            module_path: "crate::fixtures::lib_fixture".to_string(),
            functions: vec![],
        };
        let mut collector = CollectingEmitter::new();
        emit_into(&mut collector, &unit);
        assert_eq!(collector.units, vec![unit]);
    }
}
