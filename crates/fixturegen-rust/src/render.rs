//! Rust source text for output units.
//!
//! A unit renders to one module file. Each factory becomes an argument struct
//! with a `Default` impl holding the generated defaults, a zero-argument
//! `create_*` function and a `create_*_with` function taking the argument
//! struct.

use fixturegen_core::emit::{struct_literal, Emitter, FunctionSpec, UnitSpec};
use fixturegen_core::error::FixtureError;

const INDENT: &str = "    ";

/// Render a unit to module source text.
pub fn render_unit(unit: &UnitSpec) -> String {
    let mut out = format!(
        "//! Generated by fixturegen from `{}`. Do not edit.\n\n#![allow(clippy::all)]\n",
        unit.source_path
    );
    for function in &unit.functions {
        out.push('\n');
        render_function(&mut out, function);
    }
    out
}

/// Render the `mod.rs` that mounts every generated unit.
pub fn render_mod_file<'a>(unit_names: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::from("//! Generated by fixturegen. Do not edit.\n\n");
    for name in unit_names {
        out.push_str(&format!("pub mod {};\n", name));
    }
    out
}

fn render_function(out: &mut String, function: &FunctionSpec) {
    let names: Vec<&str> = function.parameters.iter().map(|p| p.name.as_str()).collect();

    // Argument struct
    out.push_str(&format!(
        "/// Arguments for [`{}`].\n",
        function.with_name
    ));
    if function.parameters.is_empty() {
        out.push_str(&format!("pub struct {} {{}}\n", function.args_name));
    } else {
        out.push_str(&format!("pub struct {} {{\n", function.args_name));
        for param in &function.parameters {
            out.push_str(&format!("{}pub {}: {},\n", INDENT, param.name, param.ty));
        }
        out.push_str("}\n");
    }
    out.push('\n');

    // Defaults
    out.push_str(&format!("impl Default for {} {{\n", function.args_name));
    out.push_str(&format!("{}fn default() -> Self {{\n", INDENT));
    if function.parameters.is_empty() {
        out.push_str(&format!("{0}{0}Self {{}}\n", INDENT));
    } else {
        out.push_str(&format!("{0}{0}Self {{\n", INDENT));
        for param in &function.parameters {
            out.push_str(&format!(
                "{0}{0}{0}{1}: {2},\n",
                INDENT, param.name, param.default
            ));
        }
        out.push_str(&format!("{0}{0}}}\n", INDENT));
    }
    out.push_str(&format!("{}}}\n", INDENT));
    out.push_str("}\n\n");

    // Factories
    out.push_str(&format!("/// {}\n", function.doc));
    out.push_str(&format!(
        "pub fn {}() -> {} {{\n",
        function.name, function.return_type
    ));
    out.push_str(&format!(
        "{}{}({}::default())\n",
        INDENT, function.with_name, function.args_name
    ));
    out.push_str("}\n\n");

    out.push_str(&format!("/// {}\n", function.doc));
    out.push_str(&format!(
        "pub fn {}(args: {}) -> {} {{\n",
        function.with_name, function.args_name, function.return_type
    ));
    out.push_str(&format!(
        "{}let {} = args;\n",
        INDENT,
        struct_literal(&function.args_name, names.iter().copied())
    ));
    out.push_str(&format!("{}{}\n", INDENT, function.body));
    out.push_str("}\n");
}

// ============================================================================
// Emitter
// ============================================================================

/// One rendered output unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedUnit {
    /// Unit name (`model_fixture`).
    pub name: String,
    /// File name (`model_fixture.rs`).
    pub file_name: String,
    pub source: String,
    /// Factory names, in order.
    pub factories: Vec<String>,
    /// Source unit the fixtures came from.
    pub source_path: String,
}

impl RenderedUnit {
    pub fn new(unit: &UnitSpec) -> Self {
        RenderedUnit {
            name: unit.name.clone(),
            file_name: format!("{}.rs", unit.name),
            source: render_unit(unit),
            factories: unit.functions.iter().map(|f| f.name.clone()).collect(),
            source_path: unit.source_path.clone(),
        }
    }
}

/// Renders every emitted unit and keeps the text in memory.
#[derive(Debug, Default)]
pub struct RenderingEmitter {
    pub units: Vec<RenderedUnit>,
}

impl RenderingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source text of `mod.rs` for the rendered units.
    pub fn mod_file(&self) -> String {
        render_mod_file(self.units.iter().map(|u| u.name.as_str()))
    }
}

impl Emitter for RenderingEmitter {
    fn emit(&mut self, unit: &UnitSpec) -> Result<(), FixtureError> {
        self.units.push(RenderedUnit::new(unit));
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use fixturegen_core::emit::ParameterSpec;

    fn empty_function() -> FunctionSpec {
        FunctionSpec {
            name: "create_marker".to_string(),
            with_name: "create_marker_with".to_string(),
            args_name: "CreateMarkerArgs".to_string(),
            doc: "Fixture for [`crate::Marker`].".to_string(),
            return_type: "crate::Marker".to_string(),
            parameters: vec![],
            body: "crate::Marker {}".to_string(),
        }
    }

    fn unit(functions: Vec<FunctionSpec>) -> UnitSpec {
        UnitSpec {
            name: "lib_fixture".to_string(),
            source_path: "lib.rs".to_string(),
            module_path: "crate::fixtures::lib_fixture".to_string(),
            functions,
        }
    }

    mod unit_tests {
        use super::*;

        #[test]
        fn empty_fixture_renders_empty_braces() {
            let source = render_unit(&unit(vec![empty_function()]));
            assert!(source.contains("pub struct CreateMarkerArgs {}\n"));
            assert!(source.contains("        Self {}\n"));
            assert!(source.contains("    let CreateMarkerArgs {} = args;\n"));
            assert!(source.contains("    crate::Marker {}\n"));
        }

        #[test]
        fn header_names_source_unit() {
            let source = render_unit(&unit(vec![]));
            assert_eq!(
                source,
                "//! Generated by fixturegen from `lib.rs`. Do not edit.\n\n#![allow(clippy::all)]\n"
            );
        }

        #[test]
        fn fields_keep_declaration_order() {
            let mut function = empty_function();
            function.parameters = vec![
                ParameterSpec {
                    name: "b".to_string(),
                    ty: "u8".to_string(),
                    default: "0".to_string(),
                },
                ParameterSpec {
                    name: "a".to_string(),
                    ty: "u8".to_string(),
                    default: "0".to_string(),
                },
            ];
            function.body = "crate::Marker { b, a }".to_string();
            let source = render_unit(&unit(vec![function]));
            let b = source.find("pub b: u8").unwrap();
            let a = source.find("pub a: u8").unwrap();
            assert!(b < a);
            assert!(source.contains("let CreateMarkerArgs { b, a } = args;"));
        }
    }

    mod emitter_tests {
        use super::*;

        #[test]
        fn rendering_emitter_collects_units_and_mod_file() {
            let mut emitter = RenderingEmitter::new();
            emitter.emit(&unit(vec![empty_function()])).unwrap();

            assert_eq!(emitter.units.len(), 1);
            assert_eq!(emitter.units[0].file_name, "lib_fixture.rs");
            assert_eq!(emitter.units[0].factories, vec!["create_marker".to_string()]);
            assert_eq!(
                emitter.mod_file(),
                "//! Generated by fixturegen. Do not edit.\n\npub mod lib_fixture;\n"
            );
        }
    }
}
