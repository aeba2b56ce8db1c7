//! Integration tests for loading a source tree from disk.

use std::fs;
use std::path::Path;

use fixturegen_core::config::FixtureOptions;
use fixturegen_core::driver::Driver;
use fixturegen_core::error::{AdapterViolation, FixtureError};
use fixturegen_core::host::{DeclarationHost, Marker};
use fixturegen_core::types::Location;
use fixturegen_rust::{RenderingEmitter, RustHost};
use tempfile::TempDir;

// ============================================================================
// Helpers
// ============================================================================

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn order_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    let src = dir.path();
    write(src, "lib.rs", "pub mod adapters;\npub mod model;\npub mod money;\n");
    write(src, "money.rs", "pub struct Money {\n    pub cents: i64,\n}\n");
    write(
        src,
        "adapters.rs",
        "use crate::money::Money;\n\n#[fixture_adapter]\npub fn supply_money() -> Money {\n    Money { cents: 100 }\n}\n",
    );
    write(
        src,
        "model.rs",
        "use crate::money::Money;\n\n#[fixture]\npub struct Order {\n    pub id: u64,\n    pub total: Money,\n}\n",
    );
    dir
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn loads_tree_and_generates_adapter_call() {
    let dir = order_tree();
    let host = RustHost::load(dir.path()).unwrap();

    let paths: Vec<&str> = host.units().iter().map(|u| u.path.as_str()).collect();
    assert_eq!(paths, vec!["adapters.rs", "lib.rs", "model.rs", "money.rs"]);

    let mut emitter = RenderingEmitter::new();
    let summary = Driver::new(&host, FixtureOptions::default())
        .run(&mut emitter)
        .unwrap();
    assert_eq!(summary.adapters, 1);
    assert_eq!(summary.fixtures, 1);

    assert_eq!(emitter.units.len(), 1);
    let unit = &emitter.units[0];
    assert_eq!(unit.file_name, "model_fixture.rs");
    assert!(unit.source.contains("            id: 0_u64,\n"));
    assert!(unit
        .source
        .contains("            total: crate::adapters::supply_money(),\n"));
}

#[test]
fn excluded_output_directory_is_not_scanned() {
    let dir = order_tree();
    write(
        dir.path(),
        "fixtures/model_fixture.rs",
        "#[fixture] pub struct Stale { pub x: u8 }",
    );

    let all = RustHost::load(dir.path()).unwrap();
    assert_eq!(all.marked_types(Marker::Fixture).len(), 2);

    let host = RustHost::load_excluding(dir.path(), &[dir.path().join("fixtures")]).unwrap();
    assert_eq!(host.marked_types(Marker::Fixture).len(), 1);
}

#[test]
fn fixture_on_enum_reports_source_location() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "model.rs", "#[fixture]\npub enum Mode { A }\n");

    let host = RustHost::load(dir.path()).unwrap();
    let err = Driver::new(&host, FixtureOptions::default())
        .run(RenderingEmitter::new())
        .unwrap_err();
    match err {
        FixtureError::NotARecord { name, location } => {
            assert_eq!(name, "crate::model::Mode");
            assert_eq!(location, Location::new("model.rs", 2, 10));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn adapter_inside_impl_block_is_rejected() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "money.rs",
        "pub struct Money {\n    pub cents: i64,\n}\n\nimpl Money {\n    #[fixture_adapter]\n    pub fn supply() -> Money {\n        Money { cents: 1 }\n    }\n}\n",
    );

    let host = RustHost::load(dir.path()).unwrap();
    let err = Driver::new(&host, FixtureOptions::default())
        .run(RenderingEmitter::new())
        .unwrap_err();
    match err {
        FixtureError::InvalidAdapter {
            function,
            violation,
            location,
        } => {
            assert_eq!(function, "crate::money::Money::supply");
            assert_eq!(violation, AdapterViolation::Associated);
            assert_eq!(location, Location::new("money.rs", 7, 12));
        }
        other => panic!("unexpected error: {}", other),
    }
}
