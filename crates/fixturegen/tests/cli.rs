//! CLI end-to-end tests.
//!
//! These tests spawn the `fixturegen` binary and validate stdout and exit
//! codes:
//! - 0: success
//! - 2: invalid arguments
//! - 3: input error (unsupported field type, not a record, parse error)

use std::fs;
use std::path::Path;
use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

/// Run fixturegen in `dir` and return (stdout JSON, exit code).
fn run_fixturegen(dir: &Path, args: &[&str]) -> (Value, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_fixturegen"))
        .args(args)
        .current_dir(dir)
        .env_remove("FIXTURES_RUN")
        .env_remove("FIXTURES_RANDOMIZE")
        .env_remove("FIXTURES_SEED")
        .env_remove("FIXTURES_MODULE")
        .output()
        .expect("failed to execute fixturegen");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let json: Value = serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("stdout should be JSON ({}): {}", e, stdout));
    (json, output.status.code().unwrap_or(-1))
}

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (rel, content) in files {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    dir
}

const MODEL: &str = r#"
#[fixture]
pub struct Person {
    pub name: String,
    pub age: u32,
}
"#;

// ============================================================================
// generate
// ============================================================================

#[test]
fn generate_writes_units_and_reports_them() {
    let dir = project(&[("src/lib.rs", "pub mod model;\n"), ("src/model.rs", MODEL)]);
    let (json, code) = run_fixturegen(dir.path(), &["generate"]);

    assert_eq!(code, 0, "unexpected response: {}", json);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["schema_version"], "1");
    assert_eq!(json["units"][0]["name"], "model_fixture");
    assert_eq!(json["units"][0]["factories"][0], "create_person");
    assert_eq!(json["files_written"].as_array().map(Vec::len), Some(2));

    let unit = fs::read_to_string(dir.path().join("src/fixtures/model_fixture.rs")).unwrap();
    assert!(unit.contains("pub fn create_person() -> crate::model::Person {"));
    assert!(unit.contains("            name: String::from(\"name\"),\n"));
}

#[test]
fn dry_run_reports_without_writing() {
    let dir = project(&[("src/model.rs", MODEL)]);
    let (json, code) = run_fixturegen(dir.path(), &["generate", "--dry-run"]);

    assert_eq!(code, 0);
    assert_eq!(json["dry_run"], true);
    assert_eq!(json["files_written"], Value::Array(vec![]));
    assert!(!dir.path().join("src/fixtures").exists());
}

#[test]
fn seeded_randomized_runs_agree() {
    let dir = project(&[("src/model.rs", MODEL)]);
    let args = [
        "generate",
        "-O",
        "fixtures.randomize=true",
        "-O",
        "fixtures.seed=99",
    ];

    let (_, code) = run_fixturegen(dir.path(), &args);
    assert_eq!(code, 0);
    let first = fs::read_to_string(dir.path().join("src/fixtures/model_fixture.rs")).unwrap();
    let (json, code) = run_fixturegen(dir.path(), &args);
    assert_eq!(code, 0);
    let second = fs::read_to_string(dir.path().join("src/fixtures/model_fixture.rs")).unwrap();

    assert_eq!(first, second);
    assert_eq!(json["options"]["seed"]["value"], 99);
    assert_eq!(json["options"]["seed"]["source"], "option");
}

#[test]
fn manifest_metadata_is_applied() {
    let dir = project(&[
        (
            "Cargo.toml",
            "[package]\nname = \"demo\"\n\n[package.metadata.fixtures]\nrun = false\n",
        ),
        ("src/model.rs", MODEL),
    ]);
    let (json, code) = run_fixturegen(dir.path(), &["generate"]);

    assert_eq!(code, 0);
    assert_eq!(json["skipped"], true);
    assert_eq!(json["options"]["run"]["source"], "project_config");
    assert!(!dir.path().join("src/fixtures").exists());
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn unsupported_field_type_exits_3() {
    let dir = project(&[(
        "src/server.rs",
        "#[fixture]\npub struct Server {\n    pub socket: Socket,\n}\n",
    )]);
    let (json, code) = run_fixturegen(dir.path(), &["generate"]);

    assert_eq!(code, 3);
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"]["code"], 3);
    assert_eq!(json["error"]["details"]["field"], "socket");
    assert_eq!(json["error"]["details"]["fixture"], "crate::server::Server");
}

#[test]
fn invalid_seed_exits_2() {
    let dir = project(&[("src/model.rs", MODEL)]);
    let (json, code) = run_fixturegen(dir.path(), &["generate", "-O", "fixtures.seed=abc"]);

    assert_eq!(code, 2);
    assert_eq!(json["error"]["details"]["key"], "fixtures.seed");
}

#[test]
fn missing_source_dir_exits_2() {
    let dir = TempDir::new().unwrap();
    let (json, code) = run_fixturegen(dir.path(), &["generate", "--src", "nowhere"]);

    assert_eq!(code, 2);
    assert_eq!(json["status"], "error");
}

#[test]
fn parse_error_reports_location() {
    let dir = project(&[("src/broken.rs", "pub struct {\n")]);
    let (json, code) = run_fixturegen(dir.path(), &["generate"]);

    assert_eq!(code, 3);
    assert_eq!(json["error"]["location"]["file"], "broken.rs");
    assert_eq!(json["error"]["location"]["line"], 1);
}

// ============================================================================
// list
// ============================================================================

#[test]
fn list_reports_fixtures_and_adapters() {
    let dir = project(&[
        ("src/money.rs", "pub struct Money {\n    pub cents: i64,\n}\n"),
        (
            "src/adapters.rs",
            "use crate::money::Money;\n\n#[fixture_adapter]\npub fn supply_money() -> Money {\n    Money { cents: 1 }\n}\n",
        ),
        (
            "src/order.rs",
            "use crate::money::Money;\n\n#[fixture]\npub struct Order {\n    pub total: Money,\n}\n",
        ),
    ]);
    let (json, code) = run_fixturegen(dir.path(), &["list"]);

    assert_eq!(code, 0, "unexpected response: {}", json);
    assert_eq!(json["adapters"][0]["function"], "crate::adapters::supply_money");
    assert_eq!(json["adapters"][0]["target"], "crate::money::Money");
    assert_eq!(json["fixtures"][0]["name"], "crate::order::Order");
    assert_eq!(
        json["fixtures"][0]["factory"],
        "crate::fixtures::order_fixture::create_order"
    );
    assert_eq!(json["fixtures"][0]["parameters"][0]["tag"], "adapter_supplied");
    assert_eq!(json["fixtures"][0]["parameters"][0]["type"], "crate::money::Money");
}
