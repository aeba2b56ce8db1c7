//! Snapshot tests for rendered output units.
//!
//! The sources below go through the full pipeline (index, driver, render),
//! so a change in classification, naming or layout shows up as a diff.

use fixturegen_core::config::FixtureOptions;
use fixturegen_core::driver::Driver;
use fixturegen_rust::{RenderingEmitter, RustHost};

const MODEL: &str = r#"
use std::collections::HashMap;

#[fixture]
pub struct Person {
    pub name: String,
    pub age: u32,
    pub nickname: Option<String>,
    pub status: Status,
    pub address: inner::Address,
    pub scores: HashMap<String, u64>,
}

pub enum Status {
    Active,
    Retired,
}

pub mod inner {
    #[fixture]
    pub struct Address {
        pub city: String,
    }
}
"#;

fn render(sources: &[(&str, &str)]) -> RenderingEmitter {
    let host = RustHost::from_sources(
        sources
            .iter()
            .map(|(path, content)| (path.to_string(), content.to_string()))
            .collect(),
    )
    .expect("sources parse");
    let mut emitter = RenderingEmitter::new();
    Driver::new(&host, FixtureOptions::default())
        .run(&mut emitter)
        .expect("run succeeds");
    emitter
}

#[test]
fn model_unit() {
    let emitter = render(&[("model.rs", MODEL)]);
    assert_eq!(emitter.units.len(), 1);
    insta::assert_snapshot!("model_unit", emitter.units[0].source);
}

#[test]
fn rendering_twice_is_byte_identical() {
    let first = render(&[("model.rs", MODEL)]);
    let second = render(&[("model.rs", MODEL)]);
    assert_eq!(first.units, second.units);
    assert_eq!(first.mod_file(), second.mod_file());
}
