//! Core engine for fixturegen.
//!
//! This crate is language-agnostic with respect to how declarations are
//! discovered. It provides:
//! - Resolved type handles and source locations
//! - The [`host::DeclarationHost`] collaborator trait (plus an in-memory host)
//! - Type classification into tagged parameter descriptors
//! - Adapter and fixture registries
//! - Default-value synthesis (deterministic and randomized)
//! - Factory building and the [`emit::Emitter`] collaborator trait
//! - The two-phase driver (adapters first, fixtures second, then emission)
//! - Layered configuration and JSON output types for the CLI

pub mod builder;
pub mod classify;
pub mod config;
pub mod driver;
pub mod emit;
pub mod error;
pub mod host;
pub mod mapper;
pub mod naming;
pub mod output;
pub mod parameter;
pub mod registry;
pub mod types;
pub mod value;
