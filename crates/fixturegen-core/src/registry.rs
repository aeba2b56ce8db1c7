//! Adapter and fixture registries.
//!
//! The [`AdapterRegistry`] is filled during the adapter scan and only read
//! afterwards. The [`FixtureRegistry`] groups fixture descriptors by source
//! unit, preserving discovery order both within each unit and globally.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::warn;

use crate::host::UnitId;
use crate::parameter::ParameterDescriptor;
use crate::types::{Location, ResolvedType};

// ============================================================================
// Adapters
// ============================================================================

/// A function that supplies values of its return type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdapterDescriptor {
    /// Module path containing the function.
    pub producer_scope: String,
    pub function_name: String,
    /// The function's return type.
    pub target: ResolvedType,
    pub location: Location,
}

impl AdapterDescriptor {
    /// Qualified call expression.
    pub fn call(&self) -> String {
        format!("{}::{}()", self.producer_scope, self.function_name)
    }
}

/// Adapters keyed by the rendered return type.
///
/// Lookups try, in order: the exact type (including `Option`), the type with
/// `Option` removed, and finally the simple name when exactly one adapter
/// produces a type with that simple name. The last step only applies to
/// unqualified, non-generic types the host could not resolve.
#[derive(Debug, Default)]
pub struct AdapterRegistry {
    by_type: BTreeMap<String, AdapterDescriptor>,
    by_simple_name: HashMap<String, Vec<String>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter. A later registration for the same type replaces
    /// the earlier one, which is returned.
    pub fn register(&mut self, adapter: AdapterDescriptor) -> Option<AdapterDescriptor> {
        let key = adapter.target.render();
        if adapter.target.args.is_empty() {
            let keys = self
                .by_simple_name
                .entry(adapter.target.simple_name().to_string())
                .or_default();
            if !keys.contains(&key) {
                keys.push(key.clone());
            }
        }
        let replaced = self.by_type.insert(key.clone(), adapter);
        if let Some(previous) = &replaced {
            warn!(
                target_type = %key,
                previous = %previous.call(),
                "multiple adapters produce the same type, keeping the last one"
            );
        }
        replaced
    }

    /// Find the adapter that supplies `ty`.
    pub fn lookup(&self, ty: &ResolvedType) -> Option<&AdapterDescriptor> {
        if let Some(adapter) = self.by_type.get(&ty.render()) {
            return Some(adapter);
        }
        if let Some(adapter) = self.by_type.get(&ty.render_non_null()) {
            return Some(adapter);
        }
        if !ty.args.is_empty() || ty.path.contains("::") {
            return None;
        }
        match self.by_simple_name.get(ty.simple_name()).map(Vec::as_slice) {
            Some([key]) => self
                .by_type
                .get(key)
                .filter(|adapter| !adapter.target.nullable || ty.nullable),
            _ => None,
        }
    }

    pub fn contains(&self, ty: &ResolvedType) -> bool {
        self.lookup(ty).is_some()
    }

    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }

    /// Adapters ordered by their rendered return type.
    pub fn iter(&self) -> impl Iterator<Item = &AdapterDescriptor> {
        self.by_type.values()
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// A fixture-marked struct and its classified fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureDescriptor {
    pub qualified_name: String,
    pub simple_name: String,
    /// Inline modules between the unit's module and the struct.
    pub enclosing: Vec<String>,
    pub unit: UnitId,
    /// The struct as a type, for generated signatures.
    pub ty: ResolvedType,
    pub parameters: Vec<ParameterDescriptor>,
    pub location: Location,
}

/// Fixtures declared in one source unit, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitFixtures {
    pub unit: UnitId,
    pub fixtures: Vec<FixtureDescriptor>,
}

/// All fixtures, grouped by unit.
#[derive(Debug, Default)]
pub struct FixtureRegistry {
    units: Vec<UnitFixtures>,
    index: HashMap<UnitId, usize>,
    order: Vec<String>,
}

impl FixtureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, fixture: FixtureDescriptor) {
        self.order.push(fixture.qualified_name.clone());
        let slot = match self.index.get(&fixture.unit) {
            Some(&slot) => slot,
            None => {
                self.units.push(UnitFixtures {
                    unit: fixture.unit,
                    fixtures: Vec::new(),
                });
                let slot = self.units.len() - 1;
                self.index.insert(fixture.unit, slot);
                slot
            }
        };
        self.units[slot].fixtures.push(fixture);
    }

    /// Units with at least one fixture, in order of first discovery.
    pub fn units(&self) -> &[UnitFixtures] {
        &self.units
    }

    /// Qualified names of all fixtures in global discovery order.
    pub fn discovery_order(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
