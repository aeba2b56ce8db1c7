//! The generation driver.
//!
//! A run moves through four states, strictly in order:
//!
//! ```text
//! Idle -> AdaptersScanned -> FixturesScanned -> Emitted
//! ```
//!
//! - **AdaptersScanned**: every `#[fixture_adapter]` function is validated and
//!   registered. The adapter registry is complete before any fixture is mapped.
//! - **FixturesScanned**: every `#[fixture]` declaration is validated and its
//!   fields are classified. Descriptors are grouped by source unit.
//! - **Emitted**: all output units are built first, then handed to the
//!   emitter. A failure while building commits nothing.
//!
//! With `fixtures.run = false` the driver moves straight from `Idle` to
//! `Emitted` without scanning. `Emitted` is terminal.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::builder::FixtureBuilder;
use crate::config::FixtureOptions;
use crate::emit::{Emitter, UnitSpec};
use crate::error::{AdapterViolation, FixtureError};
use crate::host::{DeclarationHost, Marker};
use crate::mapper::ParameterMapper;
use crate::naming::Naming;
use crate::registry::{AdapterDescriptor, AdapterRegistry, FixtureDescriptor, FixtureRegistry};
use crate::value::ValueGenerator;

// ============================================================================
// State
// ============================================================================

/// Driver state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverState {
    Idle,
    AdaptersScanned,
    FixturesScanned,
    Emitted,
}

/// Summary of one emitted unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitSummary {
    /// Output unit name.
    pub name: String,
    pub source_path: String,
    /// Factory function names, in discovery order.
    pub factories: Vec<String>,
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RunSummary {
    /// True when `fixtures.run` was false.
    pub skipped: bool,
    pub adapters: usize,
    pub fixtures: usize,
    pub units: Vec<UnitSummary>,
}

// ============================================================================
// Phases
// ============================================================================

/// Validate and register every adapter-marked function.
pub fn scan_adapters<H: DeclarationHost + ?Sized>(
    host: &H,
) -> Result<AdapterRegistry, FixtureError> {
    let mut registry = AdapterRegistry::new();
    for function in host.marked_functions(Marker::FixtureAdapter) {
        if function.associated {
            return Err(FixtureError::InvalidAdapter {
                function: function.qualified_name(),
                violation: AdapterViolation::Associated,
                location: function.location.clone(),
            });
        }
        if function.parameter_count > 0 {
            return Err(FixtureError::InvalidAdapter {
                function: function.qualified_name(),
                violation: AdapterViolation::HasParameters,
                location: function.location.clone(),
            });
        }
        let Some(target) = function.return_type.clone() else {
            return Err(FixtureError::InvalidAdapter {
                function: function.qualified_name(),
                violation: AdapterViolation::NoReturnType,
                location: function.location.clone(),
            });
        };
        debug!(
            "registered adapter {} for {}",
            function.qualified_name(),
            target
        );
        registry.register(AdapterDescriptor {
            producer_scope: function.scope.clone(),
            function_name: function.name.clone(),
            target,
            location: function.location.clone(),
        });
    }
    Ok(registry)
}

/// Validate every fixture-marked declaration and classify its fields.
pub fn scan_fixtures<H: DeclarationHost + ?Sized>(
    host: &H,
    adapters: &AdapterRegistry,
    naming: &Naming,
) -> Result<FixtureRegistry, FixtureError> {
    let mapper = ParameterMapper::new(host, adapters, naming);
    let mut registry = FixtureRegistry::new();
    for decl in host.marked_types(Marker::Fixture) {
        if !decl.kind.is_record() {
            return Err(FixtureError::NotARecord {
                name: decl.qualified_name.clone(),
                location: decl.location.clone(),
            });
        }
        let parameters = mapper.map_parameters(decl)?;
        registry.register(FixtureDescriptor {
            qualified_name: decl.qualified_name.clone(),
            simple_name: decl.simple_name.clone(),
            enclosing: decl.enclosing.clone(),
            unit: decl.unit,
            ty: decl.as_type(),
            parameters,
            location: decl.location.clone(),
        });
        debug!("the struct {} with #[fixture] was processed", decl.qualified_name);
    }
    Ok(registry)
}

/// Build one unit spec per unit with fixtures.
///
/// Fails when two source units map to the same output unit name.
pub fn build_units<H, R>(
    host: &H,
    fixtures: &FixtureRegistry,
    builder: &mut FixtureBuilder<'_, R>,
) -> Result<Vec<UnitSpec>, FixtureError>
where
    H: DeclarationHost + ?Sized,
    R: rand::Rng,
{
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut specs = Vec::with_capacity(fixtures.units().len());
    for group in fixtures.units() {
        let unit = host.unit(group.unit).ok_or_else(|| {
            FixtureError::internal(format!("fixture refers to unknown {}", group.unit))
        })?;
        let spec = builder.build_unit(unit, group)?;
        if let Some(first) = seen.insert(spec.name.clone(), unit.path.clone()) {
            return Err(FixtureError::UnitNameCollision {
                unit: spec.name,
                first,
                second: unit.path.clone(),
            });
        }
        specs.push(spec);
    }
    Ok(specs)
}

// ============================================================================
// Driver
// ============================================================================

/// Runs the phases over one host.
pub struct Driver<'h, H: DeclarationHost + ?Sized> {
    host: &'h H,
    options: FixtureOptions,
    naming: Naming,
    state: DriverState,
    adapters: AdapterRegistry,
    fixtures: FixtureRegistry,
}

impl<'h, H: DeclarationHost + ?Sized> Driver<'h, H> {
    pub fn new(host: &'h H, options: FixtureOptions) -> Self {
        let naming = options.naming();
        Driver {
            host,
            options,
            naming,
            state: DriverState::Idle,
            adapters: AdapterRegistry::new(),
            fixtures: FixtureRegistry::new(),
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn adapters(&self) -> &AdapterRegistry {
        &self.adapters
    }

    pub fn fixtures(&self) -> &FixtureRegistry {
        &self.fixtures
    }

    pub fn naming(&self) -> &Naming {
        &self.naming
    }

    /// `Idle -> AdaptersScanned`.
    pub fn scan_adapters(&mut self) -> Result<(), FixtureError> {
        self.expect_state(DriverState::Idle)?;
        self.adapters = scan_adapters(self.host)?;
        self.state = DriverState::AdaptersScanned;
        Ok(())
    }

    /// `AdaptersScanned -> FixturesScanned`.
    pub fn scan_fixtures(&mut self) -> Result<(), FixtureError> {
        self.expect_state(DriverState::AdaptersScanned)?;
        self.fixtures = scan_fixtures(self.host, &self.adapters, &self.naming)?;
        self.state = DriverState::FixturesScanned;
        Ok(())
    }

    /// `FixturesScanned -> Emitted`: build every unit, then emit them in order.
    pub fn emit<E: Emitter>(&mut self, mut emitter: E) -> Result<RunSummary, FixtureError> {
        self.expect_state(DriverState::FixturesScanned)?;
        let generator = ValueGenerator::from_seed(self.options.seed());
        let mut builder = FixtureBuilder::new(
            &self.naming,
            &self.adapters,
            self.options.randomize(),
            generator,
        );
        let specs = build_units(self.host, &self.fixtures, &mut builder)?;

        let mut summary = RunSummary {
            skipped: false,
            adapters: self.adapters.len(),
            fixtures: self.fixtures.len(),
            units: Vec::with_capacity(specs.len()),
        };
        for spec in &specs {
            emitter.emit(spec)?;
            summary.units.push(UnitSummary {
                name: spec.name.clone(),
                source_path: spec.source_path.clone(),
                factories: spec.functions.iter().map(|f| f.name.clone()).collect(),
            });
        }
        self.state = DriverState::Emitted;
        Ok(summary)
    }

    /// Run every phase. Honors `fixtures.run`.
    pub fn run<E: Emitter>(&mut self, emitter: E) -> Result<RunSummary, FixtureError> {
        if !self.options.run() {
            self.expect_state(DriverState::Idle)?;
            info!("fixture generation disabled by {}", crate::config::KEY_RUN);
            self.state = DriverState::Emitted;
            return Ok(RunSummary {
                skipped: true,
                ..RunSummary::default()
            });
        }

        let result = self
            .scan_adapters()
            .and_then(|()| self.scan_fixtures())
            .and_then(|()| self.emit(emitter));
        match &result {
            Ok(summary) => info!(
                "generated {} fixtures in {} units",
                summary.fixtures,
                summary.units.len()
            ),
            Err(err) => error!("failed to process fixtures: {}", err),
        }
        result
    }

    fn expect_state(&self, expected: DriverState) -> Result<(), FixtureError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(FixtureError::internal(format!(
                "driver is {:?}, expected {:?}",
                self.state, expected
            )))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
