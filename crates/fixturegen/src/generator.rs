//! The generation pipeline: resolve options, index sources, run the driver,
//! write the rendered units.
//!
//! [`Generator`] is used by the CLI and directly from `build.rs`. Nothing is
//! written unless the whole run succeeds, and every file is written through
//! a temporary file in the output directory that is then renamed into place.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use fixturegen_core::config::FixtureOptions;
use fixturegen_core::driver::Driver;
use fixturegen_core::host::DeclarationHost;
use fixturegen_core::output::{GenerateResponse, ListResponse, UnitInfo};
use fixturegen_rust::{render_mod_file, RenderedUnit, RenderingEmitter, RustHost};

use crate::error::GenerateError;

/// Source root scanned when none is given.
pub const DEFAULT_SOURCE_DIR: &str = "src";
/// Output directory when none is given; matches the default `fixtures.module`.
pub const DEFAULT_OUT_DIR: &str = "src/fixtures";
/// Name of the generated module listing.
pub const MOD_FILE: &str = "mod.rs";

// ============================================================================
// Generator
// ============================================================================

/// Builder for one generation run.
#[derive(Debug, Clone)]
pub struct Generator {
    source_dir: PathBuf,
    out_dir: PathBuf,
    manifest: Option<PathBuf>,
    options: Vec<(String, String)>,
    dry_run: bool,
}

impl Default for Generator {
    fn default() -> Self {
        Generator {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            manifest: None,
            options: Vec::new(),
            dry_run: false,
        }
    }
}

impl Generator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory scanned for `#[fixture]` structs.
    pub fn source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = dir.into();
        self
    }

    /// Directory the generated units and `mod.rs` are written to. It is
    /// excluded from the scan.
    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = dir.into();
        self
    }

    /// `Cargo.toml` holding `[package.metadata.fixtures]`.
    ///
    /// Defaults to `Cargo.toml` next to the source directory, used only if it
    /// exists.
    pub fn manifest(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest = Some(path.into());
        self
    }

    /// Set an option with the highest precedence.
    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push((key.into(), value.into()));
        self
    }

    /// Render everything but write nothing.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Resolve options from the manifest, environment and explicit options.
    pub fn resolve_options(&self) -> Result<FixtureOptions, GenerateError> {
        let manifest = self.read_manifest()?;
        Ok(FixtureOptions::resolve(manifest.as_deref(), &self.options)?)
    }

    /// Run the pipeline.
    pub fn generate(&self) -> Result<GenerateReport, GenerateError> {
        let options = self.resolve_options()?;
        let host = self.load_host()?;

        let mut emitter = RenderingEmitter::new();
        let summary = Driver::new(&host, options.clone()).run(&mut emitter)?;

        let files_written = if self.dry_run || summary.skipped {
            Vec::new()
        } else {
            write_units(&self.out_dir, &emitter.units)?
        };

        Ok(GenerateReport {
            options,
            dry_run: self.dry_run,
            skipped: summary.skipped,
            out_dir: self.out_dir.clone(),
            units: emitter.units,
            files_written,
        })
    }

    /// Scan and classify without building anything.
    pub fn list(&self) -> Result<ListResponse, GenerateError> {
        let options = self.resolve_options()?;
        let host = self.load_host()?;

        let mut driver = Driver::new(&host, options);
        driver.scan_adapters()?;
        driver.scan_fixtures()?;

        let naming = driver.naming();
        Ok(ListResponse::from_registries(
            driver.adapters(),
            driver.fixtures(),
            |fixture| {
                let factory = naming.factory_name(&fixture.enclosing, &fixture.simple_name);
                match host.unit(fixture.unit) {
                    Some(unit) => format!("{}::{}", naming.unit_module(unit), factory),
                    None => factory,
                }
            },
        ))
    }

    fn load_host(&self) -> Result<RustHost, GenerateError> {
        debug!("scanning {}", self.source_dir.display());
        Ok(RustHost::load_excluding(
            &self.source_dir,
            &[self.out_dir.clone()],
        )?)
    }

    fn read_manifest(&self) -> Result<Option<String>, GenerateError> {
        if let Some(path) = &self.manifest {
            let text = fs::read_to_string(path).map_err(|source| GenerateError::Manifest {
                path: path.display().to_string(),
                source,
            })?;
            return Ok(Some(text));
        }

        let implicit = self
            .source_dir
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join("Cargo.toml");
        if !implicit.is_file() {
            return Ok(None);
        }
        debug!("reading options from {}", implicit.display());
        fs::read_to_string(&implicit)
            .map(Some)
            .map_err(|source| GenerateError::Manifest {
                path: implicit.display().to_string(),
                source,
            })
    }
}

// ============================================================================
// Report
// ============================================================================

/// Outcome of [`Generator::generate`].
#[derive(Debug, Clone)]
pub struct GenerateReport {
    pub options: FixtureOptions,
    pub dry_run: bool,
    /// Generation was disabled by `fixtures.run`.
    pub skipped: bool,
    pub out_dir: PathBuf,
    /// Rendered units in discovery order.
    pub units: Vec<RenderedUnit>,
    /// Files written, units first and `mod.rs` last.
    pub files_written: Vec<PathBuf>,
}

impl GenerateReport {
    /// Number of factories across all units.
    pub fn fixture_count(&self) -> usize {
        self.units.iter().map(|u| u.factories.len()).sum()
    }

    /// JSON response for the CLI.
    pub fn to_response(&self) -> GenerateResponse {
        let units = self
            .units
            .iter()
            .map(|unit| UnitInfo {
                name: unit.name.clone(),
                source: unit.source_path.clone(),
                path: self.out_dir.join(&unit.file_name).display().to_string(),
                factories: unit.factories.clone(),
            })
            .collect();
        GenerateResponse::new(
            self.options.clone(),
            self.dry_run,
            self.skipped,
            units,
            self.files_written
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
        )
    }
}

// ============================================================================
// Writing
// ============================================================================

/// Write every unit and `mod.rs` into `out_dir`.
///
/// All files are staged as temporary files first; none is renamed into place
/// until every one has been written.
fn write_units(out_dir: &Path, units: &[RenderedUnit]) -> Result<Vec<PathBuf>, GenerateError> {
    let write_error = |path: &Path| {
        let path = path.display().to_string();
        move |source: io::Error| GenerateError::Write { path, source }
    };

    fs::create_dir_all(out_dir).map_err(write_error(out_dir))?;

    let mod_file = render_mod_file(units.iter().map(|u| u.name.as_str()));
    let contents = units
        .iter()
        .map(|u| (u.file_name.as_str(), u.source.as_str()))
        .chain(std::iter::once((MOD_FILE, mod_file.as_str())));

    let mut staged = Vec::new();
    for (file_name, source) in contents {
        let target = out_dir.join(file_name);
        let mut temp = NamedTempFile::new_in(out_dir).map_err(write_error(&target))?;
        temp.write_all(source.as_bytes())
            .map_err(write_error(&target))?;
        staged.push((temp, target));
    }

    let mut written = Vec::with_capacity(staged.len());
    for (temp, target) in staged {
        temp.persist(&target)
            .map_err(|err| write_error(&target)(err.error))?;
        debug!("wrote {}", target.display());
        written.push(target);
    }

    info!("wrote {} files to {}", written.len(), out_dir.display());
    Ok(written)
}

// ============================================================================
// Tests
// ============================================================================
